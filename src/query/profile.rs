use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// A snapshot of start-step resolution metrics.
///
/// Profiling is enabled via the `PENUMBRA_PROFILE` environment variable and
/// tracks how often each access path is taken and how much residual filtering
/// discards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveProfileSnapshot {
    /// Resolutions served by identifier lookup.
    pub by_id_count: u64,
    /// Total nanoseconds spent in identifier lookups.
    pub by_id_ns: u64,
    /// Resolutions served by an index probe.
    pub by_index_count: u64,
    /// Total nanoseconds spent in index probes.
    pub by_index_ns: u64,
    /// Resolutions served by a full scan.
    pub full_scan_count: u64,
    /// Total nanoseconds spent in full scans.
    pub full_scan_ns: u64,
    /// Candidates read from the provider.
    pub candidates: u64,
    /// Candidates dropped by residual filtering.
    pub rejected: u64,
}

#[derive(Default)]
struct ResolveProfileCounters {
    by_id_count: AtomicU64,
    by_id_ns: AtomicU64,
    by_index_count: AtomicU64,
    by_index_ns: AtomicU64,
    full_scan_count: AtomicU64,
    full_scan_ns: AtomicU64,
    candidates: AtomicU64,
    rejected: AtomicU64,
}

static PROFILE_ENABLED: OnceLock<bool> = OnceLock::new();
static PROFILE_COUNTERS: OnceLock<ResolveProfileCounters> = OnceLock::new();

fn profiling_enabled() -> bool {
    *PROFILE_ENABLED.get_or_init(|| std::env::var_os("PENUMBRA_PROFILE").is_some())
}

fn counters() -> Option<&'static ResolveProfileCounters> {
    profiling_enabled().then(|| PROFILE_COUNTERS.get_or_init(ResolveProfileCounters::default))
}

pub(crate) fn profile_timer() -> Option<Instant> {
    profiling_enabled().then(Instant::now)
}

#[derive(Clone, Copy)]
pub(crate) enum ResolveProfileKind {
    ById,
    ByIndex,
    FullScan,
}

pub(crate) fn record_resolution(
    kind: ResolveProfileKind,
    start: Option<Instant>,
    candidates: u64,
    kept: u64,
) {
    let Some(start) = start else {
        return;
    };
    let Some(counters) = counters() else {
        return;
    };
    let nanos = start.elapsed().as_nanos().min(u64::MAX as u128) as u64;
    let (count, ns) = match kind {
        ResolveProfileKind::ById => (&counters.by_id_count, &counters.by_id_ns),
        ResolveProfileKind::ByIndex => (&counters.by_index_count, &counters.by_index_ns),
        ResolveProfileKind::FullScan => (&counters.full_scan_count, &counters.full_scan_ns),
    };
    count.fetch_add(1, Ordering::Relaxed);
    ns.fetch_add(nanos, Ordering::Relaxed);
    counters.candidates.fetch_add(candidates, Ordering::Relaxed);
    counters
        .rejected
        .fetch_add(candidates.saturating_sub(kept), Ordering::Relaxed);
}

/// Retrieves a snapshot of resolution metrics.
///
/// Returns `None` unless `PENUMBRA_PROFILE` was set when profiling was first
/// consulted. With `reset`, counters are zeroed after reading.
///
/// ```no_run
/// use penumbra::query::profile::profile_snapshot;
///
/// if let Some(snapshot) = profile_snapshot(false) {
///     println!("full scans: {}", snapshot.full_scan_count);
/// }
/// ```
pub fn profile_snapshot(reset: bool) -> Option<ResolveProfileSnapshot> {
    let counters = counters()?;
    let load = |counter: &AtomicU64| {
        if reset {
            counter.swap(0, Ordering::Relaxed)
        } else {
            counter.load(Ordering::Relaxed)
        }
    };
    Some(ResolveProfileSnapshot {
        by_id_count: load(&counters.by_id_count),
        by_id_ns: load(&counters.by_id_ns),
        by_index_count: load(&counters.by_index_count),
        by_index_ns: load(&counters.by_index_ns),
        full_scan_count: load(&counters.full_scan_count),
        full_scan_ns: load(&counters.full_scan_ns),
        candidates: load(&counters.candidates),
        rejected: load(&counters.rejected),
    })
}
