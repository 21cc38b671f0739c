#![allow(missing_docs)]

use std::sync::Arc;

use proptest::prelude::*;

use penumbra::query::constraint::{test_all, LABEL_KEY};
use penumbra::storage::IndexDescriptor;
use penumbra::{
    AccessPath, Constraint, Element, ElementId, ElementKind, Graph, GraphStep, MemGraph,
    Predicate, PlannerConfig, Value,
};

const LABELS: [&str; 3] = ["Person", "City", "Robot"];

#[derive(Clone, Debug)]
struct VertexSpec {
    label: usize,
    age: i64,
    name: u8,
}

fn arb_vertex() -> impl Strategy<Value = VertexSpec> {
    (0usize..LABELS.len(), 0i64..8, 0u8..4).prop_map(|(label, age, name)| VertexSpec {
        label,
        age,
        name,
    })
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        Just(Predicate::Eq),
        Just(Predicate::Neq),
        Just(Predicate::Lt),
        Just(Predicate::Le),
        Just(Predicate::Gt),
        Just(Predicate::Ge),
        Just(Predicate::Within),
        Just(Predicate::Without),
    ]
}

fn arb_label_constraint() -> impl Strategy<Value = Constraint> {
    prop_oneof![
        (0usize..LABELS.len()).prop_map(|label| Constraint::label(LABELS[label])),
        (0usize..LABELS.len())
            .prop_map(|label| Constraint::new(LABEL_KEY, Predicate::Neq, LABELS[label])),
        prop::collection::vec(0usize..LABELS.len(), 1..3).prop_map(|labels| {
            Constraint::within(LABEL_KEY, labels.into_iter().map(|l| LABELS[l]))
        }),
    ]
}

fn arb_constraint() -> impl Strategy<Value = Constraint> {
    prop_oneof![
        arb_label_constraint(),
        (arb_predicate(), prop::collection::vec(0i64..8, 1..4)).prop_map(|(pred, ages)| {
            let value = match pred {
                Predicate::Within | Predicate::Without => Value::from(ages),
                _ => Value::Int(ages[0]),
            };
            Constraint::new("age", pred, value)
        }),
        (0u8..4).prop_map(|name| Constraint::eq("name", format!("n{name}"))),
    ]
}

fn build_graph(vertices: &[VertexSpec]) -> MemGraph {
    let mut graph = MemGraph::new();
    for (id, spec) in vertices.iter().enumerate() {
        graph.insert(
            Element::vertex(id as u64 + 1, LABELS[spec.label])
                .with_property("age", spec.age)
                .with_property("name", format!("n{}", spec.name)),
        );
    }
    for label in LABELS {
        graph
            .create_index(IndexDescriptor::new(
                format!("{label}.age"),
                format!("V_{label}"),
                ["age"],
            ))
            .expect("index");
        // Serves `name` through its second field.
        graph
            .create_index(IndexDescriptor::new(
                format!("{label}.age_name"),
                format!("V_{label}"),
                ["age", "name"],
            ))
            .expect("index");
    }
    graph
}

fn all_vertices(graph: &MemGraph) -> Vec<Element> {
    use penumbra::storage::StorageProvider;
    graph
        .full_scan(ElementKind::Vertex)
        .expect("scan")
        .collect::<penumbra::Result<Vec<_>>>()
        .expect("elements")
}

proptest! {
    #[test]
    fn prop_explicit_ids_always_win(
        vertices in prop::collection::vec(arb_vertex(), 0..12),
        constraints in prop::collection::vec(arb_constraint(), 0..4),
        ids in prop::collection::vec(1u64..16, 1..5),
    ) {
        let graph: Arc<dyn Graph> = Arc::new(build_graph(&vertices));
        let mut step = GraphStep::vertices(ids.clone())
            .attach(graph)
            .with_config(PlannerConfig { warn_on_full_scan: false });
        for constraint in constraints {
            step.add_constraint(constraint);
        }
        let expected: Vec<ElementId> = ids.into_iter().map(ElementId).collect();
        prop_assert_eq!(step.plan().expect("plan"), AccessPath::ById { ids: expected });
    }

    #[test]
    fn prop_resolution_matches_brute_force_filter(
        vertices in prop::collection::vec(arb_vertex(), 0..16),
        constraints in prop::collection::vec(arb_constraint(), 0..4),
    ) {
        let mem = build_graph(&vertices);
        let mut expected: Vec<u64> = all_vertices(&mem)
            .iter()
            .filter(|element| test_all(element, &constraints).expect("evaluate"))
            .map(|element| element.id.0)
            .collect();
        let graph: Arc<dyn Graph> = Arc::new(mem);
        let mut step = GraphStep::vertices(Vec::<u64>::new())
            .attach(graph)
            .with_config(PlannerConfig { warn_on_full_scan: false });
        for constraint in &constraints {
            step.add_constraint(constraint.clone());
        }
        let resolved = step.resolve().expect("resolve");
        for element in &resolved {
            prop_assert!(test_all(element, &constraints).expect("evaluate"));
        }
        // Index probes may repeat elements for duplicate probe values.
        let mut actual: Vec<u64> = resolved.iter().map(|e| e.id.0).collect();
        actual.sort_unstable();
        actual.dedup();
        expected.sort_unstable();
        prop_assert_eq!(actual, expected);
    }
}
