//! Constraints attached to a start step and their evaluation against elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::Value;
use crate::storage::Element;
use crate::types::{PenumbraError, Result};

/// Reserved key addressing an element's class label.
pub const LABEL_KEY: &str = "~label";
/// Reserved key addressing an element's identifier.
pub const ID_KEY: &str = "~id";

/// What a constraint key addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyKind {
    /// The element's class label.
    Label,
    /// The element's identifier.
    Id,
    /// An ordinary property.
    Property,
}

/// Classifies a constraint key. Never fails: unknown keys are properties.
pub fn classify_key(key: &str) -> KeyKind {
    match key {
        LABEL_KEY => KeyKind::Label,
        ID_KEY => KeyKind::Id,
        _ => KeyKind::Property,
    }
}

/// Comparison applied between an element's value and the constraint value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Equal to the value.
    Eq,
    /// Not equal to the value.
    Neq,
    /// Strictly less than the value.
    Lt,
    /// Less than or equal to the value.
    Le,
    /// Strictly greater than the value.
    Gt,
    /// Greater than or equal to the value.
    Ge,
    /// Member of the value list.
    Within,
    /// Not a member of the value list.
    Without,
}

impl Predicate {
    /// Only equality and membership can drive an index probe.
    pub const fn is_index_eligible(self) -> bool {
        matches!(self, Predicate::Eq | Predicate::Within)
    }

    /// Short name used in diagnostics and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Neq => "neq",
            Predicate::Lt => "lt",
            Predicate::Le => "lte",
            Predicate::Gt => "gt",
            Predicate::Ge => "gte",
            Predicate::Within => "within",
            Predicate::Without => "without",
        }
    }

    /// Parses [`Predicate::name`] output.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Predicate::Eq),
            "neq" => Some(Predicate::Neq),
            "lt" => Some(Predicate::Lt),
            "lte" => Some(Predicate::Le),
            "gt" => Some(Predicate::Gt),
            "gte" => Some(Predicate::Ge),
            "within" => Some(Predicate::Within),
            "without" => Some(Predicate::Without),
            _ => None,
        }
    }

    const fn needs_list(self) -> bool {
        matches!(self, Predicate::Within | Predicate::Without)
    }
}

/// A `(key, predicate, value)` triple every resolved element must satisfy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    key: String,
    predicate: Predicate,
    value: Value,
}

impl Constraint {
    /// Creates a constraint. Membership predicates expect a [`Value::List`];
    /// anything else surfaces as [`PenumbraError::TypeMismatch`] once the
    /// constraint is evaluated or probed.
    pub fn new(key: impl Into<String>, predicate: Predicate, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            predicate,
            value: value.into(),
        }
    }

    /// `key == value`.
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, Predicate::Eq, value)
    }

    /// `key in values`.
    pub fn within<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            key,
            Predicate::Within,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Label equality.
    pub fn label(label: impl Into<String>) -> Self {
        Self::eq(LABEL_KEY, Value::String(label.into()))
    }

    /// Constraint key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Constraint predicate.
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Comparison operand.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// What the key addresses.
    pub fn key_kind(&self) -> KeyKind {
        classify_key(&self.key)
    }

    /// Values an index should be probed with: the operand for `eq`, the list
    /// items (in list order) for `within`.
    pub fn probe_values(&self) -> Result<Vec<Value>> {
        match self.predicate {
            Predicate::Eq => Ok(vec![self.value.clone()]),
            Predicate::Within => Ok(self.list_operand()?.to_vec()),
            _ => Err(PenumbraError::TypeMismatch {
                key: self.key.clone(),
                expected: "an eq or within predicate to probe an index",
            }),
        }
    }

    /// Evaluates the constraint against `element`.
    pub fn test(&self, element: &Element) -> Result<bool> {
        let owned;
        let actual = match self.key_kind() {
            KeyKind::Label => {
                owned = Value::String(element.label.clone());
                &owned
            }
            KeyKind::Id => match i64::try_from(element.id.0) {
                Ok(id) => {
                    owned = Value::Int(id);
                    &owned
                }
                Err(_) => return self.unmatched(),
            },
            KeyKind::Property => match element.property(&self.key) {
                Some(value) => value,
                None => return self.unmatched(),
            },
        };
        self.matches(actual)
    }

    /// Result for an element lacking a comparable value for the key. The
    /// operand shape is still validated.
    fn unmatched(&self) -> Result<bool> {
        if self.predicate.needs_list() {
            self.list_operand()?;
        }
        Ok(false)
    }

    fn matches(&self, actual: &Value) -> Result<bool> {
        let ordered = |pred: fn(std::cmp::Ordering) -> bool| {
            actual.compare(&self.value).map(pred).unwrap_or(false)
        };
        Ok(match self.predicate {
            Predicate::Eq => actual.loose_eq(&self.value),
            Predicate::Neq => !actual.loose_eq(&self.value),
            Predicate::Lt => ordered(|ord| ord.is_lt()),
            Predicate::Le => ordered(|ord| ord.is_le()),
            Predicate::Gt => ordered(|ord| ord.is_gt()),
            Predicate::Ge => ordered(|ord| ord.is_ge()),
            Predicate::Within => self.list_operand()?.iter().any(|v| actual.loose_eq(v)),
            Predicate::Without => !self.list_operand()?.iter().any(|v| actual.loose_eq(v)),
        })
    }

    fn list_operand(&self) -> Result<&[Value]> {
        self.value.as_list().ok_or_else(|| PenumbraError::TypeMismatch {
            key: self.key.clone(),
            expected: "a list operand for a membership predicate",
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.key, self.predicate.name(), self.value)
    }
}

/// Whether `element` satisfies every constraint. Stops at the first miss.
pub fn test_all(element: &Element, constraints: &[Constraint]) -> Result<bool> {
    for constraint in constraints {
        if !constraint.test(element)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Class label named by the first label constraint in `constraints`.
///
/// Only an `eq` label constraint names a class; any other predicate on the
/// first label constraint yields `None`.
pub fn class_label(constraints: &[Constraint]) -> Option<String> {
    let first = constraints
        .iter()
        .find(|c| c.key_kind() == KeyKind::Label)?;
    if first.predicate() != Predicate::Eq {
        return None;
    }
    match first.value() {
        Value::String(label) => Some(label.clone()),
        Value::List(_) => None,
        other => Some(other.to_string()),
    }
}

/// Append-only, insertion-ordered constraint list owned by one step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintStore {
    constraints: Vec<Constraint>,
}

impl ConstraintStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constraint.
    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Read-only view in insertion order.
    pub fn as_slice(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether no constraint was added.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Class label named by the first label constraint.
    ///
    /// Only the first label constraint is considered. It names no single
    /// class, and yields `None`, unless it is an `eq` on a scalar.
    pub fn class_label(&self) -> Option<String> {
        class_label(&self.constraints)
    }
}

impl<'a> IntoIterator for &'a ConstraintStore {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Constraint> for ConstraintStore {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}
