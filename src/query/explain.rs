//! Explain trees describing how a start step will be resolved.

use std::fmt::Write as _;

use serde::Serialize;

use crate::query::constraint::Constraint;
use crate::query::physical::AccessPath;
use crate::storage::ElementKind;

/// Human-readable explain output for one start step.
#[derive(Clone, Debug, Serialize)]
pub struct StepExplain {
    /// Diagnostic form of the step.
    pub step: String,
    /// Root operator of the explain tree.
    pub root: ExplainNode,
}

impl StepExplain {
    /// Builds the explain tree for `path` followed by residual filtering.
    pub fn new(
        step: impl Into<String>,
        path: &AccessPath,
        kind: ElementKind,
        constraints: &[Constraint],
    ) -> Self {
        let access = access_node(path, kind);
        let root = if constraints.is_empty() {
            access
        } else {
            let mut filter = ExplainNode::new("ResidualFilter");
            filter.props = constraints
                .iter()
                .map(|c| ExplainProp::literal("constraint", c.to_string()))
                .collect();
            filter.inputs.push(access);
            filter
        };
        Self {
            step: step.into(),
            root,
        }
    }

    /// Renders the tree as indented text. Literal values are replaced with
    /// `?` when `redact` is set.
    pub fn render(&self, redact: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.step);
        render_node(&self.root, 1, redact, &mut out);
        out
    }
}

/// Explain node representing an operator with optional metadata.
#[derive(Clone, Debug, Serialize)]
pub struct ExplainNode {
    /// Operator name
    pub op: String,
    /// Additional properties describing the operator
    pub props: Vec<ExplainProp>,
    /// Input operators
    pub inputs: Vec<ExplainNode>,
}

impl ExplainNode {
    /// Creates a new explain node with the given operator name.
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            props: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

/// Single property associated with an [`ExplainNode`].
#[derive(Clone, Debug, Serialize)]
pub struct ExplainProp {
    /// Property key.
    pub key: String,
    /// Property value serialized for display.
    pub value: String,
    /// Whether this property contains literal data that may be redacted.
    pub redactable: bool,
}

impl ExplainProp {
    fn plain(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            redactable: false,
        }
    }

    fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            redactable: true,
        }
    }
}

fn access_node(path: &AccessPath, kind: ElementKind) -> ExplainNode {
    let mut node = ExplainNode::new(path.name());
    node.props.push(ExplainProp::plain("kind", kind.to_string()));
    match path {
        AccessPath::ById { ids } => {
            let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
            node.props
                .push(ExplainProp::plain("ids", format!("[{}]", ids.join(", "))));
        }
        AccessPath::ByIndex(query) => {
            node.props
                .push(ExplainProp::plain("index", query.index.name.clone()));
            node.props
                .push(ExplainProp::plain("class", query.index.class_name.clone()));
            node.props.push(ExplainProp::plain("key", query.key.clone()));
            for value in &query.values {
                node.props
                    .push(ExplainProp::literal("value", value.to_string()));
            }
        }
        AccessPath::FullScan => {}
    }
    node
}

fn render_node(node: &ExplainNode, depth: usize, redact: bool, out: &mut String) {
    let indent = "  ".repeat(depth);
    let props: Vec<String> = node
        .props
        .iter()
        .map(|prop| {
            let value = if redact && prop.redactable {
                "?"
            } else {
                prop.value.as_str()
            };
            format!("{}={}", prop.key, value)
        })
        .collect();
    if props.is_empty() {
        let _ = writeln!(out, "{indent}{}", node.op);
    } else {
        let _ = writeln!(out, "{indent}{} {}", node.op, props.join(" "));
    }
    for input in &node.inputs {
        render_node(input, depth + 1, redact, out);
    }
}
