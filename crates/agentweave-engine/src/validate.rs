use agentweave_core::types::{Node, END_LABEL, START_LABEL};

/// Outcome of a structure check. No side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    fn ok() -> Self {
        Self {
            valid: true,
            message: "workflow structure is valid".to_string(),
        }
    }
}

/// Check a linearized sequence against the required shape: exactly one
/// START at the head and exactly one END at the tail.
///
/// Checks run in order and short-circuit on the first failure.
pub fn validate_structure(nodes: &[Node]) -> Validation {
    if nodes.is_empty() {
        return Validation::fail("no nodes in workflow");
    }

    if nodes[0].label != START_LABEL {
        return Validation::fail("workflow must start with START");
    }

    if nodes[nodes.len() - 1].label != END_LABEL {
        return Validation::fail("workflow must end with END");
    }

    let start_count = nodes.iter().filter(|n| n.label == START_LABEL).count();
    let end_count = nodes.iter().filter(|n| n.label == END_LABEL).count();

    if start_count != 1 {
        return Validation::fail(format!(
            "workflow must contain exactly one START node, found {start_count}"
        ));
    }

    if end_count != 1 {
        return Validation::fail(format!(
            "workflow must contain exactly one END node, found {end_count}"
        ));
    }

    Validation::ok()
}
