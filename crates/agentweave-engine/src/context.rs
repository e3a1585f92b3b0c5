use agentweave_core::types::{AgentRecord, AgentVariant};

/// A prior agent as remembered by the running chain, for LOOP's backward
/// walk.
#[derive(Debug, Clone)]
pub struct PriorAgent {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub variant: AgentVariant,
}

impl From<&AgentRecord> for PriorAgent {
    fn from(agent: &AgentRecord) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            prompt: agent.prompt.clone(),
            variant: agent.variant,
        }
    }
}

/// Mutable state threaded through one pipeline run.
///
/// `chain` and `prior` are append-only histories; they grow as nodes are
/// processed and are never pruned mid-run. The context is exclusive to one
/// run and dropped at its end; concurrent executions never share one.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    /// Labels of every node processed so far, in order.
    pub chain: Vec<String>,
    /// Records of every agent the dispatcher has run so far.
    pub prior: Vec<PriorAgent>,
    /// The text flowing through the chain, reassigned after each node.
    pub current_text: String,
}

impl ExecutionContext {
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            chain: Vec::new(),
            prior: Vec::new(),
            current_text: input_text.into(),
        }
    }

    /// The full chain path joined by the display separator.
    pub fn chain_path(&self) -> String {
        self.chain.join(" -> ")
    }
}
