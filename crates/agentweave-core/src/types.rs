use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved node labels for the control agents.
pub const START_LABEL: &str = "START";
pub const END_LABEL: &str = "END";
pub const LOOP_LABEL: &str = "LOOP";

/// How an agent behaves when the chain executor dispatches it.
///
/// Computed once when the record is materialized, so an ordinary agent that
/// happens to be *named* "START" is still dispatched as Generic; only the
/// reserved ids select a control variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentVariant {
    Start,
    End,
    Loop,
    Generic,
}

impl AgentVariant {
    /// Derive the variant from an agent id.
    pub fn from_id(id: &str) -> Self {
        match id {
            START_LABEL => Self::Start,
            END_LABEL => Self::End,
            LOOP_LABEL => Self::Loop,
            _ => Self::Generic,
        }
    }
}

/// A registered agent: a named processing step with a role prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub prompt: String,
    pub variant: AgentVariant,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AgentRecord {
    /// Materialize a record, deriving the variant from the id.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        prompt: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let variant = AgentVariant::from_id(&id);
        Self {
            id,
            name: name.into(),
            description,
            prompt: prompt.into(),
            variant,
            created_at: Some(Utc::now()),
        }
    }

    /// Materialize a record with a freshly generated id.
    pub fn with_generated_id(
        name: impl Into<String>,
        description: Option<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self::new(Uuid::new_v4().to_string(), name, description, prompt)
    }
}

/// A node in a user-authored workflow graph.
///
/// `label` is the display name: the agent's name for ordinary agents, or a
/// reserved token (START/END/LOOP) for control nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Registry entry to invoke at this position. Falls back to the node id
    /// when absent, which is how the control nodes are wired up.
    #[serde(default)]
    pub agent_ref: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            agent_ref: None,
        }
    }

    pub fn with_agent_ref(mut self, agent_ref: impl Into<String>) -> Self {
        self.agent_ref = Some(agent_ref.into());
        self
    }

    /// The registry id this node resolves against.
    pub fn resolve_ref(&self) -> &str {
        self.agent_ref.as_deref().unwrap_or(&self.id)
    }
}

/// A directed connection between two workflow nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A user-authored workflow graph, received as an immutable snapshot per
/// execution request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Per-node log entry in a pipeline result.
///
/// `processed_text` is the input fed to the node; `output` is the text it
/// produced (or an embedded error string).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    pub node_id: String,
    pub agent_name: String,
    pub processed_text: String,
    pub output: String,
}

/// Everything the chain executor hands back across its boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub workflow_id: String,
    pub results: Vec<ResultEntry>,
    /// Wall-clock seconds.
    pub execution_time: f64,
    pub status: RunStatus,
}
