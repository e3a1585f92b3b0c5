use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use agentweave_core::traits::AgentRegistry;
use agentweave_core::types::{AgentRecord, Workflow};

/// A stored workflow with bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory record store for agents and workflows.
///
/// Seeded at startup with the built-in control agents and a few sample role
/// agents. Nothing is persisted; the service starts fresh every boot.
pub struct Store {
    agents: RwLock<Vec<AgentRecord>>,
    workflows: RwLock<Vec<WorkflowRecord>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(default_agents()),
            workflows: RwLock::new(Vec::new()),
        }
    }

    pub fn list_agents(&self) -> Vec<AgentRecord> {
        self.agents.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn insert_agent(&self, agent: AgentRecord) -> AgentRecord {
        info!(name = %agent.name, id = %agent.id, "Agent created");
        self.agents.write().unwrap_or_else(PoisonError::into_inner).push(agent.clone());
        agent
    }

    pub fn get_agent(&self, id: &str) -> Option<AgentRecord> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub fn delete_agent(&self, id: &str) -> Option<AgentRecord> {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        let idx = agents.iter().position(|a| a.id == id)?;
        let removed = agents.remove(idx);
        info!(name = %removed.name, "Agent deleted");
        Some(removed)
    }

    pub fn list_workflows(&self) -> Vec<WorkflowRecord> {
        self.workflows.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn create_workflow(&self, workflow: Workflow) -> WorkflowRecord {
        info!(name = %workflow.name, id = %workflow.id, "Workflow created");
        let now = Utc::now();
        let record = WorkflowRecord {
            workflow,
            created_at: now,
            updated_at: now,
        };
        self.workflows.write().unwrap_or_else(PoisonError::into_inner).push(record.clone());
        record
    }

    /// Update an existing workflow only; `None` when the id is unknown.
    pub fn update_workflow(&self, workflow: Workflow) -> Option<WorkflowRecord> {
        let mut workflows = self.workflows.write().unwrap_or_else(PoisonError::into_inner);
        let existing = workflows.iter_mut().find(|w| w.workflow.id == workflow.id)?;
        info!(name = %workflow.name, id = %workflow.id, "Workflow updated");
        existing.workflow = workflow;
        existing.updated_at = Utc::now();
        Some(existing.clone())
    }

    pub fn get_workflow(&self, id: &str) -> Option<WorkflowRecord> {
        self.workflows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|w| w.workflow.id == id)
            .cloned()
    }

    pub fn delete_workflow(&self, id: &str) -> Option<WorkflowRecord> {
        let mut workflows = self.workflows.write().unwrap_or_else(PoisonError::into_inner);
        let idx = workflows.iter().position(|w| w.workflow.id == id)?;
        let removed = workflows.remove(idx);
        info!(name = %removed.workflow.name, "Workflow deleted");
        Some(removed)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry for Store {
    fn find_agent(&self, id: &str) -> Option<AgentRecord> {
        self.get_agent(id)
    }
}

/// The built-in control agents plus a small set of sample role agents.
fn default_agents() -> Vec<AgentRecord> {
    vec![
        AgentRecord::new(
            "START",
            "START",
            Some("Workflow entry point".to_string()),
            "Entry point of the workflow. Passes the text through unchanged.",
        ),
        AgentRecord::new(
            "END",
            "END",
            Some("Workflow exit point".to_string()),
            "Exit point of the workflow. Takes the final output and wraps up the run.",
        ),
        AgentRecord::new(
            "LOOP",
            "LOOP",
            Some("Re-runs the prior agent's prompt".to_string()),
            "Re-processes the incoming text with the prior agent's prompt to deepen it.",
        ),
        AgentRecord::with_generated_id(
            "Researcher",
            Some("Gathers foundational knowledge on a topic".to_string()),
            "You are an experienced researcher. Collect the essential facts about the \
             given topic, explain the core concepts in plain language, and sketch the \
             overall landscape. Stay accurate and accessible.",
        ),
        AgentRecord::with_generated_id(
            "Deep Researcher",
            Some("Produces an in-depth analysis of previously researched material".to_string()),
            "You are an expert analyst. Take a topic that has already been researched \
             and push into advanced concepts, technical detail, and current debates. \
             Extend the prior findings rather than repeating them.",
        ),
        AgentRecord::with_generated_id(
            "Innovation Lead",
            Some("Proposes novel ideas and future directions".to_string()),
            "You are a visionary R&D lead. Building on the analysis you are given, \
             propose innovative applications, future trends, and creative solutions to \
             the open challenges. Be forward-looking but practical.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentweave_core::types::AgentVariant;

    #[test]
    fn test_seeded_with_control_agents() {
        let store = Store::new();
        let start = store.get_agent("START").unwrap();
        assert_eq!(start.variant, AgentVariant::Start);
        assert!(store.get_agent("END").is_some());
        assert!(store.get_agent("LOOP").is_some());
        // Sample role agents come along too
        assert!(store.list_agents().len() > 3);
    }

    #[test]
    fn test_registry_lookup_miss_returns_none() {
        let store = Store::new();
        assert!(store.find_agent("no-such-agent").is_none());
    }

    #[test]
    fn test_agent_roundtrip() {
        let store = Store::new();
        let agent = AgentRecord::with_generated_id("Poet", None, "You write verse.");
        let id = agent.id.clone();
        store.insert_agent(agent);

        assert_eq!(store.get_agent(&id).unwrap().name, "Poet");
        assert!(store.delete_agent(&id).is_some());
        assert!(store.get_agent(&id).is_none());
        assert!(store.delete_agent(&id).is_none());
    }

    fn sample_workflow(id: &str) -> Workflow {
        Workflow {
            id: id.to_string(),
            name: "sample".to_string(),
            description: None,
            nodes: vec![],
            edges: vec![],
        }
    }

    #[test]
    fn test_workflow_create_and_update() {
        let store = Store::new();
        let created = store.create_workflow(sample_workflow("wf-1"));
        assert_eq!(created.created_at, created.updated_at);

        let mut changed = sample_workflow("wf-1");
        changed.name = "renamed".to_string();
        let updated = store.update_workflow(changed).unwrap();
        assert_eq!(updated.workflow.name, "renamed");
        assert_eq!(store.list_workflows().len(), 1);
    }

    #[test]
    fn test_update_unknown_workflow_is_none() {
        let store = Store::new();
        assert!(store.update_workflow(sample_workflow("ghost")).is_none());
    }

    #[test]
    fn test_workflow_delete() {
        let store = Store::new();
        store.create_workflow(sample_workflow("wf-1"));
        assert!(store.delete_workflow("wf-1").is_some());
        assert!(store.get_workflow("wf-1").is_none());
    }
}
