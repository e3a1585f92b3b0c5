use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use agentweave_core::types::{AgentRecord, Edge, Node, Workflow};

use crate::state::AppState;

// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Agents ──────────────────────────────────────────────────────

// GET /api/agents
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentRecord>> {
    Json(state.store.list_agents())
}

#[derive(Deserialize)]
pub struct CreateAgentBody {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub prompt: String,
}

// POST /api/agents
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAgentBody>,
) -> Json<AgentRecord> {
    // Caller-supplied ids are honored so the frontend can pre-wire nodes
    let agent = match body.id {
        Some(id) => AgentRecord::new(id, body.name, body.description, body.prompt),
        None => AgentRecord::with_generated_id(body.name, body.description, body.prompt),
    };
    Json(state.store.insert_agent(agent))
}

// GET /api/agents/{id}
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AgentRecord>, StatusCode> {
    state
        .store
        .get_agent(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// DELETE /api/agents/{id}
pub async fn delete_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .store
        .delete_agent(&id)
        .map(|_| Json(serde_json::json!({ "message": "agent deleted" })))
        .ok_or(StatusCode::NOT_FOUND)
}

// ── Workflows ───────────────────────────────────────────────────

// GET /api/workflows
pub async fn list_workflows(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.store.list_workflows()))
}

#[derive(Deserialize)]
pub struct SaveWorkflowBody {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

// POST /api/workflows (creates, or updates when the body carries an id)
pub async fn save_workflow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveWorkflowBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match body.id {
        Some(id) => {
            let workflow = Workflow {
                id,
                name: body.name,
                description: body.description,
                nodes: body.nodes,
                edges: body.edges,
            };
            state
                .store
                .update_workflow(workflow)
                .map(|r| Json(serde_json::json!(r)))
                .ok_or(StatusCode::NOT_FOUND)
        }
        None => {
            let workflow = Workflow {
                id: uuid::Uuid::new_v4().to_string(),
                name: body.name,
                description: body.description,
                nodes: body.nodes,
                edges: body.edges,
            };
            Ok(Json(serde_json::json!(state.store.create_workflow(workflow))))
        }
    }
}

// GET /api/workflows/{id}
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .store
        .get_workflow(&id)
        .map(|r| Json(serde_json::json!(r)))
        .ok_or(StatusCode::NOT_FOUND)
}

// DELETE /api/workflows/{id}
pub async fn delete_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .store
        .delete_workflow(&id)
        .map(|_| Json(serde_json::json!({ "message": "workflow deleted" })))
        .ok_or(StatusCode::NOT_FOUND)
}

// ── Execution ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExecuteBody {
    #[serde(default)]
    pub input_text: String,
}

// POST /api/workflows/{id}/execute
pub async fn execute_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ExecuteBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let record = state
        .store
        .get_workflow(&id)
        .ok_or(StatusCode::NOT_FOUND)?;

    if state.config.model.api_key.is_none() {
        warn!("Execution refused: no provider credential configured");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!(workflow = %record.workflow.name, "Execution requested");
    let result = state
        .executor
        .execute(&record.workflow, &body.input_text)
        .await;

    Ok(Json(serde_json::json!(result)))
}
