use std::sync::Arc;

use agentweave_core::config::AppConfig;
use agentweave_engine::ChainExecutor;

use crate::store::Store;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<Store>,
    pub executor: ChainExecutor,
}
