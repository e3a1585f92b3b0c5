use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use agentweave_core::config::AppConfig;
use agentweave_core::traits::{AgentRegistry, CompletionClient};
use agentweave_engine::{AgentDispatcher, ChainExecutor};

use crate::routes;
use crate::state::AppState;
use crate::store::Store;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    state: Arc<AppState>,
}

impl GatewayServer {
    pub fn new(
        config: AppConfig,
        store: Arc<Store>,
        client: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        let dispatcher = AgentDispatcher::new(client, config.model.clone());
        let registry: Arc<dyn AgentRegistry> = store.clone();
        let executor = ChainExecutor::new(registry, dispatcher);

        let state = Arc::new(AppState {
            config,
            store,
            executor,
        });
        Self { state }
    }

    /// Run the gateway server until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/api/health", get(routes::health))
            // Agents
            .route(
                "/api/agents",
                get(routes::list_agents).post(routes::create_agent),
            )
            .route(
                "/api/agents/{id}",
                get(routes::get_agent).delete(routes::delete_agent),
            )
            // Workflows
            .route(
                "/api/workflows",
                get(routes::list_workflows).post(routes::save_workflow),
            )
            .route(
                "/api/workflows/{id}",
                get(routes::get_workflow).delete(routes::delete_workflow),
            )
            .route(
                "/api/workflows/{id}/execute",
                post(routes::execute_workflow),
            )
            // The workflow canvas frontend is served separately; allow it in
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone());

        let listener = TcpListener::bind(&self.state.config.gateway.bind).await?;
        info!(bind = %self.state.config.gateway.bind, "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}
