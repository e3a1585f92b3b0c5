use futures::future::BoxFuture;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::types::AgentRecord;

/// Completion provider: one blocking chat completion per call.
pub trait CompletionClient: Send + Sync + 'static {
    /// Send a system + user instruction pair and return the completion text.
    ///
    /// Temperature, token limit, and credentials ride on the `ModelConfig`.
    fn complete(
        &self,
        config: &ModelConfig,
        system: &str,
        user: &str,
    ) -> BoxFuture<'_, Result<String>>;
}

/// Agent registry lookup, supplied by the surrounding service.
///
/// Lookups return an owned snapshot so a run never observes mid-run edits
/// to the underlying store.
pub trait AgentRegistry: Send + Sync + 'static {
    fn find_agent(&self, id: &str) -> Option<AgentRecord>;
}
