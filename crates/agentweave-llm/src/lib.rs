pub mod openai;

use std::sync::Arc;

use agentweave_core::config::ModelConfig;
use agentweave_core::traits::CompletionClient;

pub use openai::OpenAiClient;

/// Create a completion client for the configured provider.
///
/// Every supported provider speaks the OpenAI-compatible chat completions
/// shape; alternative backends (Ollama, Groq, OpenRouter, ...) are selected
/// through `base_url` rather than a separate client.
pub fn create_client(_config: &ModelConfig) -> Arc<dyn CompletionClient> {
    Arc::new(OpenAiClient::new())
}
