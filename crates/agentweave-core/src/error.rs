use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeaveError {
    // Completion provider errors
    #[error("completion request failed: {0}")]
    Completion(String),

    #[error("completion response parse error: {0}")]
    CompletionParse(String),

    #[error("completion provider not configured")]
    CompletionUnconfigured,

    // Workflow errors
    #[error("workflow error: {0}")]
    Workflow(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    // Gateway errors
    #[error("gateway error: {0}")]
    Gateway(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WeaveError>;
