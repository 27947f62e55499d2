/// Errors from the analysis agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid agent configuration: {0}")]
    Config(String),
    #[error("event payload must be a record object or an array of record objects")]
    MalformedEvent,
    #[error("record field '{0}' is missing or not numeric")]
    MissingField(String),
    #[error("agent has not been initialized")]
    NotInitialized,
    #[error("failed to prepare output directory '{path}': {reason}")]
    OutputDir { path: String, reason: String },
    #[error("failed to serialize report payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] causeway_gcm::GcmError),
}
