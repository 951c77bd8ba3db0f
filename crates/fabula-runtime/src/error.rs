/// Errors from artifact parsing.
///
/// Play-time lookup misses are deliberately not errors: they are logged and
/// degrade to blank output per the runtime's failure semantics.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A required section of the artifact is absent or unreadable.
    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),

    /// An embedded payload failed to parse as JSON.
    #[error("payload parse error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
