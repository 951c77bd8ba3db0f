use fabula_assets::StoreError;
use fabula_export::ExportError;
use fabula_graph::GraphError;
use fabula_project::ProjectError;

/// Errors from session-level operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// I/O failure reading or writing the project directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The project document failed to parse or migrate.
    #[error(transparent)]
    Document(#[from] ProjectError),

    /// Graph construction or partitioning failed (includes the fatal
    /// duplicate-name precondition, which lists every colliding title).
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Asset store access failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Artifact assembly failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The document could not be serialized for writing.
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The session has no project directory (detached mode).
    #[error("session has no project directory")]
    NoProjectDirectory,

    /// An uploaded file set does not contain the project document.
    #[error("uploaded files do not include proyecto.json")]
    DocumentMissing,

    /// The project has no moments to export.
    #[error("project has no moments to export")]
    EmptyStory,
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
