/// Errors from artifact assembly.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing to export: the partition list was empty.
    #[error("no partitions to export")]
    NoPartitions,

    /// The start node is missing from the first partition.
    #[error("start moment {0} is not in partition 1")]
    StartMissing(String),

    /// A payload could not be serialized.
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document template failed to render.
    #[error("template render error: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Result alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
