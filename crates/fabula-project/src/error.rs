/// Errors from document loading and persistence.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The document is not valid JSON or does not match the schema.
    #[error("document parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top level of the document is not an object.
    #[error("document root is not an object")]
    NotAnObject,
}

/// Result alias for document operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
