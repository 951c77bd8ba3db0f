/// Errors from asset store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot accept writes (uploaded file sets).
    #[error("asset store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
