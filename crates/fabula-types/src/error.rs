/// Errors from parsing or validating foundation types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A decoded value had the wrong byte length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// An on-disk directory name does not map to any asset category.
    #[error("unknown asset category directory: {0}")]
    UnknownCategory(String),

    /// A slug came out empty after normalization.
    #[error("slug is empty after normalizing {0:?}")]
    EmptySlug(String),
}
