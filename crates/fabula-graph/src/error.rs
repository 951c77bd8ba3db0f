use fabula_types::Slug;

/// Errors from graph construction and partitioning.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Two or more moments normalize to the same slug. Destination
    /// resolution is by slug, so this must fail the whole export before any
    /// partition work, naming every colliding title.
    #[error("duplicate moment names: {}", .collisions.join("; "))]
    DuplicateSlugs { collisions: Vec<String> },

    /// The start node does not exist in the graph.
    #[error("start moment not found: {0}")]
    StartNotFound(Slug),

    /// A moment title produced no usable slug.
    #[error("unusable moment title: {0}")]
    BadTitle(#[from] fabula_types::TypeError),

    /// A partition size bound of zero can never hold a node.
    #[error("partition size bound must be at least 1")]
    InvalidBound,
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
