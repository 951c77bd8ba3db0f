//! The runtime that plays an exported fabula artifact.
//!
//! Navigation is a small state machine per node transition: resolve the
//! target's partition via the global map, merge that partition's structured
//! data and resource index into live state if it has not been merged yet,
//! render the node (resources sliced out of the partition blob by offset),
//! then prefetch every visible destination's partition so the common case of
//! following a shown action never blocks.
//!
//! The partition cache is append-only and memoized: repeated navigation to
//! an already-loaded partition never re-reads its payload. All lookup
//! misses at play time degrade (logged, blank resource, failed transition)
//! rather than panicking into the embedding UI.

pub mod artifact;
pub mod error;
pub mod runtime;

pub use artifact::{ArtifactDocument, DeferredBlocks, PayloadSource};
pub use error::{RuntimeError, RuntimeResult};
pub use runtime::{ActionView, EntityView, MomentView, StoryRuntime};
