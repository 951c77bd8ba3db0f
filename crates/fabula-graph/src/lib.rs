//! The story graph and its export-time partitioner.
//!
//! A story is a directed graph of [`MomentNode`]s whose edges are gated
//! [`Action`]s, identified by stable human-derived slugs. At export time the
//! graph is cut into an ordered set of bounded-size [`Partition`]s by a
//! breadth-first bin-packing traversal seeded at the start node, so the
//! exported artifact can load one partition at a time on demand.
//!
//! # Invariants
//!
//! - Slugs are unique across the graph; duplicates are a fatal precondition
//!   reported with every colliding title before any partition work.
//! - Every node reachable from the start belongs to exactly one partition;
//!   unreachable nodes are never visited and never exported.
//! - No partition exceeds the configured size bound.
//! - Dangling action destinations are dropped at partition time.

pub mod error;
pub mod node;
pub mod partition;

pub use error::{GraphError, GraphResult};
pub use node::{Action, Condition, Entity, MomentNode, StoryGraph};
pub use partition::{
    partition, Partition, PartitionSet, BUNDLED_PARTITION_SIZE, GRANULAR_PARTITION_SIZE,
};
