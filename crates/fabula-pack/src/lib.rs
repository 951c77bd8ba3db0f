//! Per-partition resource packing.
//!
//! Each partition of the story graph ships with exactly the visual payloads
//! its own nodes need, concatenated into one string blob with a
//! `key → [offset, length]` index over it. The runtime never parses the
//! blob: it slices values straight out by index entry.
//!
//! # Guarantees
//!
//! - Offsets are monotonically increasing and non-overlapping.
//! - Empty or absent values produce no key, no index entry and no bytes.
//! - Keys come from a per-partition counter, so repacking the same
//!   partition yields the same keys and index (reproducible, diffable).
//! - The same value registered twice is stored twice: partitions are small
//!   and independently loaded, and cross-partition dedup is out of scope.

pub mod packer;
pub mod partition;

pub use packer::{ResourceIndex, ResourcePacker};
pub use partition::{pack_partition, PackedEntity, PackedMoment, PackedPartition};
