//! Foundation types for fabula, the persistence and export core of a
//! narrative authoring tool.
//!
//! Every other fabula crate depends on `fabula-types`.
//!
//! # Key Types
//!
//! - [`AssetDigest`] — Content-addressed identifier for a stored binary asset
//!   (BLAKE3 hash)
//! - [`AssetCategory`] — Fixed enumeration of store subdirectories, assigned
//!   at save time by calling context
//! - [`Slug`] — Stable, human-derived node identifier used for action
//!   destinations and partition assignment
//! - [`ResourceKey`] — Opaque per-partition key into a packed resource blob

pub mod category;
pub mod digest;
pub mod error;
pub mod resource;
pub mod slug;

pub use category::AssetCategory;
pub use digest::AssetDigest;
pub use error::TypeError;
pub use resource::ResourceKey;
pub use slug::Slug;
