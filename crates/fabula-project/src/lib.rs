//! The fabula project document: schema, (de)serialization and migration.
//!
//! A project is persisted as a single `proyecto.json` whose image-bearing
//! fields hold either an empty string, a transient inline data URI
//! (pre-save), or a canonical store-relative path (post-save). This crate
//! owns:
//!
//! - the typed document model ([`ProjectDocument`] and its collections),
//!   serde-renamed to the external field names
//! - the explicit image-field schema walk ([`schema::walk_image_fields`]) —
//!   the single place that decides "what has an image"
//! - the asset serializer/rehydrator ([`serialize_assets`],
//!   [`rehydrate_assets`]) bridging document fields and the asset store
//! - the versioned loader ([`load_document`]) that detects and migrates the
//!   legacy single-folder format

pub mod document;
pub mod error;
pub mod migrate;
pub mod schema;
pub mod serialize;

pub use document::{
    ActionRecord, Chapter, Character, ConditionRecord, ElementPosition, EmbeddedEntity, Folder,
    MomentRecord, ProjectDocument, SceneRecord,
};
pub use error::{ProjectError, ProjectResult};
pub use migrate::{load_document, DocumentVersion};
pub use serialize::{rehydrate_assets, serialize_assets, AssetReport};

/// The document's filename at the project root.
pub const DOCUMENT_NAME: &str = "proyecto.json";
