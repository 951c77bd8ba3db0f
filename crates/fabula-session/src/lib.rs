//! High-level session API over one fabula project.
//!
//! A [`ProjectSession`] is the explicit context object that owns what used
//! to be global mutable state: the project directory handle, the asset
//! store backend, and the remote fetcher. One authoring session means one
//! `ProjectSession`; concurrent saves are neither expected nor guarded
//! against.
//!
//! The save flow has weak consistency by design: assets are written to the
//! store as they are serialized, then the document lands last. A failure
//! partway leaves whatever the completed writes produced — extra blobs in a
//! content-addressed store are harmless and the previous document is still
//! intact.

pub mod convert;
pub mod error;
pub mod export;
pub mod session;

pub use convert::story_nodes;
pub use error::{SessionError, SessionResult};
pub use export::export_story;
pub use session::ProjectSession;
