//! Content-addressable asset storage for fabula.
//!
//! Binary assets (images, mostly) are stored once per unique content digest
//! under a fixed set of typed subdirectories, so incremental saves only write
//! what is new. The store layout is:
//!
//! ```text
//! <root>/Assets/<Category>/<digest>.<ext>
//! ```
//!
//! with a legacy flat layout `<root>/Imagenes/<file>` still readable (never
//! written) for older project trees.
//!
//! # Components
//!
//! - [`normalize`] — turns an arbitrary image reference (data-URI, remote
//!   URL, existing store path) into canonical bytes plus a stable digest
//! - [`DirAssetStore`] — filesystem-backed store rooted at the project dir
//! - [`MemoryAssetStore`] — degraded backend for environments without
//!   persistent directory access (writes held in memory)
//! - [`UploadedFileSet`] — read-only backend over a flat uploaded file map
//! - [`AssetManifest`] — append-only digest → entry map persisted with the
//!   project document
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written; the store only grows.
//! 2. A write for an existing digest is skipped, never repeated.
//! 3. Per-asset failures (broken URL, undecodable payload, missing file)
//!    degrade to "no asset" so one bad reference never aborts a save or load.

pub mod error;
pub mod manifest;
pub mod memory;
pub mod normalize;
pub mod path;
pub mod store;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use manifest::{AssetManifest, ManifestEntry};
pub use memory::{MemoryAssetStore, UploadedFileSet};
pub use normalize::{
    encode_data_uri, ext_to_mime, mime_to_ext, normalize, FetchedImage, HttpFetcher, ImageSource,
    Normalized, NormalizedAsset, OfflineFetcher, RemoteFetcher,
};
pub use path::{canonical_path, digest_from_path, is_store_path, parse_store_path, ParsedPath};
pub use store::DirAssetStore;
pub use traits::AssetStore;
