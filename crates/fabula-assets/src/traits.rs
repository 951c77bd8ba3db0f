use fabula_types::{AssetCategory, AssetDigest};

use crate::error::StoreResult;
use crate::normalize::NormalizedAsset;
use crate::path::canonical_path;

/// Content-addressable asset store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written; a `put` for a digest the store already
///   holds is a no-op that still returns the canonical path (incremental
///   save).
/// - `get` resolves canonical paths by their category segment and must also
///   resolve the legacy flat layout for backward compatibility.
/// - A missing blob is `Ok(None)`, never an error; only real I/O failures
///   are propagated.
pub trait AssetStore: Send + Sync {
    /// Write a normalized asset under a category, skipping the write if its
    /// digest already exists there. Returns the canonical relative path.
    fn put(&self, category: AssetCategory, asset: &NormalizedAsset) -> StoreResult<String>;

    /// Resolve a store-relative path to bytes. `Ok(None)` when missing or
    /// when the path is not in any layout this store understands.
    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Whether a path currently resolves.
    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.get(path)?.is_some())
    }

    /// Whether a digest is already stored under a category.
    fn contains_digest(
        &self,
        category: AssetCategory,
        digest: &AssetDigest,
        ext: &str,
    ) -> StoreResult<bool> {
        self.exists(&canonical_path(category, digest, ext))
    }

    /// Whether writes reach durable storage.
    ///
    /// `false` signals the degraded no-persistent-directory environment; the
    /// session layer falls back to a fully inline export in that case.
    fn is_persistent(&self) -> bool;
}
