use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use fabula_types::AssetCategory;

use crate::error::{StoreError, StoreResult};
use crate::normalize::NormalizedAsset;
use crate::path::{canonical_path, parse_store_path};
use crate::traits::AssetStore;

/// In-memory, HashMap-based asset store.
///
/// The degraded backend for environments without persistent directory
/// access: writes are held in memory under their canonical paths (deferred,
/// never reaching disk) and the session layer is expected to fall back to a
/// fully inline export. Also convenient in tests.
pub struct MemoryAssetStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.files.read().expect("lock poisoned").is_empty()
    }
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore for MemoryAssetStore {
    fn put(&self, category: AssetCategory, asset: &NormalizedAsset) -> StoreResult<String> {
        let rel = canonical_path(category, &asset.digest, asset.ext);
        let mut files = self.files.write().expect("lock poisoned");
        // Idempotent: same digest always maps to the same bytes.
        files
            .entry(rel.clone())
            .or_insert_with(|| asset.bytes.clone());
        Ok(rel)
    }

    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let files = self.files.read().expect("lock poisoned");
        Ok(files.get(path).cloned())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for MemoryAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAssetStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

/// Read-only store over a flat uploaded file set.
///
/// When a project is loaded from an upload instead of a live directory, the
/// files arrive as one flat name → bytes map with no directory structure.
/// Canonical and legacy paths both resolve by their final filename segment.
pub struct UploadedFileSet {
    by_name: HashMap<String, Vec<u8>>,
}

impl UploadedFileSet {
    /// Build from uploaded (filename, bytes) pairs.
    pub fn new(files: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        Self {
            by_name: files.into_iter().collect(),
        }
    }

    /// Direct lookup by filename (e.g. the project document itself).
    pub fn raw(&self, name: &str) -> Option<&[u8]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// Number of uploaded files.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if the upload was empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl AssetStore for UploadedFileSet {
    fn put(&self, _category: AssetCategory, _asset: &NormalizedAsset) -> StoreResult<String> {
        Err(StoreError::ReadOnly)
    }

    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let Some(parsed) = parse_store_path(path) else {
            debug!(path, "upload lookup with a non-store path");
            return Ok(None);
        };
        Ok(self.by_name.get(parsed.file_name()).cloned())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{encode_data_uri, normalize, Normalized, OfflineFetcher};

    fn asset(bytes: &[u8]) -> NormalizedAsset {
        match normalize(&encode_data_uri("image/png", bytes), &OfflineFetcher) {
            Normalized::Asset(a) => a,
            other => panic!("expected asset, got {other:?}"),
        }
    }

    #[test]
    fn memory_put_get_roundtrip() {
        let store = MemoryAssetStore::new();
        let asset = asset(b"sprite");
        let path = store.put(AssetCategory::Moment, &asset).unwrap();
        assert_eq!(store.get(&path).unwrap().unwrap(), asset.bytes);
        assert!(!store.is_persistent());
    }

    #[test]
    fn memory_put_is_idempotent() {
        let store = MemoryAssetStore::new();
        let asset = asset(b"sprite");
        store.put(AssetCategory::Moment, &asset).unwrap();
        store.put(AssetCategory::Moment, &asset).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upload_resolves_by_filename_for_both_layouts() {
        let set = UploadedFileSet::new([("abc.png".to_string(), b"bytes".to_vec())]);
        assert_eq!(
            set.get("Assets/Personajes/abc.png").unwrap().unwrap(),
            b"bytes"
        );
        assert_eq!(set.get("Imagenes/abc.png").unwrap().unwrap(), b"bytes");
        assert!(set.get("Assets/Personajes/other.png").unwrap().is_none());
    }

    #[test]
    fn upload_rejects_writes() {
        let set = UploadedFileSet::new([]);
        let err = set.put(AssetCategory::Scene, &asset(b"x")).unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly));
    }
}
