use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use fabula_types::AssetCategory;

use crate::error::StoreResult;
use crate::normalize::NormalizedAsset;
use crate::path::{canonical_path, parse_store_path, ParsedPath, ASSETS_ROOT, LEGACY_ROOT};
use crate::traits::AssetStore;

/// Filesystem-backed asset store rooted at the project directory.
///
/// Category subdirectories are created eagerly on open (idempotent), so a
/// `put` never has to race directory creation. Reads additionally fall back
/// to the legacy flat `Imagenes/` layout, which is never written.
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    /// Open (and initialize) a store at the given project root.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for category in AssetCategory::ALL {
            std::fs::create_dir_all(root.join(ASSETS_ROOT).join(category.dir_name()))?;
        }
        Ok(Self { root })
    }

    /// The project root this store is mounted on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_file(&self, rel: &Path) -> StoreResult<Option<Vec<u8>>> {
        match std::fs::read(self.root.join(rel)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl AssetStore for DirAssetStore {
    fn put(&self, category: AssetCategory, asset: &NormalizedAsset) -> StoreResult<String> {
        let rel = canonical_path(category, &asset.digest, asset.ext);
        let full = self.root.join(&rel);
        if full.exists() {
            debug!(path = %rel, "digest already stored, skipping write");
            return Ok(rel);
        }
        std::fs::write(&full, &asset.bytes)?;
        debug!(path = %rel, bytes = asset.bytes.len(), "stored asset");
        Ok(rel)
    }

    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let Some(parsed) = parse_store_path(path) else {
            warn!(path, "asset lookup with a non-store path");
            return Ok(None);
        };
        match parsed {
            ParsedPath::Canonical { category, file } => {
                let rel = Path::new(ASSETS_ROOT).join(category.dir_name()).join(file);
                if let Some(bytes) = self.read_file(&rel)? {
                    return Ok(Some(bytes));
                }
                // Migrated documents may reference files that still live in
                // the old flat tree.
                self.read_file(&Path::new(LEGACY_ROOT).join(file))
            }
            ParsedPath::Legacy { file } => self.read_file(&Path::new(LEGACY_ROOT).join(file)),
        }
    }

    fn is_persistent(&self) -> bool {
        true
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
    fn open_creates_all_category_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path()).unwrap();
        for category in AssetCategory::ALL {
            assert!(store
                .root()
                .join(ASSETS_ROOT)
                .join(category.dir_name())
                .is_dir());
        }
        // And open is idempotent.
        DirAssetStore::open(dir.path()).unwrap();
    }

    #[test]
    fn put_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path()).unwrap();
        let asset = asset(b"scene backdrop");
        let path = store.put(AssetCategory::Scene, &asset).unwrap();
        assert_eq!(store.get(&path).unwrap().unwrap(), asset.bytes);
        assert!(store
            .contains_digest(AssetCategory::Scene, &asset.digest, asset.ext)
            .unwrap());
    }

    #[test]
    fn put_skips_existing_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path()).unwrap();
        let asset = asset(b"portrait");

        let path1 = store.put(AssetCategory::Character, &asset).unwrap();
        // Overwrite the backing file out-of-band; a second put must not
        // touch it because the digest is already present.
        std::fs::write(store.root().join(&path1), b"sentinel").unwrap();
        let path2 = store.put(AssetCategory::Character, &asset).unwrap();

        assert_eq!(path1, path2);
        assert_eq!(store.get(&path1).unwrap().unwrap(), b"sentinel");
    }

    #[test]
    fn get_missing_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path()).unwrap();
        let digest = fabula_types::AssetDigest::from_bytes(b"never stored");
        let path = canonical_path(AssetCategory::Moment, &digest, "png");
        assert!(store.get(&path).unwrap().is_none());
    }

    #[test]
    fn get_resolves_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path()).unwrap();
        let legacy_dir = dir.path().join(LEGACY_ROOT);
        std::fs::create_dir_all(&legacy_dir).unwrap();
        std::fs::write(legacy_dir.join("vieja.png"), b"old bytes").unwrap();

        assert_eq!(
            store.get("Imagenes/vieja.png").unwrap().unwrap(),
            b"old bytes"
        );
        // A migrated canonical path falls back to the legacy tree too.
        assert_eq!(
            store.get("Assets/Datos/vieja.png").unwrap().unwrap(),
            b"old bytes"
        );
    }

    #[test]
    fn non_store_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path()).unwrap();
        assert!(store.get("https://example.com/x.png").unwrap().is_none());
    }
}
