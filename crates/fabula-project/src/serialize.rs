//! Asset serialization (fields → store paths) and rehydration (paths →
//! displayable data URIs).
//!
//! Both directions recover per field: one corrupt or missing asset degrades
//! that one field to the empty string and processing continues. Neither
//! direction ever fails the whole document.

use tracing::{debug, warn};

use fabula_assets::{
    digest_from_path, encode_data_uri, ext_to_mime, normalize, parse_store_path, AssetStore,
    ManifestEntry, Normalized, RemoteFetcher,
};

use crate::document::ProjectDocument;
use crate::schema::walk_image_fields;

/// Counts from one serialize or rehydrate pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// Fields whose blob was newly recorded this pass.
    pub written: usize,
    /// Fields that already held (or whose digest already had) a stored blob.
    pub reused: usize,
    /// Fields degraded to empty by a per-asset failure.
    pub cleared: usize,
}

/// Walk every image field, store its payload, and rewrite the field to the
/// canonical store path.
///
/// Idempotent: a field that already holds a canonical path is left alone, so
/// re-serializing a saved document writes nothing.
pub fn serialize_assets(
    doc: &mut ProjectDocument,
    store: &dyn AssetStore,
    fetcher: &dyn RemoteFetcher,
) -> AssetReport {
    let mut report = AssetReport::default();
    // Take the manifest out so the walk can borrow the document mutably.
    let mut manifest = std::mem::take(&mut doc.image_manifest);

    walk_image_fields(doc, |field, category| {
        match normalize(field, fetcher) {
            Normalized::AlreadyStored(path) => {
                debug!(%path, "field already canonical");
                report.reused += 1;
            }
            Normalized::Missing => {
                if !field.is_empty() {
                    report.cleared += 1;
                    field.clear();
                }
            }
            Normalized::Asset(asset) => match store.put(category, &asset) {
                Ok(path) => {
                    let entry = ManifestEntry {
                        stored_name: format!("{}.{}", asset.digest.to_hex(), asset.ext),
                        mime: asset.mime.clone(),
                        byte_size: asset.byte_size(),
                    };
                    if manifest.record(&asset.digest, entry) {
                        report.written += 1;
                    } else {
                        report.reused += 1;
                    }
                    *field = path;
                }
                Err(e) => {
                    warn!(category = %category, error = %e, "asset write failed, clearing field");
                    field.clear();
                    report.cleared += 1;
                }
            },
        }
    });

    doc.image_manifest = manifest;
    report
}

/// Walk every image field and replace store paths with displayable inline
/// data URIs read back from the given source (a live directory or an
/// uploaded file set).
///
/// Unresolvable paths become the empty string; one missing file never blocks
/// loading the rest of the project.
pub fn rehydrate_assets(doc: &mut ProjectDocument, source: &dyn AssetStore) -> AssetReport {
    let mut report = AssetReport::default();
    let manifest = std::mem::take(&mut doc.image_manifest);

    walk_image_fields(doc, |field, _category| {
        if parse_store_path(field).is_none() {
            // Empty or already-transient fields stay as they are.
            return;
        }
        let bytes = match source.get(field) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(path = %field, "stored asset missing, clearing field");
                field.clear();
                report.cleared += 1;
                return;
            }
            Err(e) => {
                warn!(path = %field, error = %e, "asset read failed, clearing field");
                field.clear();
                report.cleared += 1;
                return;
            }
        };
        let mime = digest_from_path(field)
            .and_then(|digest| manifest.get(&digest).map(|entry| entry.mime.clone()))
            .unwrap_or_else(|| mime_from_path(field).to_string());
        *field = encode_data_uri(&mime, &bytes);
        report.reused += 1;
    });

    doc.image_manifest = manifest;
    report
}

fn mime_from_path(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    ext_to_mime(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Character, MomentRecord};
    use fabula_assets::normalize::encode_data_uri;
    use fabula_assets::{MemoryAssetStore, OfflineFetcher};

    fn doc_with_character_image(image: &str) -> ProjectDocument {
        ProjectDocument {
            characters: vec![Character {
                name: "Iris".into(),
                image: image.into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn serialize_rewrites_data_uri_to_store_path() {
        let store = MemoryAssetStore::new();
        let mut doc = doc_with_character_image(&encode_data_uri("image/png", b"portrait"));

        let report = serialize_assets(&mut doc, &store, &OfflineFetcher);

        assert_eq!(report.written, 1);
        assert!(doc.characters[0].image.starts_with("Assets/Personajes/"));
        assert_eq!(doc.image_manifest.len(), 1);
    }

    #[test]
    fn serialize_is_idempotent() {
        let store = MemoryAssetStore::new();
        let mut doc = doc_with_character_image(&encode_data_uri("image/png", b"portrait"));

        serialize_assets(&mut doc, &store, &OfflineFetcher);
        let canonical = doc.characters[0].image.clone();
        let report = serialize_assets(&mut doc, &store, &OfflineFetcher);

        assert_eq!(doc.characters[0].image, canonical);
        assert_eq!(report.written, 0);
        assert_eq!(report.reused, 1);
    }

    #[test]
    fn identical_bytes_share_one_blob_and_one_manifest_entry() {
        let store = MemoryAssetStore::new();
        let uri = encode_data_uri("image/png", b"shared art");
        let mut doc = ProjectDocument {
            characters: vec![
                Character {
                    name: "A".into(),
                    image: uri.clone(),
                    ..Default::default()
                },
                Character {
                    name: "B".into(),
                    image: uri,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let report = serialize_assets(&mut doc, &store, &OfflineFetcher);

        assert_eq!(store.len(), 1);
        assert_eq!(doc.image_manifest.len(), 1);
        assert_eq!(report.written, 1);
        assert_eq!(report.reused, 1);
        assert_eq!(doc.characters[0].image, doc.characters[1].image);
    }

    #[test]
    fn failed_remote_fetch_clears_only_that_field() {
        let store = MemoryAssetStore::new();
        let mut doc = ProjectDocument {
            characters: vec![Character {
                name: "A".into(),
                image: "https://example.invalid/a.png".into(),
                ..Default::default()
            }],
            moments: vec![MomentRecord {
                title: "Intro".into(),
                illustration: encode_data_uri("image/png", b"fine"),
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = serialize_assets(&mut doc, &store, &OfflineFetcher);

        assert_eq!(doc.characters[0].image, "");
        assert!(doc.moments[0].illustration.starts_with("Assets/Momentos/"));
        assert_eq!(report.cleared, 1);
        assert_eq!(report.written, 1);
    }

    #[test]
    fn roundtrip_restores_byte_identical_content() {
        let store = MemoryAssetStore::new();
        let original = encode_data_uri("image/png", b"portrait bytes");
        let mut doc = doc_with_character_image(&original);

        serialize_assets(&mut doc, &store, &OfflineFetcher);
        rehydrate_assets(&mut doc, &store);

        assert_eq!(doc.characters[0].image, original);
    }

    #[test]
    fn rehydrate_missing_asset_clears_field() {
        let store = MemoryAssetStore::new();
        let mut doc = doc_with_character_image(
            "Assets/Personajes/0000000000000000000000000000000000000000000000000000000000000000.png",
        );

        let report = rehydrate_assets(&mut doc, &store);

        assert_eq!(doc.characters[0].image, "");
        assert_eq!(report.cleared, 1);
    }

    #[test]
    fn rehydrate_leaves_transient_fields_alone() {
        let store = MemoryAssetStore::new();
        let uri = encode_data_uri("image/png", b"unsaved");
        let mut doc = doc_with_character_image(&uri);
        rehydrate_assets(&mut doc, &store);
        assert_eq!(doc.characters[0].image, uri);
    }
}
