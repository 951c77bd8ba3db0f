//! Versioned document loading.
//!
//! Old projects were saved before the categorized store existed: no
//! `manifestImagenes` key, and image fields pointing into a flat `Imagenes/`
//! folder. The loader detects the version by structural signature and runs a
//! pure migration, so callers always receive a canonical-form document. The
//! old on-disk tree is never rewritten; [`DirAssetStore`] keeps resolving it.
//!
//! [`DirAssetStore`]: fabula_assets::DirAssetStore

use serde_json::Value;
use tracing::info;

use crate::document::ProjectDocument;
use crate::error::{ProjectError, ProjectResult};
use crate::schema::walk_image_fields;

/// Detected document format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentVersion {
    /// Pre-manifest format with flat `Imagenes/` paths.
    Legacy,
    /// Current format: categorized paths + image manifest.
    Canonical,
}

impl DocumentVersion {
    /// Detect the version of a parsed document by structural signature.
    pub fn detect(root: &Value) -> ProjectResult<Self> {
        let object = root.as_object().ok_or(ProjectError::NotAnObject)?;
        if object.contains_key("manifestImagenes") {
            Ok(Self::Canonical)
        } else {
            Ok(Self::Legacy)
        }
    }
}

/// Parse a `proyecto.json` payload, migrating legacy documents in memory.
pub fn load_document(raw: &str) -> ProjectResult<ProjectDocument> {
    let value: Value = serde_json::from_str(raw)?;
    let version = DocumentVersion::detect(&value)?;
    let mut doc: ProjectDocument = serde_json::from_value(value)?;
    if version == DocumentVersion::Legacy {
        info!(title = %doc.title, "migrating legacy document");
        migrate_legacy(&mut doc);
    }
    Ok(doc)
}

/// Pure legacy → canonical migration.
///
/// Flat `Imagenes/<file>` references become `Assets/Datos/<file>`; the store
/// falls back to the legacy directory when the canonical location is absent,
/// so the rewritten paths stay resolvable without touching disk. The
/// manifest starts empty and fills on the next save.
pub fn migrate_legacy(doc: &mut ProjectDocument) {
    walk_image_fields(doc, |field, _category| {
        if let Some(file) = field.strip_prefix("Imagenes/") {
            *field = format!("Assets/Datos/{file}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_document_is_detected() {
        let raw = r#"{"titulo": "x", "manifestImagenes": {}, "momentos": []}"#;
        let value: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(
            DocumentVersion::detect(&value).unwrap(),
            DocumentVersion::Canonical
        );
    }

    #[test]
    fn legacy_document_is_migrated() {
        let raw = r#"{
            "titulo": "Vieja historia",
            "personajes": [{"nombre": "Iris", "imagen": "Imagenes/iris.png"}],
            "momentos": [{"titulo": "Inicio", "ilustracion": "Imagenes/inicio.png"}]
        }"#;
        let doc = load_document(raw).unwrap();
        assert_eq!(doc.characters[0].image, "Assets/Datos/iris.png");
        assert_eq!(doc.moments[0].illustration, "Assets/Datos/inicio.png");
        assert!(doc.image_manifest.is_empty());
    }

    #[test]
    fn migration_leaves_non_legacy_fields_alone() {
        let raw = r#"{
            "titulo": "x",
            "personajes": [
                {"nombre": "A", "imagen": ""},
                {"nombre": "B", "imagen": "data:image/png;base64,AAAA"}
            ]
        }"#;
        let doc = load_document(raw).unwrap();
        assert_eq!(doc.characters[0].image, "");
        assert_eq!(doc.characters[1].image, "data:image/png;base64,AAAA");
    }

    #[test]
    fn non_object_root_is_rejected() {
        let value: Value = serde_json::from_str("[1, 2]").unwrap();
        assert!(matches!(
            DocumentVersion::detect(&value),
            Err(ProjectError::NotAnObject)
        ));
    }
}
