use std::path::PathBuf;

use tracing::{debug, info};

use fabula_assets::{
    AssetStore, DirAssetStore, HttpFetcher, MemoryAssetStore, RemoteFetcher, UploadedFileSet,
};
use fabula_export::ExportMode;
use fabula_project::{
    load_document, rehydrate_assets, serialize_assets, AssetReport, ProjectDocument, DOCUMENT_NAME,
};

use crate::error::{SessionError, SessionResult};
use crate::export::export_story;

/// One authoring session over one project.
///
/// Owns the directory handle, the asset store backend and the remote
/// fetcher; every save/load/export call goes through the session instead of
/// hidden module state.
pub struct ProjectSession {
    root: Option<PathBuf>,
    store: Box<dyn AssetStore>,
    fetcher: Box<dyn RemoteFetcher>,
}

impl ProjectSession {
    /// Open a session on a project directory with full filesystem access.
    pub fn open(root: impl Into<PathBuf>) -> SessionResult<Self> {
        let root = root.into();
        let store = DirAssetStore::open(&root)?;
        Ok(Self {
            root: Some(root),
            store: Box::new(store),
            fetcher: Box::new(HttpFetcher::new()),
        })
    }

    /// Open a detached session for environments without persistent
    /// directory access: asset writes are held in memory and exports fall
    /// back to the fully inline mode.
    pub fn detached() -> Self {
        Self {
            root: None,
            store: Box::new(MemoryAssetStore::new()),
            fetcher: Box::new(HttpFetcher::new()),
        }
    }

    /// Replace the remote fetcher (tests, offline operation).
    pub fn with_fetcher(mut self, fetcher: impl RemoteFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Whether saves reach durable storage.
    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }

    /// Save: write every new asset blob to the store, rewrite image fields
    /// to canonical paths, then persist the document.
    ///
    /// No rollback on partial failure; completed blob writes stay (they are
    /// content-addressed and harmless) and the previous document survives
    /// until the final write.
    pub fn save(&self, doc: &mut ProjectDocument) -> SessionResult<AssetReport> {
        let report = serialize_assets(doc, self.store.as_ref(), self.fetcher.as_ref());
        if let Some(root) = &self.root {
            let json = serde_json::to_string_pretty(doc)?;
            std::fs::write(root.join(DOCUMENT_NAME), json)?;
            info!(
                title = %doc.title,
                written = report.written,
                reused = report.reused,
                cleared = report.cleared,
                "saved project"
            );
        } else {
            debug!("detached session: document write deferred");
        }
        Ok(report)
    }

    /// Load the project from the session directory, migrating legacy
    /// documents and rehydrating every image field for display.
    pub fn load(&self) -> SessionResult<ProjectDocument> {
        let root = self.root.as_ref().ok_or(SessionError::NoProjectDirectory)?;
        let raw = std::fs::read_to_string(root.join(DOCUMENT_NAME))?;
        let mut doc = load_document(&raw)?;
        rehydrate_assets(&mut doc, self.store.as_ref());
        Ok(doc)
    }

    /// Load a project from a flat uploaded file set (no directory access).
    pub fn load_from_upload(
        files: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> SessionResult<ProjectDocument> {
        let set = UploadedFileSet::new(files);
        let raw = set.raw(DOCUMENT_NAME).ok_or(SessionError::DocumentMissing)?;
        let mut doc = load_document(&String::from_utf8_lossy(raw))?;
        rehydrate_assets(&mut doc, &set);
        Ok(doc)
    }

    /// Export the document as a standalone artifact.
    pub fn export(&self, doc: &ProjectDocument, mode: ExportMode) -> SessionResult<String> {
        export_story(doc, self.store.as_ref(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_assets::{encode_data_uri, OfflineFetcher};
    use fabula_project::{ActionRecord, Character, MomentRecord};
    use fabula_runtime::{ArtifactDocument, StoryRuntime};

    fn sample_doc() -> ProjectDocument {
        ProjectDocument {
            title: "La Torre".into(),
            characters: vec![Character {
                name: "Iris".into(),
                image: encode_data_uri("image/png", b"iris portrait"),
                ..Default::default()
            }],
            moments: vec![
                MomentRecord {
                    title: "Gate".into(),
                    description: "A locked gate.".into(),
                    illustration: encode_data_uri("image/png", b"gate art"),
                    actions: vec![ActionRecord {
                        label: "Climb over".into(),
                        destination: "Courtyard".into(),
                        conditions: Vec::new(),
                    }],
                    ..Default::default()
                },
                MomentRecord {
                    title: "Courtyard".into(),
                    description: "Inside the walls.".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn save_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let session = ProjectSession::open(dir.path())
            .unwrap()
            .with_fetcher(OfflineFetcher);
        let mut doc = sample_doc();
        let original_portrait = doc.characters[0].image.clone();

        session.save(&mut doc).unwrap();
        assert!(dir.path().join(DOCUMENT_NAME).is_file());
        assert!(doc.characters[0].image.starts_with("Assets/Personajes/"));

        let loaded = session.load().unwrap();
        assert_eq!(loaded.title, "La Torre");
        assert_eq!(loaded.characters[0].image, original_portrait);
        assert_eq!(loaded.image_manifest.len(), 2);
    }

    #[test]
    fn second_save_writes_no_new_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let session = ProjectSession::open(dir.path())
            .unwrap()
            .with_fetcher(OfflineFetcher);
        let mut doc = sample_doc();

        let first = session.save(&mut doc).unwrap();
        assert_eq!(first.written, 2);
        let second = session.save(&mut doc).unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.reused, 2);
    }

    #[test]
    fn load_from_upload_resolves_flat_files() {
        let dir = tempfile::tempdir().unwrap();
        let session = ProjectSession::open(dir.path())
            .unwrap()
            .with_fetcher(OfflineFetcher);
        let mut doc = sample_doc();
        session.save(&mut doc).unwrap();

        // Flatten the saved tree the way a browser upload would.
        let mut files = vec![(
            DOCUMENT_NAME.to_string(),
            std::fs::read(dir.path().join(DOCUMENT_NAME)).unwrap(),
        )];
        for entry in walk_files(dir.path().join("Assets")) {
            files.push(entry);
        }

        let loaded = ProjectSession::load_from_upload(files).unwrap();
        assert_eq!(
            loaded.characters[0].image,
            encode_data_uri("image/png", b"iris portrait")
        );
    }

    fn walk_files(dir: PathBuf) -> Vec<(String, Vec<u8>)> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                out.extend(walk_files(path));
            } else {
                out.push((
                    path.file_name().unwrap().to_string_lossy().into_owned(),
                    std::fs::read(&path).unwrap(),
                ));
            }
        }
        out
    }

    #[test]
    fn exported_artifact_plays_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let session = ProjectSession::open(dir.path())
            .unwrap()
            .with_fetcher(OfflineFetcher);
        let mut doc = sample_doc();
        session.save(&mut doc).unwrap();

        let html = session.export(&doc, ExportMode::Granular).unwrap();
        let artifact = ArtifactDocument::parse(&html).unwrap();
        let mut runtime = StoryRuntime::load(artifact);

        let view = runtime.start().unwrap();
        assert_eq!(view.title, "Gate");
        assert_eq!(view.illustration, encode_data_uri("image/png", b"gate art"));

        let next = runtime.take_action("Climb over").unwrap();
        assert_eq!(next.title, "Courtyard");
    }

    #[test]
    fn detached_session_exports_fully_inline() {
        let session = ProjectSession::detached().with_fetcher(OfflineFetcher);
        let mut doc = sample_doc();
        session.save(&mut doc).unwrap();
        assert!(!session.is_persistent());

        let html = session.export(&doc, ExportMode::Granular).unwrap();
        // Inline fallback: a single partition, no deferred blocks, assets
        // embedded as data URIs.
        assert!(!html.contains("id=\"fabula-part-2\""));
        let artifact = ArtifactDocument::parse(&html).unwrap();
        assert!(artifact.deferred.is_empty());
        let mut runtime = StoryRuntime::load(artifact);
        let view = runtime.start().unwrap();
        assert_eq!(view.illustration, encode_data_uri("image/png", b"gate art"));
    }

    #[test]
    fn load_without_directory_is_rejected() {
        let session = ProjectSession::detached();
        assert!(matches!(
            session.load(),
            Err(SessionError::NoProjectDirectory)
        ));
    }
}
