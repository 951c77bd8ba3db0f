//! The export flow: precondition checks, partitioning, packing, assembly.

use tracing::{info, warn};

use fabula_assets::{digest_from_path, encode_data_uri, ext_to_mime, is_store_path, AssetStore};
use fabula_export::{assemble, ExportMode};
use fabula_graph::{partition, StoryGraph};
use fabula_pack::pack_partition;
use fabula_project::ProjectDocument;

use crate::convert::story_nodes;
use crate::error::{SessionError, SessionResult};

/// Export the document as one standalone artifact.
///
/// The opening moment is the first element of the moment list. The
/// duplicate-name precondition is checked before any partition work, so a
/// failed export produces nothing partial. A non-persistent store forces
/// [`ExportMode::Inline`], the documented fallback for environments without
/// directory access.
pub fn export_story(
    doc: &ProjectDocument,
    store: &dyn AssetStore,
    mode: ExportMode,
) -> SessionResult<String> {
    let mode = if store.is_persistent() {
        mode
    } else {
        if mode != ExportMode::Inline {
            info!("store is not persistent, falling back to inline export");
        }
        ExportMode::Inline
    };

    let nodes = story_nodes(doc)?;
    let Some(start) = nodes.first().map(|node| node.slug.clone()) else {
        return Err(SessionError::EmptyStory);
    };
    let graph = StoryGraph::from_moments(nodes)?;
    let set = partition(&graph, &start, mode.partition_bound())?;

    let packed: Vec<_> = set
        .partitions
        .iter()
        .map(|p| pack_partition(p, |reference| resolve_reference(doc, store, reference)))
        .collect();

    let html = assemble(&doc.title, &start, &set.assignment, &packed)?;
    info!(
        title = %doc.title,
        partitions = packed.len(),
        bytes = html.len(),
        "exported story"
    );
    Ok(html)
}

/// Turn an asset reference into the displayable payload packed into the
/// partition blob: data URIs pass through, store paths are read back and
/// inlined, anything else (or any miss) packs as no resource.
fn resolve_reference(
    doc: &ProjectDocument,
    store: &dyn AssetStore,
    reference: &str,
) -> Option<String> {
    if reference.starts_with("data:") {
        return Some(reference.to_string());
    }
    if !is_store_path(reference) {
        return None;
    }
    let bytes = match store.get(reference) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            warn!(path = reference, "export reference missing from store");
            return None;
        }
        Err(e) => {
            warn!(path = reference, error = %e, "export reference unreadable");
            return None;
        }
    };
    let mime = digest_from_path(reference)
        .and_then(|digest| doc.image_manifest.get(&digest).map(|e| e.mime.clone()))
        .unwrap_or_else(|| {
            ext_to_mime(reference.rsplit('.').next().unwrap_or("")).to_string()
        });
    Some(encode_data_uri(&mime, &bytes))
}
