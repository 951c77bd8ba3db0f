//! Packing a graph partition: nodes keep their structure, asset references
//! become partition-local resource keys.

use serde::{Deserialize, Serialize};
use tracing::debug;

use fabula_graph::{Action, MomentNode, Partition};
use fabula_types::{ResourceKey, Slug};

use crate::packer::{ResourceIndex, ResourcePacker};

/// A moment whose visual references have been replaced by resource keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedMoment {
    pub slug: Slug,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `None` means "no illustration" and must short-circuit lookup.
    #[serde(default)]
    pub illustration: Option<ResourceKey>,
    #[serde(default)]
    pub entities: Vec<PackedEntity>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// An embedded entity with its sprite keyed into the partition blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedEntity {
    pub name: String,
    #[serde(default)]
    pub sprite: Option<ResourceKey>,
}

/// One partition ready for embedding: structured nodes + resource blob +
/// offset index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedPartition {
    pub number: u32,
    pub nodes: Vec<PackedMoment>,
    pub blob: String,
    pub index: ResourceIndex,
}

impl PackedPartition {
    /// Slice a resource value out of the blob by key.
    ///
    /// Returns `None` for unknown keys or corrupt (out-of-range) entries;
    /// the runtime degrades those to blank resources.
    pub fn slice(&self, key: &ResourceKey) -> Option<&str> {
        let (offset, length) = *self.index.get(key)?;
        self.blob.get(offset..offset + length)
    }
}

/// Pack one partition, resolving each node's asset references to payload
/// strings via `resolve` (typically: store path → inline data URI).
///
/// A reference that resolves to `None` or an empty payload packs as no
/// resource at all.
pub fn pack_partition<R>(partition: &Partition, mut resolve: R) -> PackedPartition
where
    R: FnMut(&str) -> Option<String>,
{
    let mut packer = ResourcePacker::new();
    let mut register = |reference: &Option<String>, packer: &mut ResourcePacker| {
        let payload = reference.as_deref().and_then(&mut resolve);
        packer.register_opt(payload.as_deref())
    };

    let nodes = partition
        .nodes
        .iter()
        .map(|node: &MomentNode| PackedMoment {
            slug: node.slug.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            illustration: register(&node.illustration, &mut packer),
            entities: node
                .entities
                .iter()
                .map(|entity| PackedEntity {
                    name: entity.name.clone(),
                    sprite: register(&entity.sprite, &mut packer),
                })
                .collect(),
            actions: node.actions.clone(),
        })
        .collect();

    let (blob, index) = packer.finish();
    debug!(
        partition = partition.number,
        resources = index.len(),
        blob_bytes = blob.len(),
        "packed partition"
    );
    PackedPartition {
        number: partition.number,
        nodes,
        blob,
        index,
    }
}
