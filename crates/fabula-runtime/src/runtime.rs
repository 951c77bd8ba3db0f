//! The navigation state machine.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, warn};

use fabula_export::StoryExport;
use fabula_graph::{Action, Condition};
use fabula_pack::{PackedMoment, PackedPartition, ResourceIndex};
use fabula_types::{ResourceKey, Slug};

use crate::artifact::{ArtifactDocument, DeferredBlocks, PayloadSource};

/// A rendered moment ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentView {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    /// Resolved payload, or empty when the moment has no illustration (or
    /// its resource could not be found).
    pub illustration: String,
    pub entities: Vec<EntityView>,
    /// Only the actions whose conditions currently hold.
    pub actions: Vec<ActionView>,
}

/// An entity with its sprite payload resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityView {
    pub name: String,
    pub sprite: String,
}

/// A visible action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionView {
    pub label: String,
    pub destination: Slug,
}

/// Live play state over an exported story.
pub struct StoryRuntime<S: PayloadSource> {
    source: S,
    map: StoryExport,
    /// Merged nodes from every loaded partition.
    nodes: HashMap<Slug, PackedMoment>,
    /// Blob + offset index per loaded partition.
    resources: HashMap<u32, (String, ResourceIndex)>,
    /// Partitions already merged (attempted), including broken ones; the
    /// cache is append-only so nothing is ever fetched twice.
    loaded: HashSet<u32>,
    flags: HashSet<String>,
    inventory: HashMap<String, i64>,
    current: Option<Slug>,
}

impl StoryRuntime<DeferredBlocks> {
    /// Build a runtime from a parsed artifact.
    pub fn load(doc: ArtifactDocument) -> Self {
        Self::new(doc.map, doc.initial, doc.deferred)
    }
}

impl<S: PayloadSource> StoryRuntime<S> {
    /// Build a runtime from the global map, the inline first partition, and
    /// a source of deferred payloads.
    pub fn new(map: StoryExport, initial: PackedPartition, source: S) -> Self {
        let mut runtime = Self {
            source,
            map,
            nodes: HashMap::new(),
            resources: HashMap::new(),
            loaded: HashSet::new(),
            flags: HashSet::new(),
            inventory: HashMap::new(),
            current: None,
        };
        runtime.merge_partition(initial);
        runtime
    }

    /// Render the story's entry point.
    pub fn start(&mut self) -> Option<MomentView> {
        let start = self.map.start.clone();
        self.visit(&start)
    }

    /// Take a currently-visible action by label: apply its flag and
    /// inventory effects, then move to its destination.
    ///
    /// Returns `None` (state unchanged) if no visible action matches.
    pub fn take_action(&mut self, label: &str) -> Option<MomentView> {
        let current = self.current.clone()?;
        let action = self
            .nodes
            .get(&current)?
            .actions
            .iter()
            .find(|action| action.label == label && self.action_visible(action))
            .cloned();
        let Some(action) = action else {
            warn!(moment = %current, label, "no visible action with that label");
            return None;
        };
        self.apply_effects(&action);
        self.visit(&action.destination)
    }

    /// Transition to a moment: load its partition on demand, render it, and
    /// prefetch every visible destination's partition.
    ///
    /// A moment missing from the map or from its loaded partition fails
    /// this one transition (logged); the current view simply stays.
    pub fn visit(&mut self, slug: &Slug) -> Option<MomentView> {
        let Some(number) = self.map.assignment.get(slug).copied() else {
            error!(moment = %slug, "moment has no partition assignment");
            return None;
        };
        self.ensure_loaded(number);
        let Some(node) = self.nodes.get(slug).cloned() else {
            error!(moment = %slug, partition = number, "moment missing after partition load");
            return None;
        };

        let view = MomentView {
            slug: node.slug.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            illustration: self.resource(number, node.illustration.as_ref()),
            entities: node
                .entities
                .iter()
                .map(|entity| EntityView {
                    name: entity.name.clone(),
                    sprite: self.resource(number, entity.sprite.as_ref()),
                })
                .collect(),
            actions: node
                .actions
                .iter()
                .filter(|action| self.action_visible(action))
                .map(|action| ActionView {
                    label: action.label.clone(),
                    destination: action.destination.clone(),
                })
                .collect(),
        };
        self.current = Some(node.slug);

        // Prefetch: begin loading every visible destination's partition now
        // so following a shown action rarely blocks. Failures are already
        // logged inside and deliberately ignored here.
        let prefetch: Vec<u32> = view
            .actions
            .iter()
            .filter_map(|action| self.map.assignment.get(&action.destination).copied())
            .collect();
        for number in prefetch {
            self.ensure_loaded(number);
        }

        Some(view)
    }

    /// Whether a flag is currently set.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Current count of an inventory item.
    pub fn item_count(&self, name: &str) -> i64 {
        self.inventory.get(name).copied().unwrap_or(0)
    }

    /// Partitions merged so far.
    pub fn loaded_partitions(&self) -> usize {
        self.loaded.len()
    }

    fn action_visible(&self, action: &Action) -> bool {
        action.conditions.iter().all(|condition| match condition {
            Condition::RequireFlag(flag) => self.flags.contains(flag),
            Condition::RequireItem { item, amount } => self.item_count(item) >= *amount as i64,
            Condition::SetFlag(_) | Condition::AdjustItem { .. } => true,
        })
    }

    fn apply_effects(&mut self, action: &Action) {
        for condition in &action.conditions {
            match condition {
                Condition::SetFlag(flag) => {
                    self.flags.insert(flag.clone());
                }
                Condition::AdjustItem { item, amount } => {
                    *self.inventory.entry(item.clone()).or_insert(0) += amount;
                }
                Condition::RequireFlag(_) | Condition::RequireItem { .. } => {}
            }
        }
    }

    /// Load and merge a partition exactly once. A missing or unparseable
    /// payload is logged; its resources will resolve to empty.
    fn ensure_loaded(&mut self, number: u32) {
        if !self.loaded.insert(number) {
            return;
        }
        let Some(payload) = self.source.deferred_payload(number) else {
            warn!(partition = number, "deferred payload block not found");
            return;
        };
        match serde_json::from_str::<PackedPartition>(payload) {
            Ok(partition) => self.merge_partition(partition),
            Err(e) => warn!(partition = number, error = %e, "deferred payload unparseable"),
        }
    }

    fn merge_partition(&mut self, partition: PackedPartition) {
        debug!(
            partition = partition.number,
            nodes = partition.nodes.len(),
            "merging partition into live state"
        );
        self.loaded.insert(partition.number);
        for node in partition.nodes {
            // Append-only: the first definition of a slug wins.
            self.nodes.entry(node.slug.clone()).or_insert(node);
        }
        self.resources
            .insert(partition.number, (partition.blob, partition.index));
    }

    /// Slice a resource by key out of a partition's blob. A `None` key is
    /// "no resource" and short-circuits; misses degrade to empty.
    fn resource(&self, partition: u32, key: Option<&ResourceKey>) -> String {
        let Some(key) = key else {
            return String::new();
        };
        let Some((blob, index)) = self.resources.get(&partition) else {
            warn!(partition, "no resource blob for partition");
            return String::new();
        };
        let Some((offset, length)) = index.get(key).copied() else {
            warn!(partition, key = %key, "resource key not in index");
            return String::new();
        };
        match blob.get(offset..offset + length) {
            Some(value) => value.to_string(),
            None => {
                warn!(partition, key = %key, offset, length, "resource entry out of range");
                String::new()
            }
        }
    }
}
