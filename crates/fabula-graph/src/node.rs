use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use fabula_types::Slug;

use crate::error::{GraphError, GraphResult};

/// One story unit in the export graph.
///
/// `illustration` and entity sprites hold raw asset references (store paths
/// or data URIs) until the resource packer replaces them with partition-local
/// resource keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MomentNode {
    pub slug: Slug,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub illustration: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// An entity embedded in a moment, with an optional sprite reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub sprite: Option<String>,
}

/// An outgoing edge: a labelled action leading to another moment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub destination: Slug,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// A gate on an action: visibility requirements and on-take effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Set a flag when the action is taken.
    SetFlag(String),
    /// Visible only while the flag is set.
    RequireFlag(String),
    /// Adjust an inventory count when the action is taken.
    AdjustItem { item: String, amount: i64 },
    /// Visible only while holding at least `amount` of the item.
    RequireItem { item: String, amount: u64 },
}

/// The full story graph, keyed by slug in authoring order.
#[derive(Clone, Debug, Default)]
pub struct StoryGraph {
    nodes: IndexMap<Slug, MomentNode>,
}

impl StoryGraph {
    /// Build a graph from moments, enforcing the unique-slug precondition.
    ///
    /// On collision the error lists every offending title, grouped by slug,
    /// so the author can rename the moments it names.
    pub fn from_moments(moments: Vec<MomentNode>) -> GraphResult<Self> {
        let mut titles_by_slug: HashMap<Slug, Vec<String>> = HashMap::new();
        for moment in &moments {
            titles_by_slug
                .entry(moment.slug.clone())
                .or_default()
                .push(moment.title.clone());
        }
        let mut collisions: Vec<String> = titles_by_slug
            .iter()
            .filter(|(_, titles)| titles.len() > 1)
            .map(|(slug, titles)| format!("'{slug}' from: {}", titles.join(", ")))
            .collect();
        if !collisions.is_empty() {
            collisions.sort();
            return Err(GraphError::DuplicateSlugs { collisions });
        }

        let nodes = moments
            .into_iter()
            .map(|moment| (moment.slug.clone(), moment))
            .collect();
        Ok(Self { nodes })
    }

    /// Look up a node by slug.
    pub fn get(&self, slug: &Slug) -> Option<&MomentNode> {
        self.nodes.get(slug)
    }

    /// Whether a slug resolves to a node.
    pub fn contains(&self, slug: &Slug) -> bool {
        self.nodes.contains_key(slug)
    }

    /// Slugs in authoring order.
    pub fn slugs(&self) -> impl Iterator<Item = &Slug> {
        self.nodes.keys()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
