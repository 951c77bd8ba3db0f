//! Breadth-first bin-packing of the story graph into bounded partitions.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use fabula_types::Slug;

use crate::error::{GraphError, GraphResult};
use crate::node::{MomentNode, StoryGraph};

/// One node per partition: maximum laziness, one load per transition.
pub const GRANULAR_PARTITION_SIZE: usize = 1;

/// Default export bound.
pub const BUNDLED_PARTITION_SIZE: usize = 25;

/// An ordered, size-bounded subset of the story graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    /// 1-based partition number; partition 1 ships inline in the artifact.
    pub number: u32,
    /// Nodes in assignment order.
    pub nodes: Vec<MomentNode>,
}

/// The full partitioning: every reachable node in exactly one partition,
/// plus the global slug → partition map the runtime uses for demand loading.
#[derive(Clone, Debug, Default)]
pub struct PartitionSet {
    pub partitions: Vec<Partition>,
    pub assignment: HashMap<Slug, u32>,
}

impl PartitionSet {
    /// The partition a node was assigned to.
    pub fn partition_of(&self, slug: &Slug) -> Option<u32> {
        self.assignment.get(slug).copied()
    }

    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Returns `true` if nothing was reachable.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Total nodes across all partitions.
    pub fn total_nodes(&self) -> usize {
        self.partitions.iter().map(|p| p.nodes.len()).sum()
    }
}

/// Partition the graph reachable from `start` into bins of at most
/// `max_size` nodes.
///
/// Nodes are assigned at first dequeue. A newly discovered neighbour joins
/// the current partition's frontier while the partition still has room for
/// it, otherwise it seeds the next partition. Unreachable nodes are never
/// visited and never exported; dangling destinations are dropped here.
pub fn partition(
    graph: &StoryGraph,
    start: &Slug,
    max_size: usize,
) -> GraphResult<PartitionSet> {
    if max_size == 0 {
        return Err(GraphError::InvalidBound);
    }
    if !graph.contains(start) {
        return Err(GraphError::StartNotFound(start.clone()));
    }

    let mut visited: HashSet<Slug> = HashSet::new();
    let mut frontier: VecDeque<Slug> = VecDeque::new();
    let mut next_seeds: VecDeque<Slug> = VecDeque::new();
    visited.insert(start.clone());
    frontier.push_back(start.clone());

    let mut partitions = Vec::new();
    let mut assignment: HashMap<Slug, u32> = HashMap::new();
    let mut number: u32 = 0;

    loop {
        if frontier.is_empty() {
            frontier = std::mem::take(&mut next_seeds);
        }
        if frontier.is_empty() {
            break;
        }
        number += 1;
        let mut nodes: Vec<MomentNode> = Vec::new();

        while nodes.len() < max_size {
            let Some(slug) = frontier.pop_front() else {
                break;
            };
            assignment.insert(slug.clone(), number);
            let node = graph
                .get(&slug)
                .expect("only existing slugs are ever enqueued")
                .clone();

            for action in &node.actions {
                let dest = &action.destination;
                if !graph.contains(dest) {
                    debug!(from = %slug, to = %dest, "dropping dangling action destination");
                    continue;
                }
                if !visited.insert(dest.clone()) {
                    continue;
                }
                // Room check counts the node in hand plus everything already
                // pending for this partition.
                if nodes.len() + 1 + frontier.len() < max_size {
                    frontier.push_back(dest.clone());
                } else {
                    next_seeds.push_back(dest.clone());
                }
            }

            nodes.push(node);
        }

        debug!(partition = number, nodes = nodes.len(), "closed partition");
        partitions.push(Partition { number, nodes });
    }

    Ok(PartitionSet {
        partitions,
        assignment,
    })
}
