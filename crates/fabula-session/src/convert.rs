//! Lowering the authored document into story-graph nodes.

use tracing::debug;

use fabula_graph::{Action, Condition, Entity, GraphResult, MomentNode};
use fabula_project::{ConditionRecord, MomentRecord, ProjectDocument};
use fabula_types::Slug;

/// Convert every authored moment into a graph node.
///
/// Moment titles must slug cleanly (they are the node identity); an action
/// whose destination title cannot slug is dropped here with a log line, the
/// same way dangling destinations are dropped at partition time.
pub fn story_nodes(doc: &ProjectDocument) -> GraphResult<Vec<MomentNode>> {
    doc.moments.iter().map(node_from_record).collect()
}

fn node_from_record(record: &MomentRecord) -> GraphResult<MomentNode> {
    let slug = Slug::new(&record.title)?;
    let actions = record
        .actions
        .iter()
        .filter_map(|action| match Slug::new(&action.destination) {
            Ok(destination) => Some(Action {
                label: action.label.clone(),
                destination,
                conditions: action.conditions.iter().map(condition).collect(),
            }),
            Err(_) => {
                debug!(
                    moment = %record.title,
                    destination = %action.destination,
                    "dropping action with unusable destination title"
                );
                None
            }
        })
        .collect();

    Ok(MomentNode {
        slug,
        title: record.title.clone(),
        description: record.description.clone(),
        illustration: non_empty(&record.illustration),
        entities: record
            .entities
            .iter()
            .map(|entity| Entity {
                name: entity.name.clone(),
                sprite: non_empty(&entity.image),
            })
            .collect(),
        actions,
    })
}

fn condition(record: &ConditionRecord) -> Condition {
    match record {
        ConditionRecord::SetFlag { flag } => Condition::SetFlag(flag.clone()),
        ConditionRecord::RequireFlag { flag } => Condition::RequireFlag(flag.clone()),
        ConditionRecord::AdjustItem { item, amount } => Condition::AdjustItem {
            item: item.clone(),
            amount: *amount,
        },
        ConditionRecord::RequireItem { item, amount } => Condition::RequireItem {
            item: item.clone(),
            amount: *amount,
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
