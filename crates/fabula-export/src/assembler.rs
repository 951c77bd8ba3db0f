use std::collections::HashMap;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use fabula_graph::{BUNDLED_PARTITION_SIZE, GRANULAR_PARTITION_SIZE};
use fabula_pack::PackedPartition;
use fabula_types::Slug;

use crate::error::{ExportError, ExportResult};

/// How much story goes into each lazily-loaded partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// One moment per partition: maximum laziness, one load per transition.
    Granular,
    /// Bundles of up to 25 moments (the default).
    #[default]
    Bundled,
    /// Everything in one partition with all assets inlined; the fallback
    /// for environments without persistent storage.
    Inline,
}

impl ExportMode {
    /// The partitioner bound this mode uses.
    pub fn partition_bound(self) -> usize {
        match self {
            Self::Granular => GRANULAR_PARTITION_SIZE,
            Self::Bundled => BUNDLED_PARTITION_SIZE,
            Self::Inline => usize::MAX,
        }
    }
}

/// The global data the boot script needs: story title, entry point, and the
/// `slug → partition` map used for demand loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryExport {
    pub title: String,
    pub start: Slug,
    pub assignment: HashMap<Slug, u32>,
}

/// Line prefix of the embedded global map inside the boot script.
pub const MAP_MARKER: &str = "var FABULA_MAP = ";

/// Line prefix of the inline partition-1 payload inside the boot script.
pub const INITIAL_MARKER: &str = "var FABULA_INITIAL = ";

/// Element id of a deferred partition payload block.
pub fn deferred_block_id(number: u32) -> String {
    format!("fabula-part-{number}")
}

/// Escape a serialized JSON payload for embedding inside a `<script>`
/// container: every `</` becomes the JSON-equivalent `<\/`, so a literal
/// `</script` in story text can never terminate the block early, and
/// parsing the payload back needs no separate unescape.
pub fn escape_payload(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Assemble the standalone artifact.
///
/// Partition 1 is embedded directly in the boot script; partitions 2..N
/// become inert `application/json` blocks loaded on demand. The first
/// partition must contain the start moment, which is also pre-rendered as
/// static markup.
pub fn assemble(
    title: &str,
    start: &Slug,
    assignment: &HashMap<Slug, u32>,
    partitions: &[PackedPartition],
) -> ExportResult<String> {
    let Some(first) = partitions.first() else {
        return Err(ExportError::NoPartitions);
    };
    let start_node = first
        .nodes
        .iter()
        .find(|node| &node.slug == start)
        .ok_or_else(|| ExportError::StartMissing(start.to_string()))?;

    let map = StoryExport {
        title: title.to_string(),
        start: start.clone(),
        assignment: assignment.clone(),
    };
    let map_json = escape_payload(&serde_json::to_string(&map)?);
    let initial_json = escape_payload(&serde_json::to_string(first)?);

    let deferred = partitions[1..]
        .iter()
        .map(|partition| {
            Ok(json!({
                "id": deferred_block_id(partition.number),
                "payload": escape_payload(&serde_json::to_string(partition)?),
            }))
        })
        .collect::<ExportResult<Vec<_>>>()?;

    let preview_actions: Vec<&str> = start_node
        .actions
        .iter()
        .map(|action| action.label.as_str())
        .collect();

    let handlebars = Handlebars::new();
    let html = handlebars.render_template(
        get_template(),
        &json!({
            "title": title,
            "start": {
                "title": start_node.title,
                "description": start_node.description,
                "actions": preview_actions,
            },
            "deferred": deferred,
            "map": map_json,
            "initial": initial_json,
        }),
    )?;
    debug!(
        partitions = partitions.len(),
        bytes = html.len(),
        "assembled artifact"
    );
    Ok(html)
}

/// The document shell. `{{{ }}}` slots take pre-escaped JSON payloads;
/// `{{ }}` slots are HTML-escaped story text for the static preview.
fn get_template() -> &'static str {
    r##"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
</head>
<body>
<div id="fabula-stage">
<h1>{{start.title}}</h1>
<p>{{start.description}}</p>
<ul>
{{#each start.actions as |action|}}<li>{{action}}</li>
{{/each}}</ul>
</div>
{{#each deferred as |part|}}<script type="application/json" id="{{part.id}}">{{{part.payload}}}</script>
{{/each}}<script id="fabula-boot">
var FABULA_MAP = {{{map}}};
var FABULA_INITIAL = {{{initial}}};
</script>
</body>
</html>
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_graph::{partition, Action, MomentNode, StoryGraph};
    use fabula_pack::pack_partition;

    fn packed_story(bound: usize) -> (Slug, HashMap<Slug, u32>, Vec<PackedPartition>) {
        let moments = vec![
            MomentNode {
                slug: Slug::new("Inicio").unwrap(),
                title: "Inicio".into(),
                description: "It begins, naturally, with a </script> tag.".into(),
                illustration: Some("data:image/png;base64,AAAA".into()),
                entities: Vec::new(),
                actions: vec![Action {
                    label: "Onward".into(),
                    destination: Slug::new("Final").unwrap(),
                    conditions: Vec::new(),
                }],
            },
            MomentNode {
                slug: Slug::new("Final").unwrap(),
                title: "Final".into(),
                description: "The end.".into(),
                illustration: None,
                entities: Vec::new(),
                actions: Vec::new(),
            },
        ];
        let graph = StoryGraph::from_moments(moments).unwrap();
        let start = Slug::new("Inicio").unwrap();
        let set = partition(&graph, &start, bound).unwrap();
        let packed = set
            .partitions
            .iter()
            .map(|p| pack_partition(p, |reference| Some(reference.to_string())))
            .collect();
        (start, set.assignment, packed)
    }

    #[test]
    fn artifact_contains_all_sections() {
        let (start, assignment, packed) = packed_story(1);
        let html = assemble("Mi historia", &start, &assignment, &packed).unwrap();

        assert!(html.contains("<title>Mi historia</title>"));
        assert!(html.contains(MAP_MARKER));
        assert!(html.contains(INITIAL_MARKER));
        assert!(html.contains(r#"id="fabula-part-2""#));
        // Static preview of the start node, visible without scripts.
        assert!(html.contains("<h1>Inicio</h1>"));
        assert!(html.contains("<li>Onward</li>"));
    }

    #[test]
    fn payload_terminators_are_escaped() {
        let (start, assignment, packed) = packed_story(25);
        let html = assemble("x", &start, &assignment, &packed).unwrap();

        let boot_start = html.find(INITIAL_MARKER).unwrap();
        let initial_line = html[boot_start..].lines().next().unwrap();
        assert!(!initial_line.contains("</script"));
        assert!(initial_line.contains("<\\/script"));
        // And the escape round-trips through a JSON parser.
        let json = initial_line
            .strip_prefix(INITIAL_MARKER)
            .unwrap()
            .strip_suffix(';')
            .unwrap();
        let back: PackedPartition = serde_json::from_str(json).unwrap();
        assert!(back.nodes[0].description.contains("</script>"));
    }

    #[test]
    fn empty_export_is_rejected() {
        let start = Slug::new("x").unwrap();
        assert!(matches!(
            assemble("t", &start, &HashMap::new(), &[]),
            Err(ExportError::NoPartitions)
        ));
    }

    #[test]
    fn start_must_live_in_partition_one() {
        let (_, assignment, packed) = packed_story(1);
        let wrong_start = Slug::new("Final").unwrap();
        assert!(matches!(
            assemble("t", &wrong_start, &assignment, &packed),
            Err(ExportError::StartMissing(_))
        ));
    }
}
