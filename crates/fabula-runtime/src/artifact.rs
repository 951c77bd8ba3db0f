//! Parsing an assembled artifact back into its embedded sections.

use std::collections::HashMap;

use fabula_export::{StoryExport, INITIAL_MARKER, MAP_MARKER};
use fabula_pack::PackedPartition;

use crate::error::{RuntimeError, RuntimeResult};

/// Source of deferred partition payloads.
///
/// The artifact parser implements this over the document's inert
/// `application/json` blocks; embedders with their own storage can provide
/// another implementation.
pub trait PayloadSource {
    /// The raw JSON payload of a deferred partition, if present.
    fn deferred_payload(&self, number: u32) -> Option<&str>;
}

/// The deferred payload blocks of one artifact, keyed by partition number.
#[derive(Clone, Debug, Default)]
pub struct DeferredBlocks {
    blocks: HashMap<u32, String>,
}

impl DeferredBlocks {
    /// Build from (partition number, raw JSON payload) pairs.
    pub fn new(blocks: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
        }
    }

    /// Number of deferred blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the artifact had a single partition.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl PayloadSource for DeferredBlocks {
    fn deferred_payload(&self, number: u32) -> Option<&str> {
        self.blocks.get(&number).map(String::as_str)
    }
}

/// A parsed artifact: the global map, the inline first partition, and the
/// deferred payload blocks.
#[derive(Clone, Debug)]
pub struct ArtifactDocument {
    pub map: StoryExport,
    pub initial: PackedPartition,
    pub deferred: DeferredBlocks,
}

impl ArtifactDocument {
    /// Parse an assembled document.
    ///
    /// The global map and the inline partition are required; deferred blocks
    /// are collected as opaque text and only parsed when the runtime first
    /// loads their partition.
    pub fn parse(html: &str) -> RuntimeResult<Self> {
        let map = serde_json::from_str(boot_line(html, MAP_MARKER)?)?;
        let initial = serde_json::from_str(boot_line(html, INITIAL_MARKER)?)?;
        Ok(Self {
            map,
            initial,
            deferred: DeferredBlocks::new(scan_deferred_blocks(html)),
        })
    }
}

/// Extract the JSON text of one `var X = {...};` boot-script line.
fn boot_line<'a>(html: &'a str, marker: &str) -> RuntimeResult<&'a str> {
    let line = html
        .lines()
        .find_map(|line| line.strip_prefix(marker))
        .ok_or_else(|| RuntimeError::MalformedArtifact(format!("missing {marker:?} line")))?;
    line.strip_suffix(';')
        .ok_or_else(|| RuntimeError::MalformedArtifact(format!("unterminated {marker:?} line")))
}

const BLOCK_PREFIX: &str = "<script type=\"application/json\" id=\"fabula-part-";
const BLOCK_END: &str = "</script>";

fn scan_deferred_blocks(html: &str) -> Vec<(u32, String)> {
    let mut blocks = Vec::new();
    let mut rest = html;
    while let Some(at) = rest.find(BLOCK_PREFIX) {
        rest = &rest[at + BLOCK_PREFIX.len()..];
        let Some(quote) = rest.find('"') else { break };
        let Ok(number) = rest[..quote].parse::<u32>() else {
            continue;
        };
        let Some(open) = rest.find('>') else { break };
        rest = &rest[open + 1..];
        // The assembler escapes `</` inside payloads, so the first close tag
        // is the real terminator.
        let Some(end) = rest.find(BLOCK_END) else { break };
        blocks.push((number, rest[..end].to_string()));
        rest = &rest[end + BLOCK_END.len()..];
    }
    blocks
}
