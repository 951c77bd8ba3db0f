//! The export assembler: one self-contained HTML document per story.
//!
//! The artifact embeds partition 1 (structured data + resource blob)
//! directly in its boot script, every other partition as an inert,
//! uniquely-keyed `application/json` payload block that is data rather than
//! code, the global `slug → partition` map, and a static pre-rendered view
//! of the start moment so the document shows content before any script
//! runs.
//!
//! Payloads are escaped so no literal `</script` sequence can terminate its
//! container early; the escape is the JSON-legal `<\/`, so parsing a
//! payload back yields the original text with no separate unescape step.

pub mod assembler;
pub mod error;

pub use assembler::{
    assemble, deferred_block_id, escape_payload, ExportMode, StoryExport, INITIAL_MARKER,
    MAP_MARKER,
};
pub use error::{ExportError, ExportResult};
