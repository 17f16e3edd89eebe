//! Streaming XML to ordered tree
//!
//! Provider responses are lexed into a flat stream of [`TagEvent`]s and then
//! folded into a single-rooted [`XmlElement`] tree in one linear pass.
//!
//! ```text
//! bytes ──quick-xml──▶ [Open, Complete, Complete, Close, ...] ──build_tree──▶ XmlElement
//! ```
//!
//! Neither step recurses, so nesting depth is bounded by memory rather than
//! by the call stack.

pub mod event;
pub mod tree;

pub use event::{TagEvent, TagKind, tokenize};
pub use tree::{XmlElement, build_tree};

use crate::error::Result;

/// Parse a complete document into its root element
///
/// On failure the error carries the lexer position and message; the raw
/// document is logged so a bad provider response can be diagnosed.
pub fn parse_document(document: &str) -> Result<XmlElement> {
    let result = tokenize(document).and_then(build_tree);

    if let Err(ref e) = result {
        tracing::error!("XML parsing error: {}", e);
        tracing::error!(document = %document, "Unparsable document");
    }

    result
}
