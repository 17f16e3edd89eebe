// # Tag Events
//
// Flattens an XML document into the tag-event stream consumed by the tree
// builder. Lexing is done by quick-xml; this module only decides which event
// kind each element becomes and what text it carries.
//
// ## Event Kinds
//
// - `Open`: start of an element that has child elements
// - `Complete`: a leaf element, with its text (if any) as the value
// - `Close`: end of an element previously reported as `Open`
//
// Text that appears before an element's first child is that element's value.
// Text following a child element is not captured.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// Kind of a tag event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Element with children follows
    Open,
    /// Element closed
    Close,
    /// Self-contained leaf element
    Complete,
}

/// One entry of the flat tag-event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    /// Event kind
    pub kind: TagKind,
    /// Tag name as written (no case folding)
    pub name: String,
    /// Attributes of the tag (empty for `Close`)
    pub attributes: HashMap<String, String>,
    /// Text value, if the element had any
    pub value: Option<String>,
}

impl TagEvent {
    fn new(kind: TagKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: HashMap::new(),
            value: None,
        }
    }

    /// Create an `Open` event
    pub fn open(name: impl Into<String>) -> Self {
        Self::new(TagKind::Open, name)
    }

    /// Create a `Close` event
    pub fn close(name: impl Into<String>) -> Self {
        Self::new(TagKind::Close, name)
    }

    /// Create a `Complete` event
    pub fn complete(name: impl Into<String>) -> Self {
        Self::new(TagKind::Complete, name)
    }

    /// Attach an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach a text value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn from_start(kind: TagKind, start: &BytesStart<'_>) -> Result<Self> {
        let mut event = Self::new(kind, decode_name(start.name().as_ref())?);

        for attribute in start.attributes() {
            let attribute =
                attribute.map_err(|e| Error::parse(format!("invalid attribute: {}", e)))?;
            let key = decode_name(attribute.key.as_ref())?;
            let value = attribute
                .unescape_value()
                .map_err(|e| Error::parse(format!("invalid value for attribute {}: {}", key, e)))?;
            event.attributes.insert(key, value.into_owned());
        }

        Ok(event)
    }

    fn append_text(&mut self, text: &str) {
        match self.value {
            Some(ref mut value) => value.push_str(text),
            None => self.value = Some(text.to_string()),
        }
    }
}

fn decode_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| Error::parse(format!("tag name is not UTF-8: {}", e)))
}

/// Lex a document into its flat tag-event stream
///
/// Whitespace-only text is skipped, entities are unescaped and CDATA is
/// treated as plain text. Declarations, comments, processing instructions
/// and doctypes produce no events.
///
/// # Errors
///
/// [`Error::Parse`] with the byte position when the lexer rejects the input
/// (mismatched end tag, bad attribute syntax, invalid UTF-8, ...).
pub fn tokenize(document: &str) -> Result<Vec<TagEvent>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut events = Vec::new();
    // Start tag not yet known to be Open or Complete
    let mut pending: Option<TagEvent> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::parse(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(start) => {
                events.extend(pending.take());
                pending = Some(TagEvent::from_start(TagKind::Open, &start)?);
            }
            Event::Empty(start) => {
                events.extend(pending.take());
                events.push(TagEvent::from_start(TagKind::Complete, &start)?);
            }
            Event::End(end) => {
                let name = decode_name(end.name().as_ref())?;
                match pending.take() {
                    Some(mut leaf) if leaf.name == name => {
                        leaf.kind = TagKind::Complete;
                        events.push(leaf);
                    }
                    other => {
                        events.extend(other);
                        events.push(TagEvent::close(name));
                    }
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| {
                    Error::parse(format!("at byte {}: {}", reader.buffer_position(), e))
                })?;
                if let Some(ref mut open) = pending
                    && !text.is_empty()
                {
                    open.append_text(&text);
                }
            }
            Event::CData(cdata) => {
                let text = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(|e| Error::parse(format!("CDATA is not UTF-8: {}", e)))?;
                if let Some(ref mut open) = pending {
                    open.append_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // An unterminated start tag stays Open so the builder reports it
    events.extend(pending);

    Ok(events)
}
