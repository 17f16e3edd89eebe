//! Ordered document tree built from a flat tag-event stream

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::xml::event::{TagEvent, TagKind};

/// Element of a parsed document
///
/// Children are owned exclusively by their parent and kept in document
/// order. `content` is the text found before the first child (empty if none).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name
    pub name: String,
    /// Attributes of the element
    pub attributes: HashMap<String, String>,
    /// Text content, empty if none
    pub content: String,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Direct children with the given tag name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Pre-order traversal of this element and all its descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

impl From<TagEvent> for XmlElement {
    fn from(event: TagEvent) -> Self {
        Self {
            name: event.name,
            attributes: event.attributes,
            content: event.value.unwrap_or_default(),
            children: Vec::new(),
        }
    }
}

// Flatten before dropping so deep trees are not freed recursively.
impl Drop for XmlElement {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Non-recursive pre-order iterator over an element tree
pub struct PreOrder<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// Build the single-rooted tree described by a tag-event stream
///
/// Runs in one linear pass over the events. Elements still waiting for their
/// `Close` live on an explicit stack; the top of that stack is where new
/// elements are inserted, and the top-level list is used when it is empty.
///
/// # Errors
///
/// [`Error::Parse`] when the stream is unbalanced (a `Close` with nothing
/// open, a `Close` naming a different element, elements left open) or does
/// not describe exactly one root element. No partial tree is returned.
pub fn build_tree<I>(events: I) -> Result<XmlElement>
where
    I: IntoIterator<Item = TagEvent>,
{
    let mut top_level: Vec<XmlElement> = Vec::new();
    let mut open: Vec<XmlElement> = Vec::new();

    for event in events {
        match event.kind {
            TagKind::Open => open.push(XmlElement::from(event)),
            TagKind::Complete => {
                let element = XmlElement::from(event);
                insertion_list(&mut top_level, &mut open).push(element);
            }
            TagKind::Close => {
                let element = open.pop().ok_or_else(|| {
                    Error::parse(format!("close tag </{}> without open element", event.name))
                })?;
                if element.name != event.name {
                    return Err(Error::parse(format!(
                        "close tag </{}> does not match <{}>",
                        event.name, element.name
                    )));
                }
                insertion_list(&mut top_level, &mut open).push(element);
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(Error::parse(format!(
            "element <{}> is never closed",
            unclosed.name
        )));
    }

    if top_level.len() != 1 {
        return Err(Error::parse(format!(
            "expected exactly one root element, found {}",
            top_level.len()
        )));
    }

    top_level
        .pop()
        .ok_or_else(|| Error::parse("document has no root element"))
}

fn insertion_list<'a>(
    top_level: &'a mut Vec<XmlElement>,
    open: &'a mut [XmlElement],
) -> &'a mut Vec<XmlElement> {
    match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => top_level,
    }
}
