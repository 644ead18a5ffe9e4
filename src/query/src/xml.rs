// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An in-memory tree for Query protocol XML responses.
//!
//! The decoders look up fields by name, possibly more than once, and fall
//! back to attributes when no element matches. A small tree is simpler to
//! navigate than the event stream. Response documents are small.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::{BufReader, Read};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The maximum element nesting accepted by [XmlNode::from_reader].
pub const MAX_DEPTH: usize = 512;

/// Represents an error parsing an XML document.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The document is not well-formed, or cannot be read.
    #[error("cannot parse XML document: {0}")]
    Parse(#[source] BoxError),

    /// The document ended before the named element was closed.
    #[error("unexpected end of XML document inside <{0}>")]
    UnexpectedEof(String),

    /// The elements are nested deeper than [MAX_DEPTH].
    #[error("XML elements nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// An XML element.
///
/// Names are the local part of the element and attribute names: namespace
/// prefixes and `xmlns` declarations are dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlNode {
    name: String,
    text: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Creates an element with no content.
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the text content.
    pub fn set_text<T: Into<String>>(mut self, v: T) -> Self {
        self.text = v.into();
        self
    }

    /// Adds an attribute.
    pub fn add_attribute<K: Into<String>, V: Into<String>>(mut self, k: K, v: V) -> Self {
        self.attributes.push((k.into(), v.into()));
        self
    }

    /// Adds a child element.
    pub fn add_child(mut self, v: XmlNode) -> Self {
        self.children.push(v);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text content of the element, excluding any text in child elements.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All the child elements with the given name, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All the child elements.
    pub fn elements(&self) -> &[XmlNode] {
        &self.children
    }

    /// Parses the root element of a document.
    ///
    /// Returns `None` if the input contains no elements. Any content after
    /// the root element is not parsed. Documents nested deeper than
    /// [MAX_DEPTH] elements are rejected with [Error::TooDeep].
    ///
    /// # Example
    /// ```
    /// # use cloud_sdk_query::XmlNode;
    /// let input = r#"<a:Root xmlns:a="urn:test" id="1"><Item>x &amp; y</Item></a:Root>"#;
    /// let root = XmlNode::from_reader(input.as_bytes())?.expect("document has a root");
    /// assert_eq!(root.name(), "Root");
    /// assert_eq!(root.attribute("id"), Some("1"));
    /// assert_eq!(root.child("Item").map(|n| n.text()), Some("x & y"));
    /// # Ok::<(), cloud_sdk_query::xml::Error>(())
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> Result<Option<XmlNode>, Error> {
        let mut reader = Reader::from_reader(BufReader::new(reader));
        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf).map_err(parse_error)?;
            match event {
                Event::Start(e) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(Error::TooDeep);
                    }
                    stack.push(element(&e)?);
                }
                Event::Empty(e) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(Error::TooDeep);
                    }
                    let node = element(&e)?;
                    if let Some(root) = close(&mut stack, node) {
                        return Ok(Some(root));
                    }
                }
                Event::End(_) => {
                    // The reader verifies end tags match their start tags.
                    if let Some(node) = stack.pop() {
                        if let Some(root) = close(&mut stack, node) {
                            return Ok(Some(root));
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&t.unescape().map_err(parse_error)?);
                    }
                }
                Event::CData(t) => {
                    if let Some(node) = stack.last_mut() {
                        let text = std::str::from_utf8(&t).map_err(parse_error)?;
                        node.text.push_str(text);
                    }
                }
                Event::Eof => {
                    return match stack.pop() {
                        None => Ok(None),
                        Some(node) => Err(Error::UnexpectedEof(node.name)),
                    };
                }
                _ => {}
            }
            buf.clear();
        }
    }
}

fn parse_error<E: Into<BoxError>>(e: E) -> Error {
    Error::Parse(e.into())
}

fn element(start: &BytesStart) -> Result<XmlNode, Error> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(parse_error)?
        .to_string();
    let mut node = XmlNode::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(parse_error)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(parse_error)?
            .to_string();
        let value = attr.unescape_value().map_err(parse_error)?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

// Attaches `node` to its parent, returns it if it is the root.
fn close(stack: &mut [XmlNode], node: XmlNode) -> Option<XmlNode> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            None
        }
        None => Some(node),
    }
}
