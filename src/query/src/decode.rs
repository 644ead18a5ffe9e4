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

//! Decode XML responses into output types.
//!
//! Output types implement [XmlDecode], decoding each of their fields with
//! [field]. Fields missing from the document keep their current value, and
//! elements without a matching field are ignored.

use crate::shape::{ListStyle, MapStyle, Member};
use crate::xml::XmlNode;
use base64::Engine;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Represents an error decoding a response.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Xml(#[from] crate::xml::Error),

    /// The text of an element is not a valid value for the field type.
    #[error("cannot decode <{element}> as {kind}: {source}")]
    Scalar {
        element: String,
        kind: &'static str,
        #[source]
        source: BoxError,
    },

    /// A map entry has a key but no value.
    #[error("map entry in <{element}> has no value for key {key:?}")]
    MissingMapValue { element: String, key: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// [XmlDecode] is a trait representing types that can be decoded from Query
/// protocol responses.
pub trait XmlDecode {
    /// The element containing the fields of an output type.
    ///
    /// Most operations nest their output in `{OperationName}Result`, used
    /// when this is `None`.
    const RESULT_WRAPPER: Option<&'static str> = None;

    /// Decodes `node` into `self`.
    ///
    /// `member` holds the annotations of the field containing the value.
    fn decode_into(&mut self, node: &XmlNode, member: &Member) -> Result<()>;
}

/// Decodes a struct field.
///
/// Each child of `parent` with the field's wire name is decoded into
/// `target`. Scalars keep the last value, flattened lists and maps collect
/// all of them. If no child matches, an attribute with that name is used
/// instead.
pub fn field<T>(parent: &XmlNode, field: &str, target: &mut T, member: &Member) -> Result<()>
where
    T: XmlDecode + ?Sized,
{
    let name = member.wire_name(field);
    let mut found = false;
    for node in parent.children(name) {
        target.decode_into(node, member)?;
        found = true;
    }
    if found {
        return Ok(());
    }
    if let Some(value) = parent.attribute(name) {
        let node = XmlNode::new(name).set_text(value);
        target.decode_into(&node, member)?;
    }
    Ok(())
}

/// Parses a document and decodes it into a new `D`.
///
/// If the root element contains a `wrapper` element, the fields are decoded
/// from it. Otherwise they are decoded from the root. An empty document
/// produces `D::default()`.
///
/// # Example
/// ```
/// # use cloud_sdk_query::{decode, Member, XmlDecode, XmlNode};
/// #[derive(Default)]
/// struct Output { name: String }
/// impl XmlDecode for Output {
///     fn decode_into(&mut self, node: &XmlNode, _: &Member) -> decode::Result<()> {
///         decode::field(node, "Name", &mut self.name, &Member::DEFAULT)
///     }
/// }
/// let input = "<GetResponse><GetResult><Name>abc</Name></GetResult></GetResponse>";
/// let output: Output = decode::from_reader(input.as_bytes(), "GetResult")?;
/// assert_eq!(output.name, "abc");
/// # Ok::<(), decode::Error>(())
/// ```
pub fn from_reader<D, R>(reader: R, wrapper: &str) -> Result<D>
where
    D: XmlDecode + Default,
    R: Read,
{
    let mut output = D::default();
    decode_document(reader, wrapper, &mut output)?;
    Ok(output)
}

pub(crate) fn decode_document<D, R>(reader: R, wrapper: &str, output: &mut D) -> Result<()>
where
    D: XmlDecode + ?Sized,
    R: Read,
{
    let Some(root) = XmlNode::from_reader(reader)? else {
        return Ok(());
    };
    let node = root.child(wrapper).unwrap_or(&root);
    output.decode_into(node, &Member::DEFAULT)
}

fn scalar_error<E: Into<BoxError>>(node: &XmlNode, kind: &'static str, e: E) -> Error {
    Error::Scalar {
        element: node.name().to_string(),
        kind,
        source: e.into(),
    }
}

impl XmlDecode for () {
    fn decode_into(&mut self, _node: &XmlNode, _member: &Member) -> Result<()> {
        Ok(())
    }
}

impl<T: XmlDecode + Default> XmlDecode for Option<T> {
    fn decode_into(&mut self, node: &XmlNode, member: &Member) -> Result<()> {
        self.get_or_insert_with(T::default).decode_into(node, member)
    }
}

impl<T: XmlDecode + ?Sized> XmlDecode for Box<T> {
    fn decode_into(&mut self, node: &XmlNode, member: &Member) -> Result<()> {
        (**self).decode_into(node, member)
    }
}

impl<T: XmlDecode + Default> XmlDecode for Vec<T> {
    fn decode_into(&mut self, node: &XmlNode, member: &Member) -> Result<()> {
        match member.list {
            // In flattened lists each element is a sibling with the field name.
            ListStyle::Flattened => {
                let mut item = T::default();
                item.decode_into(node, &Member::DEFAULT)?;
                self.push(item);
            }
            ListStyle::Wrapped { member } => {
                for child in node.children(member) {
                    let mut item = T::default();
                    item.decode_into(child, &Member::DEFAULT)?;
                    self.push(item);
                }
            }
        }
        Ok(())
    }
}

trait MapInsert<V> {
    fn insert_entry(&mut self, key: String, value: V);
}

impl<V> MapInsert<V> for HashMap<String, V> {
    fn insert_entry(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

impl<V> MapInsert<V> for BTreeMap<String, V> {
    fn insert_entry(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

fn decode_map<M, V>(map: &mut M, node: &XmlNode, member: &Member) -> Result<()>
where
    M: MapInsert<V>,
    V: XmlDecode + Default,
{
    match member.map {
        MapStyle::Flattened => decode_entry(map, node, member),
        MapStyle::Wrapped => {
            for entry in node.children("entry") {
                decode_entry(map, entry, member)?;
            }
            Ok(())
        }
    }
}

fn decode_entry<M, V>(map: &mut M, entry: &XmlNode, member: &Member) -> Result<()>
where
    M: MapInsert<V>,
    V: XmlDecode + Default,
{
    let mut values = entry.children(member.value_name());
    for key in entry.children(member.key_name()) {
        let Some(node) = values.next() else {
            return Err(Error::MissingMapValue {
                element: entry.name().to_string(),
                key: key.text().to_string(),
            });
        };
        let mut value = V::default();
        value.decode_into(node, &Member::DEFAULT)?;
        map.insert_entry(key.text().to_string(), value);
    }
    Ok(())
}

impl<V: XmlDecode + Default> XmlDecode for HashMap<String, V> {
    fn decode_into(&mut self, node: &XmlNode, member: &Member) -> Result<()> {
        decode_map(self, node, member)
    }
}

impl<V: XmlDecode + Default> XmlDecode for BTreeMap<String, V> {
    fn decode_into(&mut self, node: &XmlNode, member: &Member) -> Result<()> {
        decode_map(self, node, member)
    }
}

impl XmlDecode for String {
    fn decode_into(&mut self, node: &XmlNode, _member: &Member) -> Result<()> {
        *self = node.text().to_string();
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
#[error("invalid boolean value")]
struct ParseBoolError;

fn parse_bool(text: &str) -> std::result::Result<bool, ParseBoolError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError),
    }
}

impl XmlDecode for bool {
    fn decode_into(&mut self, node: &XmlNode, _member: &Member) -> Result<()> {
        *self = parse_bool(node.text().trim()).map_err(|e| scalar_error(node, "bool", e))?;
        Ok(())
    }
}

macro_rules! impl_parse {
    ($($t:ty),*) => {
        $(
            impl XmlDecode for $t {
                fn decode_into(&mut self, node: &XmlNode, _member: &Member) -> Result<()> {
                    *self = node
                        .text()
                        .trim()
                        .parse::<$t>()
                        .map_err(|e| scalar_error(node, stringify!($t), e))?;
                    Ok(())
                }
            }
        )*
    };
}

impl_parse!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl XmlDecode for wkt::Timestamp {
    fn decode_into(&mut self, node: &XmlNode, _member: &Member) -> Result<()> {
        *self = wkt::Timestamp::try_from(node.text().trim())
            .map_err(|e| scalar_error(node, "timestamp", e))?;
        Ok(())
    }
}

impl XmlDecode for bytes::Bytes {
    fn decode_into(&mut self, node: &XmlNode, _member: &Member) -> Result<()> {
        let decoded = base64::prelude::BASE64_STANDARD
            .decode(node.text().trim())
            .map_err(|e| scalar_error(node, "blob", e))?;
        *self = bytes::Bytes::from(decoded);
        Ok(())
    }
}
