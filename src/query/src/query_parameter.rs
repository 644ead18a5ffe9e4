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

//! Serialize request parameters into the flat Query protocol form.
//!
//! Every request type, and every type that may appear in a request field,
//! implements [QueryParameter]. Structs add each of their fields with
//! [Encoder::field], which composes the dotted path name. Lists, maps and
//! scalars have implementations in this module.
//!
//! Zero values (empty strings, `0`, `false`, the default timestamp, empty
//! blobs and empty collections) are omitted. Wrap a field in `Option` to send
//! an explicit zero value: `Some(0)` produces `Count=0`, and `Some(vec![])`
//! produces `ListArg=`.

use crate::shape::{ListStyle, MapStyle, Member};
use crate::values::QueryValues;
use base64::Engine;
use gax::options::Protocol;
use std::collections::{BTreeMap, HashMap};

/// Represents an error serializing a request parameter.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Floating point values must be finite.
    #[error("cannot encode non-finite floating point value {value} in {name}")]
    NonFinite { name: String, value: f64 },

    /// The timestamp cannot be formatted.
    #[error("cannot encode timestamp in {name}: {source}")]
    Timestamp {
        name: String,
        #[source]
        source: wkt::TimestampError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// [QueryParameter] is a trait representing types that can be serialized
/// into Query protocol parameters.
///
/// `name` is the full path of the value, e.g. `StructArg.ListArg.member.1`.
/// It is empty for the request itself. `member` holds the annotations of the
/// field containing the value.
pub trait QueryParameter {
    /// Adds the value, omitting zero values.
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()>;

    /// Adds the value even if it is a zero value.
    ///
    /// Used for explicitly set optional fields, list elements, and map values.
    fn add_present(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        self.add(enc, name, member)
    }
}

/// Converts map keys to their wire form.
///
/// Map entries are numbered in the lexicographic order of these strings.
pub trait MapKey {
    fn to_map_key(&self) -> String;
}

/// Serializes the parameters without any control values.
///
/// # Example
/// ```
/// # use cloud_sdk_query::query_parameter::encode;
/// # use gax::options::Protocol;
/// let values = encode(&serde_json::json!({"Foo": "val1", "Bar": ["a", "b"]}), Protocol::Query)?;
/// assert_eq!(values.encode(), "Bar.member.1=a&Bar.member.2=b&Foo=val1");
/// # Ok::<(), cloud_sdk_query::query_parameter::Error>(())
/// ```
pub fn encode<P: QueryParameter + ?Sized>(params: &P, protocol: Protocol) -> Result<QueryValues> {
    let mut enc = Encoder::new(protocol);
    params.add(&mut enc, "", &Member::DEFAULT)?;
    Ok(enc.into_values())
}

/// Accumulates the parameters of a request.
#[derive(Debug)]
pub struct Encoder {
    values: QueryValues,
    protocol: Protocol,
}

impl Encoder {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            values: QueryValues::new(),
            protocol,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Sets a single parameter.
    pub fn set<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.set(name, value);
    }

    /// Adds a struct field.
    ///
    /// `prefix` is the path of the containing struct and `field` the name of
    /// the field in the API definition.
    pub fn field<T>(&mut self, prefix: &str, field: &str, value: &T, member: &Member) -> Result<()>
    where
        T: QueryParameter + ?Sized,
    {
        let name = join(prefix, &self.wire_name(field, member));
        value.add(self, &name, member)
    }

    pub fn into_values(self) -> QueryValues {
        self.values
    }

    fn wire_name(&self, field: &str, member: &Member) -> String {
        match self.protocol {
            Protocol::Ec2 => match (member.query_name, member.location_name) {
                (Some(name), _) => name.to_string(),
                (None, Some(name)) => capitalize(name),
                (None, None) => field.to_string(),
            },
            _ => member.wire_name(field).to_string(),
        }
    }

    fn list_prefix(&self, name: &str, member: &Member) -> String {
        match (self.protocol, member.list) {
            (Protocol::Ec2, _) | (_, ListStyle::Flattened) => name.to_string(),
            (_, ListStyle::Wrapped { member }) => join(name, member),
        }
    }

    fn map_prefix(&self, name: &str, member: &Member) -> String {
        match (self.protocol, member.map) {
            (Protocol::Ec2, _) | (_, MapStyle::Flattened) => name.to_string(),
            (_, MapStyle::Wrapped) => join(name, "entry"),
        }
    }

    fn add_list<'a, T, I>(&mut self, name: &str, member: &Member, items: I) -> Result<()>
    where
        T: QueryParameter + 'a,
        I: ExactSizeIterator<Item = &'a T>,
    {
        if items.len() == 0 {
            self.set(name, "");
            return Ok(());
        }
        let prefix = self.list_prefix(name, member);
        for (i, item) in items.enumerate() {
            let name = join(&prefix, &(i + 1).to_string());
            item.add_present(self, &name, &Member::DEFAULT)?;
        }
        Ok(())
    }

    fn add_map<'a, K, V, I>(&mut self, name: &str, member: &Member, entries: I) -> Result<()>
    where
        K: MapKey + 'a,
        V: QueryParameter + 'a,
        I: Iterator<Item = (&'a K, &'a V)>,
    {
        let mut entries = entries
            .map(|(k, v)| (k.to_map_key(), v))
            .collect::<Vec<_>>();
        if entries.is_empty() {
            self.set(name, "");
            return Ok(());
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let prefix = self.map_prefix(name, member);
        for (i, (key, value)) in entries.into_iter().enumerate() {
            let entry = join(&prefix, &(i + 1).to_string());
            self.set(join(&entry, member.key_name()), key);
            value.add_present(self, &join(&entry, member.value_name()), &Member::DEFAULT)?;
        }
        Ok(())
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_string();
    }
    format!("{prefix}.{name}")
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl QueryParameter for () {
    fn add(&self, _enc: &mut Encoder, _name: &str, _member: &Member) -> Result<()> {
        Ok(())
    }
}

impl<T: QueryParameter> QueryParameter for Option<T> {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        match self {
            Some(v) => v.add_present(enc, name, member),
            None => Ok(()),
        }
    }
}

impl<T: QueryParameter + ?Sized> QueryParameter for Box<T> {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        (**self).add(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        (**self).add_present(enc, name, member)
    }
}

impl<T: QueryParameter> QueryParameter for Vec<T> {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        enc.add_list(name, member, self.iter())
    }
}

impl<K: MapKey, V: QueryParameter> QueryParameter for HashMap<K, V> {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        enc.add_map(name, member, self.iter())
    }
}

impl<K: MapKey, V: QueryParameter> QueryParameter for BTreeMap<K, V> {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        enc.add_map(name, member, self.iter())
    }
}

impl QueryParameter for String {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, _member: &Member) -> Result<()> {
        enc.set(name, self.as_str());
        Ok(())
    }
}

impl QueryParameter for bool {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if !*self {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, _member: &Member) -> Result<()> {
        enc.set(name, if *self { "true" } else { "false" });
        Ok(())
    }
}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(
            impl QueryParameter for $t {
                fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
                    if *self == 0 {
                        return Ok(());
                    }
                    self.add_present(enc, name, member)
                }

                fn add_present(&self, enc: &mut Encoder, name: &str, _member: &Member) -> Result<()> {
                    enc.set(name, self.to_string());
                    Ok(())
                }
            }

            impl MapKey for $t {
                fn to_map_key(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl QueryParameter for $t {
                fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
                    if *self == 0.0 {
                        return Ok(());
                    }
                    self.add_present(enc, name, member)
                }

                // `Display` for floats produces the shortest representation
                // that round-trips, without exponents.
                fn add_present(&self, enc: &mut Encoder, name: &str, _member: &Member) -> Result<()> {
                    if !self.is_finite() {
                        return Err(Error::NonFinite {
                            name: name.to_string(),
                            value: *self as f64,
                        });
                    }
                    enc.set(name, self.to_string());
                    Ok(())
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl QueryParameter for wkt::Timestamp {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if self.is_unset() {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, _member: &Member) -> Result<()> {
        let value = self.to_query_string().map_err(|source| Error::Timestamp {
            name: name.to_string(),
            source,
        })?;
        enc.set(name, value);
        Ok(())
    }
}

impl QueryParameter for bytes::Bytes {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.add_present(enc, name, member)
    }

    fn add_present(&self, enc: &mut Encoder, name: &str, _member: &Member) -> Result<()> {
        enc.set(name, base64::prelude::BASE64_STANDARD.encode(self));
        Ok(())
    }
}

/// Dynamic parameter trees.
///
/// Objects are encoded as structs with their keys as field names, arrays as
/// lists using the field annotations, `null` is omitted. Other values are
/// always sent, including `false`, `0` and `""`.
impl QueryParameter for serde_json::Value {
    fn add(&self, enc: &mut Encoder, name: &str, member: &Member) -> Result<()> {
        use serde_json::Value;
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => b.add_present(enc, name, member),
            Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => i.add_present(enc, name, member),
                (None, Some(u), _) => u.add_present(enc, name, member),
                (None, None, Some(f)) => f.add_present(enc, name, member),
                (None, None, None) => {
                    enc.set(name, n.to_string());
                    Ok(())
                }
            },
            Value::String(s) => s.add_present(enc, name, member),
            Value::Array(a) => enc.add_list(name, member, a.iter()),
            Value::Object(o) => {
                for (field, value) in o {
                    enc.field(name, field, value, &Member::DEFAULT)?;
                }
                Ok(())
            }
        }
    }
}

impl MapKey for String {
    fn to_map_key(&self) -> String {
        self.clone()
    }
}

impl MapKey for &str {
    fn to_map_key(&self) -> String {
        self.to_string()
    }
}
