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

//! Per-field wire annotations.

/// How a list appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStyle {
    /// Elements are grouped under a fixed segment, `ListArg.member.1`.
    Wrapped { member: &'static str },
    /// Elements are numbered directly under the field, `ListArg.1`.
    Flattened,
}

/// How a map appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapStyle {
    /// Entries are grouped under `entry`, `MapArg.entry.1.key`.
    Wrapped,
    /// Entries are numbered directly under the field, `MapArg.1.key`.
    Flattened,
}

/// The wire annotations for a single field.
///
/// Generated code builds these as constants:
///
/// ```
/// # use cloud_sdk_query::{ListStyle, Member};
/// const TAGS: Member = Member::DEFAULT
///     .set_location_name("Tags")
///     .set_list_member("item");
/// assert_eq!(TAGS.list, ListStyle::Wrapped { member: "item" });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Member {
    /// The wire name, if different from the field name.
    pub location_name: Option<&'static str>,

    /// The wire name in the EC2 dialect. Takes precedence over
    /// `location_name` for EC2 requests.
    pub query_name: Option<&'static str>,

    pub list: ListStyle,

    /// The name of each repeated element in a flattened list. Replaces the
    /// field name.
    pub list_location_name: Option<&'static str>,

    pub map: MapStyle,

    /// Overrides the `key` element of map entries.
    pub key_name: Option<&'static str>,

    /// Overrides the `value` element of map entries.
    pub value_name: Option<&'static str>,
}

impl Member {
    /// A field without annotations.
    pub const DEFAULT: Member = Member {
        location_name: None,
        query_name: None,
        list: ListStyle::Wrapped { member: "member" },
        list_location_name: None,
        map: MapStyle::Wrapped,
        key_name: None,
        value_name: None,
    };

    pub const fn set_location_name(mut self, v: &'static str) -> Self {
        self.location_name = Some(v);
        self
    }

    pub const fn set_query_name(mut self, v: &'static str) -> Self {
        self.query_name = Some(v);
        self
    }

    /// Marks lists and maps as flattened.
    pub const fn set_flattened(mut self) -> Self {
        self.list = ListStyle::Flattened;
        self.map = MapStyle::Flattened;
        self
    }

    /// Sets the segment used by wrapped lists.
    pub const fn set_list_member(mut self, v: &'static str) -> Self {
        self.list = ListStyle::Wrapped { member: v };
        self
    }

    pub const fn set_list_location_name(mut self, v: &'static str) -> Self {
        self.list_location_name = Some(v);
        self
    }

    pub const fn set_key_name(mut self, v: &'static str) -> Self {
        self.key_name = Some(v);
        self
    }

    pub const fn set_value_name(mut self, v: &'static str) -> Self {
        self.value_name = Some(v);
        self
    }

    /// The name of the key element in map entries.
    pub fn key_name(&self) -> &'static str {
        self.key_name.unwrap_or("key")
    }

    /// The name of the value element in map entries.
    pub fn value_name(&self) -> &'static str {
        self.value_name.unwrap_or("value")
    }

    /// The name of the field on the wire, ignoring dialect differences.
    ///
    /// Flattened lists with a `list_location_name` use that name for each
    /// element, otherwise the `location_name` (if any) replaces the field
    /// name.
    pub fn wire_name<'a>(&self, field: &'a str) -> &'a str {
        match (self.list, self.list_location_name, self.location_name) {
            (ListStyle::Flattened, Some(name), _) => name,
            (_, _, Some(name)) => name,
            _ => field,
        }
    }
}

impl Default for Member {
    fn default() -> Self {
        Self::DEFAULT
    }
}
