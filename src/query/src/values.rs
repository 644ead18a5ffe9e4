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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::BTreeMap;

/// Form encoding keeps the unreserved characters, spaces are handled separately.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The flat parameter map sent with Query protocol requests.
///
/// Keys are dotted paths such as `StructArg.ScalarArg` or
/// `ListArg.member.2`. Each key appears at most once, setting an existing key
/// replaces its value.
///
/// # Example
/// ```
/// # use cloud_sdk_query::QueryValues;
/// let mut values = QueryValues::new();
/// values.set("Version", "2014-01-01");
/// values.set("Action", "OperationName");
/// values.set("Filter.1", "a b:c");
/// assert_eq!(
///     values.encode(),
///     "Action=OperationName&Filter.1=a+b%3Ac&Version=2014-01-01"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryValues {
    values: BTreeMap<String, String>,
}

impl QueryValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the `application/x-www-form-urlencoded` form, sorted by key.
    pub fn encode(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn escape(input: &str) -> String {
    // A literal "%20" in the input is escaped as "%2520", so only spaces
    // produce "%20" here.
    utf8_percent_encode(input, FORM)
        .to_string()
        .replace("%20", "+")
}
