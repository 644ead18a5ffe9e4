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

/// The fault envelope returned by Query protocol services.
///
/// Services return this payload with any non-success HTTP status. The `code`
/// is a short, stable identifier (e.g. `Throttling`, `InvalidParameterValue`)
/// that applications can use for programmatic branching. The `message` is
/// intended for humans and may change without notice.
///
/// # Example
/// ```
/// # use cloud_sdk_gax::error::fault::Fault;
/// let fault = Fault::default()
///     .set_code("Throttling")
///     .set_message("Rate exceeded");
/// assert_eq!(fault.code, "Throttling");
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Fault {
    /// The error code reported by the service.
    pub code: String,

    /// A developer-facing error message.
    pub message: String,

    /// The fault type, typically `Sender` or `Receiver`, when the service
    /// includes one.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// The request id assigned by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Fault {
    /// Sets the value for [code][Fault::code].
    pub fn set_code<T: Into<String>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the value for [message][Fault::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Sets the value for [error_type][Fault::error_type].
    pub fn set_error_type<T: Into<String>>(mut self, v: T) -> Self {
        self.error_type = Some(v.into());
        self
    }

    /// Sets the value for [request_id][Fault::request_id].
    pub fn set_request_id<T: Into<String>>(mut self, v: T) -> Self {
        self.request_id = Some(v.into());
        self
    }
}
