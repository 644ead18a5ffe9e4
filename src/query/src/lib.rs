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

//! Cloud SDK for Rust - Query protocol.
//!
//! **WARNING:** this crate is under active development. We expect multiple
//! breaking changes in the upcoming releases.
//!
//! Services using the Query protocol receive their parameters as a flat,
//! form-encoded list of `key=value` pairs and return XML documents. This crate
//! contains the protocol handlers used by generated clients:
//!
//! - [build] serializes the request parameters.
//! - [unmarshal] decodes a successful response into the output type.
//! - [unmarshal_error] decodes the fault envelope of a failed response.
//! - [unmarshal_meta] extracts the request id from the response headers.
//!
//! Generated types describe their shape by implementing [QueryParameter]
//! (request types) and [XmlDecode] (response types). The implementations
//! call [Encoder::field] and [decode::field] once per field, with a [Member]
//! describing any wire-name or collection-style annotations.
//!
//! # Example
//! ```
//! use cloud_sdk_query::{Encoder, Member, QueryParameter};
//! use gax::options::Protocol;
//!
//! #[derive(Default)]
//! struct ListQueuesRequest {
//!     prefix: String,
//!     names: Vec<String>,
//! }
//!
//! impl QueryParameter for ListQueuesRequest {
//!     fn add(&self, enc: &mut Encoder, name: &str, _: &Member) -> cloud_sdk_query::query_parameter::Result<()> {
//!         enc.field(name, "QueueNamePrefix", &self.prefix, &Member::DEFAULT)?;
//!         enc.field(name, "QueueName", &self.names, &Member::DEFAULT.set_flattened())?;
//!         Ok(())
//!     }
//! }
//!
//! let request = ListQueuesRequest { prefix: "test".into(), names: vec!["a".into(), "b".into()] };
//! let values = cloud_sdk_query::query_parameter::encode(&request, Protocol::Query)?;
//! assert_eq!(values.encode(), "QueueName.1=a&QueueName.2=b&QueueNamePrefix=test");
//! # Ok::<(), cloud_sdk_query::query_parameter::Error>(())
//! ```

pub mod build;
pub mod decode;
pub mod query_parameter;
pub mod shape;
pub mod unmarshal;
pub mod unmarshal_error;
pub mod values;
pub mod xml;

pub use build::build;
pub use decode::XmlDecode;
pub use query_parameter::{Encoder, MapKey, QueryParameter};
pub use shape::{ListStyle, MapStyle, Member};
pub use unmarshal::{unmarshal, unmarshal_meta};
pub use unmarshal_error::unmarshal_error;
pub use values::QueryValues;
pub use xml::XmlNode;
