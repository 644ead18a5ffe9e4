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

mod core_error;
pub use core_error::*;

/// Errors and error details returned by services.
///
/// The client libraries distinguish between errors detected while trying to
/// send a request (e.g. the request cannot be serialized), errors trying to
/// receive a response (e.g. the response body cannot be parsed), and errors
/// returned by the service itself.
///
/// The types in this module represent the fault envelope returned by Query
/// protocol services.
///
/// # Examples
///
/// ```
/// # use cloud_sdk_gax::error;
/// use error::Error;
/// fn handle_error(e: Error) {
///     if let Some(fault) = e.fault() {
///         println!("the service reported {fault:?}")
///     }
/// }
/// ```
pub mod fault;
