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

use crate::query_parameter::{Encoder, QueryParameter};
use crate::shape::Member;
use crate::values::QueryValues;
use gax::error::Error;
use gax::request::Request;
use http::{HeaderValue, Method, header::CONTENT_TYPE};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Serializes the request parameters into the HTTP request.
///
/// The parameters always include `Action` (the operation name) and `Version`
/// (the API version). `GET` requests carry them in the URL query, any other
/// method in a form-encoded body.
///
/// Failures are recorded with [Request::set_error] and leave the HTTP request
/// untouched. Does nothing if the request already has an error.
///
/// # Example
/// ```
/// # use gax::{options::ClientConfig, request::{Operation, Request}};
/// let config = ClientConfig::new();
/// let mut request = Request::<serde_json::Value, ()>::new(
///     &config,
///     "https://sqs.us-east-1.amazonaws.com",
///     Operation::new("ListQueues"),
///     "2012-11-05",
///     Some(serde_json::json!({"QueueNamePrefix": "test"})),
///     None,
/// )?;
/// cloud_sdk_query::build(&mut request);
/// assert!(request.error().is_none());
/// assert_eq!(
///     request.http_request().body(),
///     "Action=ListQueues&QueueNamePrefix=test&Version=2012-11-05"
/// );
/// # Ok::<(), gax::error::Error>(())
/// ```
pub fn build<P, D>(request: &mut Request<P, D>)
where
    P: QueryParameter,
{
    if request.error().is_some() {
        return;
    }
    let span = tracing::debug_span!(
        "build",
        operation = request.operation().name(),
        api_version = request.api_version()
    );
    let _enter = span.enter();

    let values = match encode(request) {
        Ok(v) => v,
        Err(e) => {
            if request.tracing_enabled() {
                tracing::warn!("cannot serialize request parameters: {e}");
            }
            request.set_error(Error::ser(e));
            return;
        }
    };
    if request.tracing_enabled() {
        tracing::debug!(parameters = values.len(), "request parameters serialized");
    }

    let encoded = values.encode();
    let http_request = request.http_request_mut();
    if *http_request.method() == Method::GET {
        http_request.url_mut().set_query(Some(&encoded));
        return;
    }
    http_request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    http_request.set_body(encoded);
}

fn encode<P, D>(request: &Request<P, D>) -> crate::query_parameter::Result<QueryValues>
where
    P: QueryParameter,
{
    let mut enc = Encoder::new(request.protocol());
    enc.set("Action", request.operation().name());
    enc.set("Version", request.api_version());
    if let Some(params) = request.params() {
        params.add(&mut enc, "", &Member::DEFAULT)?;
    }
    Ok(enc.into_values())
}
