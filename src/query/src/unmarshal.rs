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

use crate::decode::{XmlDecode, decode_document};
use gax::error::Error;
use gax::request::{Body, Request};

/// The response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Records the request id from the response headers.
///
/// Does nothing if there is no response or the header is missing or not
/// valid ASCII.
pub fn unmarshal_meta<P, D>(request: &mut Request<P, D>) {
    let id = request
        .http_response()
        .and_then(|r| r.headers().get(REQUEST_ID_HEADER))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(id) = id {
        request.set_request_id(id);
    }
}

/// Decodes a successful response into the request's output data.
///
/// The fields are read from the element named by [XmlDecode::RESULT_WRAPPER],
/// or `{Operation}Result` if the output type does not name one. If that
/// element is missing they are read from the root element.
///
/// The response body is read to the end and dropped, even if the request has
/// no output data or already has an error. Calling this function again finds
/// no body and does nothing.
pub fn unmarshal<P, D>(request: &mut Request<P, D>)
where
    D: XmlDecode,
{
    unmarshal_meta(request);
    let Some((status, mut body)) = request
        .http_response_mut()
        .and_then(|r| r.take_body().map(|b| (r.status(), b)))
    else {
        return;
    };
    let span = tracing::debug_span!(
        "unmarshal",
        operation = request.operation().name(),
        http.status_code = status.as_u16()
    );
    let _enter = span.enter();

    let result = if request.error().is_some() {
        Ok(())
    } else {
        decode_data(request, &mut body)
    };
    if let Err(e) = drain(body) {
        if request.tracing_enabled() {
            tracing::debug!("cannot drain response body: {e}");
        }
    }
    match result {
        Ok(()) => {
            if request.tracing_enabled() && request.error().is_none() {
                tracing::debug!("response decoded");
            }
        }
        Err(e) => {
            if request.tracing_enabled() {
                tracing::warn!("cannot decode response: {e}");
            }
            request.set_error(Error::deser(e));
        }
    }
}

fn decode_data<P, D>(request: &mut Request<P, D>, body: &mut Body) -> crate::decode::Result<()>
where
    D: XmlDecode,
{
    let wrapper = match D::RESULT_WRAPPER {
        Some(w) => w.to_string(),
        None => format!("{}Result", request.operation().name()),
    };
    match request.data_mut() {
        Some(data) => decode_document(body, &wrapper, data),
        None => Ok(()),
    }
}

// The body is consumed and released on every path.
pub(crate) fn drain(mut body: Body) -> std::io::Result<u64> {
    std::io::copy(&mut body, &mut std::io::sink())
}
