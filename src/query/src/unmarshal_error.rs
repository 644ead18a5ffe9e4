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

//! Decode the fault envelope of failed responses.
//!
//! Query protocol services return one of these documents:
//!
//! ```xml
//! <ErrorResponse>
//!   <Error>
//!     <Type>Sender</Type>
//!     <Code>Throttling</Code>
//!     <Message>Rate exceeded</Message>
//!   </Error>
//!   <RequestId>request-id</RequestId>
//! </ErrorResponse>
//! ```
//!
//! The EC2 dialect nests the error one level deeper:
//!
//! ```xml
//! <Response>
//!   <Errors><Error><Code>...</Code><Message>...</Message></Error></Errors>
//!   <RequestID>request-id</RequestID>
//! </Response>
//! ```
//!
//! Load balancers may also reply with a bare `<ServiceUnavailableException/>`.

use crate::unmarshal::unmarshal_meta;
use crate::xml::{self, XmlNode};
use gax::error::Error as GaxError;
use gax::error::fault::Fault;
use gax::request::Request;
use std::io::Read;

const SERVICE_UNAVAILABLE: &str = "ServiceUnavailableException";

/// Represents a fault envelope that cannot be decoded.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("empty error response (HTTP status {status_code})")]
    EmptyBody { status_code: u16 },

    #[error("unexpected element <{root}> in error response (HTTP status {status_code})")]
    UnexpectedRoot { root: String, status_code: u16 },

    #[error("missing <Error> element in error response (HTTP status {status_code})")]
    MissingError { status_code: u16 },

    #[error("cannot parse error response (HTTP status {status_code}): {source}")]
    Xml {
        status_code: u16,
        #[source]
        source: xml::Error,
    },
}

impl Error {
    /// The HTTP status of the failed response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyBody { status_code }
            | Self::UnexpectedRoot { status_code, .. }
            | Self::MissingError { status_code }
            | Self::Xml { status_code, .. } => *status_code,
        }
    }
}

/// Decodes the fault envelope of a failed response.
///
/// On success the request error is a service error carrying the [Fault] and
/// the HTTP status and headers. If the envelope has no request id, the one
/// recorded from the response headers is used. If the envelope cannot be
/// decoded the request error is a deserialization error, and if the body
/// cannot be read it is an I/O error.
///
/// The response body is read to the end and dropped. Calling this function
/// again finds no body and does nothing.
///
/// # Example
/// ```
/// # use gax::{options::ClientConfig, request::{HttpResponse, Operation, Request}};
/// let mut request = Request::<(), ()>::new(
///     &ClientConfig::new(),
///     "https://sqs.us-east-1.amazonaws.com",
///     Operation::new("ListQueues"),
///     "2012-11-05",
///     None,
///     None,
/// )?;
/// request.set_http_response(HttpResponse::from_bytes(
///     http::StatusCode::BAD_REQUEST,
///     http::HeaderMap::new(),
///     "<ErrorResponse><Error><Code>Throttling</Code><Message>Rate exceeded</Message></Error></ErrorResponse>",
/// ));
/// cloud_sdk_query::unmarshal_error(&mut request);
/// let fault = request.error().and_then(|e| e.fault()).expect("service error");
/// assert_eq!(fault.code, "Throttling");
/// assert_eq!(fault.message, "Rate exceeded");
/// # Ok::<(), gax::error::Error>(())
/// ```
pub fn unmarshal_error<P, D>(request: &mut Request<P, D>) {
    unmarshal_meta(request);
    let Some((status, headers, mut body)) = request.http_response_mut().and_then(|r| {
        r.take_body()
            .map(|b| (r.status(), r.headers().clone(), b))
    }) else {
        return;
    };
    let span = tracing::debug_span!(
        "unmarshal_error",
        operation = request.operation().name(),
        http.status_code = status.as_u16()
    );
    let _enter = span.enter();

    let mut payload = Vec::new();
    let read = body.read_to_end(&mut payload);
    drop(body);
    if let Err(e) = read {
        if request.tracing_enabled() {
            tracing::warn!("cannot read error response: {e}");
        }
        request.set_error(GaxError::io(e));
        return;
    }

    match parse_fault(status.as_u16(), &payload) {
        Ok(mut fault) => {
            if fault.request_id.as_deref().is_none_or(str::is_empty) {
                fault.request_id = request.request_id().map(str::to_string);
            }
            if request.tracing_enabled() {
                tracing::debug!(code = fault.code.as_str(), "service fault decoded");
            }
            request.set_error(GaxError::service_with_http_metadata(
                fault,
                Some(status.as_u16()),
                Some(headers),
            ));
        }
        Err(e) => {
            if request.tracing_enabled() {
                tracing::warn!("cannot decode error response: {e}");
            }
            request.set_error(GaxError::deser(e));
        }
    }
}

fn parse_fault(status_code: u16, payload: &[u8]) -> Result<Fault, Error> {
    let root = XmlNode::from_reader(payload)
        .map_err(|source| Error::Xml {
            status_code,
            source,
        })?
        .ok_or(Error::EmptyBody { status_code })?;
    match root.name() {
        "ErrorResponse" => {
            let error = root
                .child("Error")
                .ok_or(Error::MissingError { status_code })?;
            let request_id = text(&root, "RequestId").or_else(|| text(&root, "RequestID"));
            Ok(fault(error, request_id))
        }
        "Response" => {
            let error = root
                .child("Errors")
                .and_then(|e| e.child("Error"))
                .ok_or(Error::MissingError { status_code })?;
            Ok(fault(error, text(&root, "RequestID")))
        }
        SERVICE_UNAVAILABLE => Ok(Fault::default()
            .set_code(SERVICE_UNAVAILABLE)
            .set_message("service is unavailable")),
        other => Err(Error::UnexpectedRoot {
            root: other.to_string(),
            status_code,
        }),
    }
}

fn fault(error: &XmlNode, request_id: Option<&str>) -> Fault {
    let mut fault = Fault::default()
        .set_code(text(error, "Code").unwrap_or_default())
        .set_message(text(error, "Message").unwrap_or_default());
    if let Some(t) = text(error, "Type") {
        fault = fault.set_error_type(t);
    }
    if let Some(id) = request_id {
        fault = fault.set_request_id(id);
    }
    fault
}

fn text<'a>(node: &'a XmlNode, name: &str) -> Option<&'a str> {
    node.child(name).map(XmlNode::text)
}
