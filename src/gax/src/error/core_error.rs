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

use super::fault::Fault;
use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by all client libraries.
///
/// The client libraries report errors from multiple sources. For example, the
/// service may return a fault, the response body may be unreadable, or the
/// library may be unable to format the request due to invalid application
/// inputs.
///
/// Most applications will just return the error or log it, without any further
/// action. However, some applications may need to interrogate the error
/// details. This type offers a series of predicates to determine the error
/// kind. The type also offers accessors to query the most common error details.
/// Applications can query the error [source][std::error::Error::source] for
/// deeper information.
///
/// # Example
/// ```
/// use cloud_sdk_gax::error::Error;
/// match example_function() {
///     Err(e) if e.fault().is_some_and(|f| f.code == "Throttling") => {
///         println!("slow down {e}");
///     },
///     Err(e) if e.is_deserialization() => { println!("unexpected response {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # use cloud_sdk_gax::error::fault::Fault;
///     # Err(Error::service(Fault::default().set_code("Throttling").set_message("Rate exceeded")))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error with the fault returned by a service.
    ///
    /// # Example
    /// ```
    /// use cloud_sdk_gax::error::Error;
    /// use cloud_sdk_gax::error::fault::Fault;
    /// let fault = Fault::default().set_code("NotFound").set_message("NOT FOUND");
    /// let error = Error::service(fault.clone());
    /// assert_eq!(error.fault(), Some(&fault));
    /// ```
    pub fn service(fault: Fault) -> Self {
        let details = ServiceDetails {
            fault,
            status_code: None,
            headers: None,
        };
        Self {
            kind: ErrorKind::Service(Box::new(details)),
            source: None,
        }
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// Create service errors including transport metadata.
    #[doc(hidden)]
    pub fn service_with_http_metadata(
        fault: Fault,
        status_code: Option<u16>,
        headers: Option<HeaderMap>,
    ) -> Self {
        let details = ServiceDetails {
            status_code,
            headers,
            fault,
        };
        let kind = ErrorKind::Service(Box::new(details));
        Self { kind, source: None }
    }

    /// The [Fault] payload associated with this error.
    ///
    /// # Examples
    /// ```
    /// use cloud_sdk_gax::error::{Error, fault::Fault};
    /// let error = Error::service(Fault::default().set_code("Throttling"));
    /// if let Some(fault) = error.fault() {
    ///     if fault.code == "Throttling" {
    ///         println!("retry later, request id: {:?}", fault.request_id);
    ///     }
    /// }
    /// ```
    ///
    /// Query protocol services return a fault envelope with a short error
    /// code, a human-readable message, and the request id.
    ///
    /// # Troubleshooting
    ///
    /// As this error type is typically created by the service, troubleshooting
    /// this problem typically involves reading the service documentation for
    /// the specific error code.
    pub fn fault(&self) -> Option<&Fault> {
        match &self.kind {
            ErrorKind::Service(d) => Some(&d.as_ref().fault),
            _ => None,
        }
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// Creates an error representing a deserialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_sdk_gax::error::Error;
    /// let error = Error::deser("simulated problem");
    /// assert!(error.is_deserialization());
    /// assert!(error.source().is_some());
    /// ```
    #[doc(hidden)]
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The response could not be deserialized.
    ///
    /// This is always a client-side generated error. Note that the request may
    /// or may not have completed in the service. If the request mutates any
    /// state in the service, it may or may not be safe to attempt the request
    /// again.
    ///
    /// This is also the error returned when a non-success response does not
    /// contain a valid fault envelope. In that case the error includes the
    /// HTTP status code in its source.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause for deserialization problems are bugs in the
    /// client library and (rarely) bugs in the service. Proxies and load
    /// balancers may also return non-XML payloads for some errors.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// Creates an error representing a serialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_sdk_gax::error::Error;
    /// let error = Error::ser("simulated problem");
    /// assert!(error.is_serialization());
    /// assert!(error.source().is_some());
    /// ```
    #[doc(hidden)]
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Serialization,
            source: Some(source.into()),
        }
    }

    /// The request could not be serialized.
    ///
    /// This is always a client-side generated error, generated before the
    /// request is made. This error is never transient: the serialization is
    /// deterministic, and will fail on future attempts with the same input
    /// data.
    ///
    /// # Troubleshooting
    ///
    /// The most common causes are floating point fields set to `NaN` or
    /// infinity, and endpoints that do not form a valid URL. Use
    /// `format!("{:?}", ...)` to examine the error as it should include the
    /// original problem.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// The HTTP status code, if any, associated with this error.
    ///
    /// # Example
    /// ```
    /// use cloud_sdk_gax::error::Error;
    /// let e = search_for_thing("the thing");
    /// if let Some(code) = e.http_status_code() {
    ///     if code == 404 {
    ///         println!("cannot find the thing, more details in {e}");
    ///     }
    /// }
    ///
    /// fn search_for_thing(name: &str) -> Error {
    ///     # use cloud_sdk_gax::error::fault::Fault;
    ///     # Error::service_with_http_metadata(Fault::default(), Some(404), None)
    /// }
    /// ```
    ///
    /// Note that `http_status_code()`, `http_headers()`, and `fault()` are
    /// represented as different fields, because they may be set in some
    /// errors but not others.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Service(d) => d.as_ref().status_code,
            _ => None,
        }
    }

    /// The headers, if any, associated with this error.
    ///
    /// # Example
    /// ```
    /// use cloud_sdk_gax::error::Error;
    /// let e = search_for_thing("the thing");
    /// if let Some(headers) = e.http_headers() {
    ///     if let Some(id) = headers.get("x-amzn-requestid") {
    ///         println!("include this in support requests {id:?}");
    ///     }
    /// }
    ///
    /// fn search_for_thing(name: &str) -> Error {
    ///     # let mut map = http::HeaderMap::new();
    ///     # map.insert("x-amzn-requestid", http::HeaderValue::from_static("placeholder"));
    ///     # use cloud_sdk_gax::error::fault::Fault;
    ///     # Error::service_with_http_metadata(Fault::default(), Some(400), Some(map))
    /// }
    /// ```
    pub fn http_headers(&self) -> Option<&http::HeaderMap> {
        match &self.kind {
            ErrorKind::Service(d) => d.as_ref().headers.as_ref(),
            _ => None,
        }
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// A problem in the transport layer without a full HTTP response.
    ///
    /// Examples include a response body that cannot be read to completion.
    #[doc(hidden)]
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Io,
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer without a full HTTP response.
    ///
    /// # Troubleshooting
    ///
    /// This indicates a problem reading the response. This type of error is
    /// rare, but includes crashes and restarts on proxies and load balancers.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Serialization, Some(e)) => write!(f, "cannot serialize the request {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response {e}")
            }
            (ErrorKind::Io, Some(e)) => write!(f, "the transport reports an error: {e}"),
            (ErrorKind::Service(d), _) => {
                write!(
                    f,
                    "the service reports an error with code {} described as: {}",
                    d.fault.code, d.fault.message
                )
            }
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Serialization,
    Deserialization,
    Io,
    Service(Box<ServiceDetails>),
}

#[derive(Debug)]
struct ServiceDetails {
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    fault: Fault,
}
