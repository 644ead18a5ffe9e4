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

//! The request context used by the protocol handlers.
//!
//! A generated client creates one [Request] per call. The protocol handlers
//! then run in sequence over it: a build handler serializes the parameters
//! into the [HttpRequest], the transport (not part of this crate) sends it and
//! stores the [HttpResponse], and finally an unmarshal handler decodes either
//! the output data or a service fault. Each handler records failures with
//! [Request::set_error], and later handlers see that error.

use crate::Result;
use crate::error::Error;
use crate::options::{ClientConfig, Protocol};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::io::Read;

/// The body of an HTTP response.
pub type Body = Box<dyn Read + Send>;

/// Describes an operation (an RPC) in a service.
///
/// # Example
/// ```
/// # use cloud_sdk_gax::request::Operation;
/// let op = Operation::new("DescribeInstances");
/// assert_eq!(op.name(), "DescribeInstances");
/// assert_eq!(op.http_method(), &http::Method::POST);
/// assert_eq!(op.http_path(), "/");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    name: String,
    http_method: Method,
    http_path: String,
}

impl Operation {
    /// Creates a new operation with the default method (`POST`) and path (`/`).
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            http_method: Method::POST,
            http_path: "/".to_string(),
        }
    }

    /// Sets the HTTP method.
    pub fn set_http_method(mut self, v: Method) -> Self {
        self.http_method = v;
        self
    }

    /// Sets the HTTP path.
    pub fn set_http_path<T: Into<String>>(mut self, v: T) -> Self {
        self.http_path = v.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn http_method(&self) -> &Method {
        &self.http_method
    }

    pub fn http_path(&self) -> &str {
        &self.http_path
    }
}

/// The outgoing HTTP request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    method: Method,
    url: url::Url,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpRequest {
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    pub fn url_mut(&mut self) -> &mut url::Url {
        &mut self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body<T: Into<Bytes>>(&mut self, v: T) {
        self.body = v.into();
    }
}

/// The HTTP response, as received by the transport.
///
/// The body is a stream. The decoders take ownership of it, read it to the
/// end, and drop it, so it is consumed at most once.
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Body>,
}

impl HttpResponse {
    pub fn new<R>(status: StatusCode, headers: HeaderMap, body: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            status,
            headers,
            body: Some(Box::new(body)),
        }
    }

    /// Creates a response with an in-memory body.
    ///
    /// # Example
    /// ```
    /// # use cloud_sdk_gax::request::HttpResponse;
    /// let response = HttpResponse::from_bytes(
    ///     http::StatusCode::OK, http::HeaderMap::new(), "<Response/>");
    /// assert!(response.has_body());
    /// ```
    pub fn from_bytes<T: Into<Bytes>>(status: StatusCode, headers: HeaderMap, body: T) -> Self {
        Self::new(status, headers, std::io::Cursor::new(body.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns true if the body has not been consumed.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Takes ownership of the body, leaving `None` in its place.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "[stream]"))
            .finish()
    }
}

/// The context for a single call.
///
/// `P` is the type of the operation parameters, `D` the type of the output
/// data. Operations without parameters or without output use `()` and `None`.
///
/// # Example
/// ```
/// # use cloud_sdk_gax::{options::ClientConfig, request::{Operation, Request}};
/// let config = ClientConfig::new();
/// let request = Request::<(), ()>::new(
///     &config,
///     "https://sqs.us-east-1.amazonaws.com",
///     Operation::new("ListQueues"),
///     "2012-11-05",
///     None,
///     None,
/// )?;
/// assert_eq!(request.http_request().url().as_str(), "https://sqs.us-east-1.amazonaws.com/");
/// # Ok::<(), cloud_sdk_gax::error::Error>(())
/// ```
#[derive(Debug)]
pub struct Request<P, D> {
    operation: Operation,
    api_version: String,
    protocol: Protocol,
    tracing: bool,
    http_request: HttpRequest,
    http_response: Option<HttpResponse>,
    params: Option<P>,
    data: Option<D>,
    error: Option<Error>,
    request_id: Option<String>,
}

impl<P, D> Request<P, D> {
    /// Creates a new request context.
    ///
    /// The URL is the endpoint in `config` (or `default_endpoint` if not set)
    /// joined with the operation's HTTP path. Returns a serialization error if
    /// the result is not a valid URL.
    pub fn new<T: Into<String>>(
        config: &ClientConfig,
        default_endpoint: &str,
        operation: Operation,
        api_version: T,
        params: Option<P>,
        data: Option<D>,
    ) -> Result<Self> {
        let endpoint = config.endpoint().unwrap_or(default_endpoint);
        let url = format!(
            "{}{}",
            endpoint.trim_end_matches('/'),
            operation.http_path()
        );
        let url = url::Url::parse(&url).map_err(Error::ser)?;
        let http_request = HttpRequest::new(operation.http_method().clone(), url);
        Ok(Self {
            operation,
            api_version: api_version.into(),
            protocol: config.protocol(),
            tracing: config.tracing_enabled(),
            http_request,
            http_response: None,
            params,
            data,
            error: None,
            request_id: None,
        })
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns true if the handlers should emit tracing events.
    pub fn tracing_enabled(&self) -> bool {
        self.tracing
    }

    pub fn http_request(&self) -> &HttpRequest {
        &self.http_request
    }

    pub fn http_request_mut(&mut self) -> &mut HttpRequest {
        &mut self.http_request
    }

    pub fn http_response(&self) -> Option<&HttpResponse> {
        self.http_response.as_ref()
    }

    pub fn http_response_mut(&mut self) -> Option<&mut HttpResponse> {
        self.http_response.as_mut()
    }

    /// Stores the response received by the transport.
    pub fn set_http_response(&mut self, v: HttpResponse) {
        self.http_response = Some(v);
    }

    pub fn params(&self) -> Option<&P> {
        self.params.as_ref()
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut D> {
        self.data.as_mut()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Records a failure. The last error recorded wins.
    pub fn set_error(&mut self, v: Error) {
        self.error = Some(v);
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn set_request_id<T: Into<String>>(&mut self, v: T) {
        self.request_id = Some(v.into());
    }

    /// Consumes the request, returning the output data or the recorded error.
    pub fn into_result(self) -> Result<Option<D>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    type TestResult = anyhow::Result<()>;

    #[test]
    fn operation_defaults() {
        let op = Operation::new("ListQueues");
        assert_eq!(op.name(), "ListQueues");
        assert_eq!(op.http_method(), &Method::POST);
        assert_eq!(op.http_path(), "/");
    }

    #[test]
    fn operation_setters() {
        let op = Operation::new("ListQueues")
            .set_http_method(Method::GET)
            .set_http_path("/queues");
        assert_eq!(op.http_method(), &Method::GET);
        assert_eq!(op.http_path(), "/queues");
    }

    #[test_case("https://example.com", "/", "https://example.com/")]
    #[test_case("https://example.com/", "/", "https://example.com/"; "trailing slash")]
    #[test_case("https://example.com", "/v1/path", "https://example.com/v1/path"; "custom path")]
    #[test_case("http://localhost:8080", "/", "http://localhost:8080/"; "with port")]
    fn new_url(endpoint: &str, path: &str, want: &str) -> TestResult {
        let config = ClientConfig::new();
        let op = Operation::new("Test").set_http_path(path);
        let request = Request::<(), ()>::new(&config, endpoint, op, "2014-01-01", None, None)?;
        assert_eq!(request.http_request().url().as_str(), want);
        assert_eq!(request.http_request().method(), &Method::POST);
        assert!(request.http_request().body().is_empty());
        Ok(())
    }

    #[test]
    fn new_uses_config() -> TestResult {
        let config = ClientConfig::new()
            .set_endpoint("http://localhost:9000")
            .set_protocol(Protocol::Ec2)
            .enable_tracing();
        let request = Request::<(), ()>::new(
            &config,
            "https://example.com",
            Operation::new("Test"),
            "2014-01-01",
            None,
            None,
        )?;
        assert_eq!(
            request.http_request().url().as_str(),
            "http://localhost:9000/"
        );
        assert_eq!(request.protocol(), Protocol::Ec2);
        assert!(request.tracing_enabled());
        assert_eq!(request.operation().name(), "Test");
        assert_eq!(request.api_version(), "2014-01-01");
        Ok(())
    }

    #[test]
    fn new_bad_url() {
        let config = ClientConfig::new();
        let request = Request::<(), ()>::new(
            &config,
            "not a url",
            Operation::new("Test"),
            "2014-01-01",
            None,
            None,
        );
        assert!(
            matches!(&request, Err(e) if e.is_serialization()),
            "{request:?}"
        );
    }

    #[test]
    fn into_result() -> TestResult {
        let config = ClientConfig::new();
        let new = || {
            Request::<String, String>::new(
                &config,
                "https://example.com",
                Operation::new("Test"),
                "2014-01-01",
                Some("params".to_string()),
                Some("data".to_string()),
            )
        };
        let request = new()?;
        assert_eq!(request.params().map(String::as_str), Some("params"));
        assert_eq!(request.into_result()?, Some("data".to_string()));

        let mut request = new()?;
        request.set_error(Error::deser("test only"));
        let got = request.into_result();
        assert!(
            matches!(&got, Err(e) if e.is_deserialization()),
            "{got:?}"
        );
        Ok(())
    }

    #[test]
    fn response_body() -> TestResult {
        let mut response = HttpResponse::from_bytes(StatusCode::OK, HeaderMap::new(), "abc");
        assert!(response.has_body());
        let fmt = format!("{response:?}");
        assert!(fmt.contains("[stream]"), "{fmt}");
        let mut body = response.take_body().ok_or_else(|| anyhow::anyhow!("missing body"))?;
        let mut contents = String::new();
        body.read_to_string(&mut contents)?;
        assert_eq!(contents, "abc");
        assert!(!response.has_body());
        assert!(response.take_body().is_none());
        Ok(())
    }

    #[test]
    fn request_id() -> TestResult {
        let config = ClientConfig::new();
        let mut request = Request::<(), ()>::new(
            &config,
            "https://example.com",
            Operation::new("Test"),
            "2014-01-01",
            None,
            None,
        )?;
        assert_eq!(request.request_id(), None);
        request.set_request_id("abc-123");
        assert_eq!(request.request_id(), Some("abc-123"));
        Ok(())
    }
}
