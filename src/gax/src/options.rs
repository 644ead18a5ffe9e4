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

const LOGGING_VAR: &str = "CLOUD_SDK_RUST_LOGGING";

/// Configure a client.
///
/// A client represents a connection to a service. Each client library
/// provides defaults that should work for most applications. But some
/// applications may need to override the default endpoint, enable tracing, or
/// select the EC2 dialect of the Query protocol.
///
/// # Example
/// ```
/// # use cloud_sdk_gax::options::{ClientConfig, Protocol};
/// let config = ClientConfig::new()
///     .set_endpoint("https://ec2.us-west-2.amazonaws.com")
///     .set_protocol(Protocol::Ec2)
///     .enable_tracing();
/// assert_eq!(config.protocol(), Protocol::Ec2);
/// assert!(config.tracing_enabled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub(crate) endpoint: Option<String>,
    pub(crate) tracing: bool,
    pub(crate) protocol: Protocol,
}

impl ClientConfig {
    /// Returns a default [ClientConfig].
    pub fn new() -> Self {
        Self::default()
    }

    /// The endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// The Query protocol dialect used by the client.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns true if tracing is enabled, either in the configuration or
    /// via the `CLOUD_SDK_RUST_LOGGING` environment variable.
    pub fn tracing_enabled(&self) -> bool {
        if self.tracing {
            return true;
        }
        std::env::var(LOGGING_VAR)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Sets an endpoint that overrides the default endpoint for a service.
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Enables tracing.
    pub fn enable_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    /// Disables tracing.
    pub fn disable_tracing(mut self) -> Self {
        self.tracing = false;
        self
    }

    /// Selects the Query protocol dialect.
    pub fn set_protocol(mut self, v: Protocol) -> Self {
        self.protocol = v;
        self
    }
}

/// The dialects of the Query protocol.
///
/// Both dialects send form-encoded parameters and receive XML responses. They
/// differ in how collections and field names appear on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Protocol {
    /// The general Query protocol. Lists default to the `member` wrapped
    /// form and maps use `entry` elements.
    #[default]
    Query,

    /// The EC2 dialect. Lists are always flattened, maps have no `entry`
    /// segment, and wire names are capitalized.
    Ec2,
}
