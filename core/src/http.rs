//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network. The caller executes the round trip, asking a
//! `RoutePlanner` first whether the request goes direct or through a proxy.
//!
//! `Host` is the routing view of a request: scheme, hostname and the port if
//! the URL spells one out.

use std::fmt;

use url::Url;

use crate::error::RouteError;

/// Header carrying the private token on authenticated requests.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `GitLabClient::build_*` methods. `url` is always absolute so the
/// target host can be recovered for route planning.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Returns the value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The host this request is addressed to.
    pub fn target_host(&self) -> Result<Host, RouteError> {
        Host::from_url(&self.url)
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed
/// to `GitLabClient::parse_*` methods for deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// A network endpoint a request is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    scheme: String,
    hostname: String,
    port: Option<u16>,
}

impl Host {
    pub fn new(scheme: impl Into<String>, hostname: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            hostname: hostname.into(),
            port,
        }
    }

    /// Shorthand for an `http` host without an explicit port.
    pub fn http(hostname: impl Into<String>) -> Self {
        Self::new("http", hostname, None)
    }

    /// Extracts the host from an absolute URL.
    ///
    /// Only a port written in the URL is kept; `url` drops ports equal to the
    /// scheme default, which leaves the default to the route planner.
    pub fn from_url(raw: &str) -> Result<Self, RouteError> {
        let parsed = Url::parse(raw).map_err(|e| RouteError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        let hostname = parsed.host_str().ok_or(RouteError::MissingHostname)?;
        Ok(Self::new(parsed.scheme(), hostname, parsed.port()))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns a copy of this host with `port` set.
    pub fn with_port(&self, port: u16) -> Self {
        Self {
            port: Some(port),
            ..self.clone()
        }
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{port}", self.scheme, self.hostname),
            None => write!(f, "{}://{}", self.scheme, self.hostname),
        }
    }
}
