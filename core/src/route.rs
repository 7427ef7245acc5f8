//! Route planning: direct connection or through a forwarding proxy.
//!
//! # Design
//! `RoutePlanner` is the seam the caller's transport consults before opening
//! a connection. `DefaultProxyRoutePlanner` sends everything through one
//! proxy. `PatternProxyRoutePlanner` wraps another planner and short-circuits
//! to a direct route for hostnames matching one of its exclusion patterns;
//! every other host is handed to the wrapped planner untouched.
//!
//! Planners hold only configuration fixed at construction, so a single
//! instance can be shared across threads.

use std::fmt;
use std::net::IpAddr;

use regex::Regex;

use crate::error::RouteError;
use crate::http::{Host, HttpRequest};

/// A statically configured forwarding proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyEndpoint {
    hostname: String,
    port: u16,
}

impl ProxyEndpoint {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The proxy as an `http://host:port` URL, the form HTTP agents expect.
    pub fn url(&self) -> String {
        format!("http://{self}")
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// Per-call context handed to route planners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteContext {
    /// Local address to bind outgoing proxy connections to.
    pub local_address: Option<IpAddr>,
}

/// The outcome of a routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Connect straight to the target.
    Direct { target: Host },
    /// Connect to `proxy`, which forwards to the target.
    Proxied {
        target: Host,
        proxy: ProxyEndpoint,
        local_address: Option<IpAddr>,
    },
}

impl Route {
    pub fn target(&self) -> &Host {
        match self {
            Route::Direct { target } | Route::Proxied { target, .. } => target,
        }
    }

    pub fn proxy(&self) -> Option<&ProxyEndpoint> {
        match self {
            Route::Direct { .. } => None,
            Route::Proxied { proxy, .. } => Some(proxy),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Route::Direct { .. })
    }

    /// A proxied TLS target needs a CONNECT tunnel through the proxy.
    pub fn is_tunnelled(&self) -> bool {
        matches!(self, Route::Proxied { target, .. } if target.is_secure())
    }
}

/// Chooses how an outgoing request reaches its host.
pub trait RoutePlanner: Send + Sync + fmt::Debug {
    fn determine_route(
        &self,
        host: &Host,
        request: &HttpRequest,
        context: &RouteContext,
    ) -> Result<Route, RouteError>;
}

impl<P: RoutePlanner + ?Sized> RoutePlanner for Box<P> {
    fn determine_route(
        &self,
        host: &Host,
        request: &HttpRequest,
        context: &RouteContext,
    ) -> Result<Route, RouteError> {
        (**self).determine_route(host, request, context)
    }
}

/// Routes every request through a single proxy.
#[derive(Debug, Clone)]
pub struct DefaultProxyRoutePlanner {
    proxy: ProxyEndpoint,
}

impl DefaultProxyRoutePlanner {
    pub fn new(proxy: ProxyEndpoint) -> Self {
        Self { proxy }
    }

    pub fn proxy(&self) -> &ProxyEndpoint {
        &self.proxy
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

impl RoutePlanner for DefaultProxyRoutePlanner {
    fn determine_route(
        &self,
        host: &Host,
        request: &HttpRequest,
        context: &RouteContext,
    ) -> Result<Route, RouteError> {
        if host.hostname().is_empty() {
            return Err(RouteError::MissingHostname);
        }
        let target = match host.port() {
            Some(_) => host.clone(),
            None => {
                let port = default_port(host.scheme())
                    .ok_or_else(|| RouteError::UnsupportedScheme(host.scheme().to_string()))?;
                host.with_port(port)
            }
        };
        tracing::trace!(
            method = request.method.as_str(),
            host = %target,
            proxy = %self.proxy,
            "routing through proxy"
        );
        Ok(Route::Proxied {
            target,
            proxy: self.proxy.clone(),
            local_address: context.local_address,
        })
    }
}

/// A hostname regular expression that must match the whole hostname.
#[derive(Debug, Clone)]
pub struct HostnamePattern {
    source: String,
    regex: Regex,
}

impl HostnamePattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, RouteError> {
        let source = pattern.into();
        let invalid = |e: regex::Error| RouteError::InvalidPattern {
            pattern: source.clone(),
            source: e,
        };
        // The bare pattern must parse on its own; a stray `)` would otherwise
        // close the anchoring group below.
        Regex::new(&source).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(invalid)?;
        Ok(Self { source, regex })
    }

    /// The pattern as it was configured, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.regex.is_match(hostname)
    }
}

impl fmt::Display for HostnamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Bypasses the wrapped planner for hostnames matching an exclusion pattern.
#[derive(Debug, Clone)]
pub struct PatternProxyRoutePlanner<P = DefaultProxyRoutePlanner> {
    delegate: P,
    excluded_hostnames: Vec<HostnamePattern>,
}

impl PatternProxyRoutePlanner<DefaultProxyRoutePlanner> {
    /// Routes through `proxy` except for hosts matching `excluded_hostnames`.
    ///
    /// Every pattern is compiled here; the first malformed one is returned as
    /// `RouteError::InvalidPattern`.
    pub fn new<I, S>(proxy: ProxyEndpoint, excluded_hostnames: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_delegate(DefaultProxyRoutePlanner::new(proxy), excluded_hostnames)
    }
}

impl<P: RoutePlanner> PatternProxyRoutePlanner<P> {
    pub fn with_delegate<I, S>(delegate: P, excluded_hostnames: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded_hostnames = excluded_hostnames
            .into_iter()
            .map(HostnamePattern::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            delegate,
            excluded_hostnames,
        })
    }

    /// The exclusion patterns in configured order.
    pub fn excluded_hostnames(&self) -> &[HostnamePattern] {
        &self.excluded_hostnames
    }

    pub fn delegate(&self) -> &P {
        &self.delegate
    }
}

impl<P: RoutePlanner> RoutePlanner for PatternProxyRoutePlanner<P> {
    fn determine_route(
        &self,
        host: &Host,
        request: &HttpRequest,
        context: &RouteContext,
    ) -> Result<Route, RouteError> {
        let hostname = host.hostname();
        if let Some(pattern) = self.excluded_hostnames.iter().find(|p| p.matches(hostname)) {
            tracing::debug!(hostname, pattern = pattern.as_str(), "bypassing proxy");
            return Ok(Route::Direct {
                target: host.clone(),
            });
        }
        self.delegate.determine_route(host, request, context)
    }
}
