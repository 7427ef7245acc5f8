//! Synchronous API client core for GitLab.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Before executing a request
//! the caller asks a `RoutePlanner` whether to connect directly or through
//! the configured forwarding proxy.
//!
//! # Design
//! - `GitLabClient` holds only the base URL and an optional private token.
//! - Each API operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `PatternProxyRoutePlanner` wraps any other planner and sends hosts
//!   matching an exclusion pattern straight to their destination.
//! - Model types are validated on construction and expose getters only.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod route;
pub mod types;

pub use client::GitLabClient;
pub use config::{ClientConfig, ProxyConfig};
pub use error::{ApiError, ConfigError, ModelError, RouteError};
pub use http::{Host, HttpMethod, HttpRequest, HttpResponse, PRIVATE_TOKEN_HEADER};
pub use route::{
    DefaultProxyRoutePlanner, HostnamePattern, PatternProxyRoutePlanner, ProxyEndpoint, Route,
    RouteContext, RoutePlanner,
};
pub use types::{AccessLevel, Credentials, GitLabGroup, GitLabSession, GroupMember};
