//! Error types for the GitLab API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers
//! branch on them. All other non-2xx responses land in `HttpError` with the
//! raw status code and body. Model construction failures keep their own
//! type so they can be raised without a response in hand.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a model object from a JSON document.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected a JSON object")]
    NotAnObject,

    /// One or more required keys are absent. No partial object is built.
    #[error("missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// All keys are present but a value has the wrong type or format.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("unknown access level: {0}")]
    UnknownAccessLevel(i64),
}

/// Errors returned by `GitLabClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401; the credentials or private token were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned a non-2xx status other than 401 and 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body was not valid JSON of the expected shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised while planning a route or constructing a route planner.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid hostname pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("target host has no hostname")]
    MissingHostname,

    #[error("no default port known for scheme `{0}`")]
    UnsupportedScheme(String),
}

/// Errors raised while loading a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Route(#[from] RouteError),
}
