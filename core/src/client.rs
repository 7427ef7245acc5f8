//! Stateless HTTP request builder and response parser for the GitLab v3 API.
//!
//! # Design
//! `GitLabClient` holds the API base URL and, once logged in, the private
//! token. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller plans the route and executes the round trip in between.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, PRIVATE_TOKEN_HEADER};
use crate::types::{Credentials, GitLabGroup, GitLabSession, GroupMember};

const API_PREFIX: &str = "/api/v3";

/// Synchronous, stateless client for the GitLab API.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    base_url: String,
    private_token: Option<String>,
}

impl GitLabClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            private_token: None,
        }
    }

    /// Returns a client that authenticates every request with `token`.
    pub fn with_private_token(mut self, token: impl Into<String>) -> Self {
        self.private_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn private_token(&self) -> Option<&str> {
        self.private_token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        let headers = self
            .private_token
            .iter()
            .map(|token| (PRIVATE_TOKEN_HEADER.to_string(), token.clone()))
            .collect();
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            headers,
            body: None,
        }
    }

    pub fn build_login(&self, login: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let credentials = Credentials {
            login: login.to_string(),
            password: password.to_string(),
        };
        let body = serde_json::to_string(&credentials).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url("/session"),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_groups(&self) -> HttpRequest {
        self.get("/groups")
    }

    pub fn build_get_group(&self, id: u64) -> HttpRequest {
        self.get(&format!("/groups/{id}"))
    }

    pub fn build_list_group_members(&self, group_id: u64) -> HttpRequest {
        self.get(&format!("/groups/{group_id}/members"))
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<GitLabSession, ApiError> {
        check_status(&response, 201)?;
        Ok(GitLabSession::from_json(&json_body(&response)?)?)
    }

    pub fn parse_list_groups(&self, response: HttpResponse) -> Result<Vec<GitLabGroup>, ApiError> {
        check_status(&response, 200)?;
        json_array(&response)?
            .iter()
            .map(|value| GitLabGroup::from_json(value).map_err(ApiError::from))
            .collect()
    }

    pub fn parse_get_group(&self, response: HttpResponse) -> Result<GitLabGroup, ApiError> {
        check_status(&response, 200)?;
        Ok(GitLabGroup::from_json(&json_body(&response)?)?)
    }

    /// Parses the member list of `group`. Members are tagged with the group's
    /// path, which is the name GitLab uses in URLs.
    pub fn parse_list_group_members(
        &self,
        response: HttpResponse,
        group: &GitLabGroup,
    ) -> Result<Vec<GroupMember>, ApiError> {
        check_status(&response, 200)?;
        json_array(&response)?
            .iter()
            .map(|value| GroupMember::from_json(value, group.path()).map_err(ApiError::from))
            .collect()
    }
}

fn json_body(response: &HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn json_array(response: &HttpResponse) -> Result<Vec<Value>, ApiError> {
    match json_body(response)? {
        Value::Array(items) => Ok(items),
        other => Err(ApiError::DeserializationError(format!(
            "expected a JSON array, got {other}"
        ))),
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
