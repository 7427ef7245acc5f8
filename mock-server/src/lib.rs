//! A stand-in GitLab v3 API that replays the documents under `__files/`.

pub mod fixtures;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::fixtures::FixtureError;

/// Token accepted on authenticated routes.
pub const PRIVATE_TOKEN: &str = "token";
/// Password accepted for every known login.
pub const PASSWORD: &str = "password";

#[derive(Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    Router::new()
        .route("/api/v3/session", post(create_session))
        .route("/api/v3/groups", get(list_groups))
        .route("/api/v3/groups/{id}", get(get_group))
        .route("/api/v3/groups/{id}/members", get(list_group_members))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

fn unauthorized() -> Reply {
    message(StatusCode::UNAUTHORIZED, "401 Unauthorized")
}

fn not_found() -> Reply {
    message(StatusCode::NOT_FOUND, "404 Not Found")
}

fn fixture_failure(err: FixtureError) -> Reply {
    tracing::error!(error = %err, "fixture unavailable");
    message(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn authorize(headers: &HeaderMap) -> Result<(), Reply> {
    let token = headers.get("private-token").and_then(|v| v.to_str().ok());
    if token == Some(PRIVATE_TOKEN) {
        Ok(())
    } else {
        tracing::debug!(present = token.is_some(), "rejecting private token");
        Err(unauthorized())
    }
}

fn find_group(id: u64) -> Result<Option<Value>, FixtureError> {
    Ok(fixtures::load_json_array("api/v3/groups", None)?
        .into_iter()
        .find(|group| group["id"].as_u64() == Some(id)))
}

async fn create_session(Json(input): Json<Credentials>) -> Reply {
    let variant = match (input.login.as_str(), input.password.as_str()) {
        ("username" | "user@example.com", PASSWORD) => None,
        ("blocked" | "blocked@example.com", PASSWORD) => Some("blocked"),
        (login, _) => {
            tracing::debug!(login, "rejecting login");
            return unauthorized();
        }
    };
    match fixtures::load_json_object("api/v3/session", variant) {
        Ok(session) => (StatusCode::CREATED, Json(session)),
        Err(err) => fixture_failure(err),
    }
}

async fn list_groups(headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    match fixtures::load_json_array("api/v3/groups", None) {
        Ok(groups) => (StatusCode::OK, Json(Value::Array(groups))),
        Err(err) => fixture_failure(err),
    }
}

async fn get_group(headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    match find_group(id) {
        Ok(Some(group)) => (StatusCode::OK, Json(group)),
        Ok(None) => not_found(),
        Err(err) => fixture_failure(err),
    }
}

async fn list_group_members(headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    match find_group(id) {
        Ok(Some(_)) => match fixtures::load_json_array("api/v3/groups/id/members", None) {
            Ok(members) => (StatusCode::OK, Json(Value::Array(members))),
            Err(err) => fixture_failure(err),
        },
        Ok(None) => not_found(),
        Err(err) => fixture_failure(err),
    }
}
