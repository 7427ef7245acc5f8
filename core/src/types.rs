//! Model types for GitLab API resources.
//!
//! # Design
//! Every type is built from a JSON object with `from_json`. The required
//! keys are checked up front so a document missing several fields reports
//! all of them at once, and no partially-populated value is ever returned.
//! Fields are private; the types expose getters only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// Checks that `value` is an object containing every key in `required`.
fn require_keys(value: &Value, required: &[&str]) -> Result<(), ModelError> {
    let object = value.as_object().ok_or(ModelError::NotAnObject)?;
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ModelError::MissingKeys(missing))
    }
}

fn decode<T: DeserializeOwned>(value: &Value, required: &[&str]) -> Result<T, ModelError> {
    require_keys(value, required)?;
    T::deserialize(value).map_err(|e| ModelError::InvalidDocument(e.to_string()))
}

/// The authenticated user returned by a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabSession {
    id: u64,
    username: String,
    email: String,
    name: String,
    private_token: String,
    blocked: bool,
}

impl GitLabSession {
    const REQUIRED_KEYS: &'static [&'static str] =
        &["id", "username", "email", "name", "private_token", "blocked"];

    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        decode(value, Self::REQUIRED_KEYS)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token to send as `PRIVATE-TOKEN` on subsequent requests.
    pub fn private_token(&self) -> &str {
        &self.private_token
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// A GitLab group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabGroup {
    id: u64,
    name: String,
    path: String,
}

impl GitLabGroup {
    const REQUIRED_KEYS: &'static [&'static str] = &["id", "name", "path"];

    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        decode(value, Self::REQUIRED_KEYS)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for GitLabGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Permission tier of a group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    Guest,
    Reporter,
    Developer,
    Master,
    Owner,
}

impl AccessLevel {
    pub fn from_level(level: i64) -> Result<Self, ModelError> {
        match level {
            10 => Ok(AccessLevel::Guest),
            20 => Ok(AccessLevel::Reporter),
            30 => Ok(AccessLevel::Developer),
            40 => Ok(AccessLevel::Master),
            50 => Ok(AccessLevel::Owner),
            other => Err(ModelError::UnknownAccessLevel(other)),
        }
    }

    /// The numeric level used on the wire.
    pub fn level(self) -> i64 {
        match self {
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Master => 40,
            AccessLevel::Owner => 50,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessLevel::Guest => "guest",
            AccessLevel::Reporter => "reporter",
            AccessLevel::Developer => "developer",
            AccessLevel::Master => "master",
            AccessLevel::Owner => "owner",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize)]
struct MemberDocument {
    id: u64,
    username: String,
    email: String,
    name: String,
    state: String,
    created_at: DateTime<Utc>,
    access_level: i64,
}

/// A user's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    id: u64,
    username: String,
    email: String,
    name: String,
    state: String,
    created_at: DateTime<Utc>,
    access_level: AccessLevel,
    group_name: String,
}

impl GroupMember {
    const REQUIRED_KEYS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "name",
        "state",
        "created_at",
        "access_level",
    ];

    /// Builds a member of the group named `group_name`.
    pub fn from_json(value: &Value, group_name: &str) -> Result<Self, ModelError> {
        let doc: MemberDocument = decode(value, Self::REQUIRED_KEYS)?;
        Ok(Self {
            id: doc.id,
            username: doc.username,
            email: doc.email,
            name: doc.name,
            state: doc.state,
            created_at: doc.created_at,
            access_level: AccessLevel::from_level(doc.access_level)?,
            group_name: group_name.to_string(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// When the user account was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    pub fn is_active(&self) -> bool {
        self.state == "active"
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }
}

/// Body of a login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}
