//! Canned GitLab JSON documents under `__files/`.
//!
//! The server replays these files and tests load the same files to compare
//! against, so both always agree on the data. A path such as
//! `api/v3/groups/byGroupId` resolves to `__files/api/v3/groups/byGroupId.json`;
//! a variant appends `_<variant>` before the extension.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("the file {} doesn't exist in the fixtures", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected {expected} in {}", .path.display())]
    Shape { path: PathBuf, expected: &'static str },
}

/// Root directory of the fixture files.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("__files")
}

/// Absolute path of a fixture, with an optional variant suffix.
pub fn fixture_path(relative_path: &str, variant: Option<&str>) -> PathBuf {
    let name = match variant.filter(|v| !v.is_empty()) {
        Some(variant) => format!("{relative_path}_{variant}.json"),
        None => format!("{relative_path}.json"),
    };
    fixtures_dir().join(name)
}

fn load(relative_path: &str, variant: Option<&str>) -> Result<(PathBuf, Value), FixtureError> {
    let path = fixture_path(relative_path, variant);
    if !path.is_file() {
        return Err(FixtureError::NotFound(path));
    }
    let content = fs::read_to_string(&path).map_err(|source| FixtureError::Io {
        path: path.clone(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| FixtureError::Json {
        path: path.clone(),
        source,
    })?;
    Ok((path, value))
}

/// Loads a fixture holding a single JSON object.
pub fn load_json_object(relative_path: &str, variant: Option<&str>) -> Result<Value, FixtureError> {
    let (path, value) = load(relative_path, variant)?;
    if !value.is_object() {
        return Err(FixtureError::Shape {
            path,
            expected: "a JSON object",
        });
    }
    Ok(value)
}

/// Loads a fixture holding a JSON array.
pub fn load_json_array(relative_path: &str, variant: Option<&str>) -> Result<Vec<Value>, FixtureError> {
    match load(relative_path, variant)? {
        (_, Value::Array(items)) => Ok(items),
        (path, _) => Err(FixtureError::Shape {
            path,
            expected: "a JSON array",
        }),
    }
}

/// Loads the object at `index` of a fixture holding a JSON array.
pub fn load_json_object_at(
    relative_path: &str,
    index: usize,
    variant: Option<&str>,
) -> Result<Value, FixtureError> {
    let path = fixture_path(relative_path, variant);
    load_json_array(relative_path, variant)?
        .into_iter()
        .nth(index)
        .filter(Value::is_object)
        .ok_or(FixtureError::Shape {
            path,
            expected: "an object at the requested index",
        })
}
