//! Client configuration loaded from TOML.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::client::GitLabClient;
use crate::error::ConfigError;
use crate::route::{PatternProxyRoutePlanner, ProxyEndpoint};

/// Forwarding proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Hostname patterns that bypass the proxy. Each must match a whole hostname.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Everything needed to talk to one GitLab instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub private_token: Option<String>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        let base = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl(config.base_url));
        }
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            base_url = %config.base_url,
            proxied = config.proxy.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn client(&self) -> GitLabClient {
        let client = GitLabClient::new(&self.base_url);
        match &self.private_token {
            Some(token) => client.with_private_token(token.clone()),
            None => client,
        }
    }

    /// Builds the route planner for the `[proxy]` section, if there is one.
    pub fn route_planner(&self) -> Result<Option<PatternProxyRoutePlanner>, ConfigError> {
        let Some(proxy) = &self.proxy else {
            return Ok(None);
        };
        let endpoint = ProxyEndpoint::new(proxy.host.clone(), proxy.port);
        let planner = PatternProxyRoutePlanner::new(endpoint, proxy.exclude.iter().cloned())?;
        Ok(Some(planner))
    }
}
