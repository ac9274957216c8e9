//! Route tables loaded from YAML or JSON.
//!
//! ```yaml
//! root: /app
//! routes:
//!   - pattern: "posts/:post_id"
//!     chain: "[posts].post"
//!   - pattern: "post/:post_id/comments/:comment_id"
//!     chain: "post.[comments].comment"
//! ```
//!
//! Routes are a list rather than a map so declaration order, which decides
//! precedence, survives parsing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::StartOptions;

/// One declared route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// Route syntax, e.g. `"posts/:post_id"`
    pub pattern: String,
    /// Chain name, e.g. `"[posts].post"`
    pub chain: String,
}

impl RouteEntry {
    pub fn new(pattern: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            chain: chain.into(),
        }
    }
}

/// A router's declarative configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Application root stripped from path-based URLs
    #[serde(default)]
    pub root: Option<String>,

    /// Routes in precedence order
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouterConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a route table, choosing the format by file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let read = || {
            fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let config = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&read()?)?,
            Some("json") => Self::from_json_str(&read()?)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        log::debug!(
            "loaded {} routes from {}",
            config.routes.len(),
            path.display()
        );
        Ok(config)
    }

    /// History start options carrying this table's root.
    pub fn start_options(&self) -> StartOptions {
        match &self.root {
            Some(root) => StartOptions {
                root: root.clone(),
                ..StartOptions::default()
            },
            None => StartOptions::default(),
        }
    }
}
