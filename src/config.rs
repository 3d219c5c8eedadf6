//! # Router Configuration
//!
//! Construction options for a [`Router`](crate::router::Router), loadable from
//! YAML and overridable from the environment.
//!
//! ## Environment Variables
//!
//! ### `STACKROUTER_PREFIX`
//!
//! Path prefix applied to every layer registered on the router, e.g. `/api`.
//! A trailing slash is stripped.
//!
//! ## Example Configuration
//!
//! ```yaml
//! prefix: /api
//! ```

use anyhow::Context as _;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Environment variable holding the router prefix
pub const PREFIX_ENV: &str = "STACKROUTER_PREFIX";

/// Options a [`Router`](crate::router::Router) is constructed with
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterOptions {
    /// Prefix prepended to every registered path
    pub prefix: Option<String>,
}

impl RouterOptions {
    /// Options with the given prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Load options from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Parse options from a YAML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or has unknown keys.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid router options")
    }

    /// Load options from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read router options from {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Override fields with any values set in the environment
    #[must_use]
    pub fn merge_env(mut self) -> Self {
        if let Ok(prefix) = env::var(PREFIX_ENV) {
            self.prefix = Some(prefix);
        }
        self
    }

    /// The prefix with one trailing slash removed, or `""` when unset
    #[must_use]
    pub fn normalized_prefix(&self) -> &str {
        let prefix = self.prefix.as_deref().unwrap_or_default();
        prefix.strip_suffix('/').unwrap_or(prefix)
    }
}
