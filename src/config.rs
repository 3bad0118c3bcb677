//! Resolver configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! # Element id prefix for templates fetched through the element lookup
//! prefix = "tmpl-"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default element id prefix
pub const DEFAULT_PREFIX: &str = "tmpl-";

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Options recognised by [`TemplateResolver`](crate::TemplateResolver)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prepended to a template name to form the element lookup key
    pub prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element id prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Element lookup key for a template name
    pub fn lookup_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}
