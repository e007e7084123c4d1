//! Query-building configuration.
//!
//! # Example
//!
//! ```
//! use sphinxsearch::config::SearchConfig;
//!
//! let config = SearchConfig::builder()
//!     .with_default_limit(20)
//!     .with_default_option("ranker", "sph04")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.default_limit, Some(20));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, QueryResult};
use crate::query::{OptionSet, OptionValue};
use crate::schema::is_identifier;

/// Default prefix for full-text field references.
pub const DEFAULT_ATTRIBUTE_MARKER: &str = "@";

/// Default primary-key placeholder token.
pub const DEFAULT_PK_ALIAS: &str = "pk";

/// Default upper bound for LIMIT, matching the engine's default `max_matches`.
pub const DEFAULT_MAX_LIMIT: usize = 1000;

/// Settings shared by every query built from one [`SearchIndex`](crate::SearchIndex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Prefix for full-text field references in inequality rewrites.
    pub attribute_marker: String,

    /// Token that always resolves to the document id field.
    pub primary_key_alias: String,

    /// LIMIT applied when a query sets none.
    pub default_limit: Option<usize>,

    /// Upper bound for any requested LIMIT; larger requests are clamped.
    pub max_limit: usize,

    /// Options seeded into every new query, in order.
    pub default_options: Vec<(String, OptionValue)>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            attribute_marker: DEFAULT_ATTRIBUTE_MARKER.to_string(),
            primary_key_alias: DEFAULT_PK_ALIAS.to_string(),
            default_limit: None,
            max_limit: DEFAULT_MAX_LIMIT,
            default_options: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Creates a builder starting from defaults.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Parses and validates a JSON configuration document. Missing keys take
    /// their default values.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        let config: SearchConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> QueryResult<()> {
        if self.attribute_marker.is_empty()
            || self
                .attribute_marker
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '?' | '\'' | '\\'))
        {
            return Err(invalid(
                "attribute_marker",
                format!("'{}' is not a usable marker", self.attribute_marker),
            ));
        }

        if !is_identifier(&self.primary_key_alias) {
            return Err(invalid(
                "primary_key_alias",
                format!("'{}' is not an identifier", self.primary_key_alias),
            ));
        }

        if self.max_limit == 0 {
            return Err(invalid("max_limit", "must be greater than zero".to_string()));
        }

        if let Some(limit) = self.default_limit {
            if limit > self.max_limit {
                return Err(invalid(
                    "default_limit",
                    format!("{} exceeds max_limit {}", limit, self.max_limit),
                ));
            }
        }

        self.option_set().map(|_| ())
    }

    /// Builds the option set seeded into new queries.
    pub fn option_set(&self) -> QueryResult<OptionSet> {
        let mut options = OptionSet::new();
        for (name, value) in &self.default_options {
            options.set(name.clone(), value.clone())?;
        }
        Ok(options)
    }

    /// Clamps a requested LIMIT to `max_limit`.
    pub fn clamp_limit(&self, requested: usize) -> usize {
        if requested > self.max_limit {
            tracing::warn!(
                requested,
                max_limit = self.max_limit,
                "Clamping LIMIT to max_limit"
            );
            self.max_limit
        } else {
            requested
        }
    }
}

fn invalid(setting: &str, message: String) -> crate::error::QueryError {
    ConfigError::Invalid {
        setting: setting.to_string(),
        message,
    }
    .into()
}

/// Builder for [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full-text attribute marker.
    pub fn with_attribute_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.attribute_marker = marker.into();
        self
    }

    /// Sets the primary-key placeholder token.
    pub fn with_primary_key_alias(mut self, alias: impl Into<String>) -> Self {
        self.config.primary_key_alias = alias.into();
        self
    }

    /// Sets the default LIMIT.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = Some(limit);
        self
    }

    /// Sets the LIMIT upper bound.
    pub fn with_max_limit(mut self, max: usize) -> Self {
        self.config.max_limit = max;
        self
    }

    /// Adds a default option.
    pub fn with_default_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.config.default_options.push((name.into(), value.into()));
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> QueryResult<SearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
