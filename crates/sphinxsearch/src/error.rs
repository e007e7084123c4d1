//! Error types for query building.
//!
//! Every caller-facing failure surfaces synchronously from the filter call
//! that caused it. The only exception is [`QueryError::MalformedFragment`],
//! which is raised by the statement compiler and points at a rewriting defect
//! rather than at caller misuse.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all query-building operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The lookup key is syntactically malformed (e.g. nested lookups).
    #[error("invalid lookup '{key}': {message}")]
    InvalidLookup { key: String, message: String },

    /// The field named in a lookup is not declared in the index schema.
    #[error("unknown field '{field}' on index '{index}'")]
    UnknownField { index: String, field: String },

    /// The operator is not valid for the field's kind.
    #[error("unsupported lookup '{lookup}' for field '{field}'")]
    UnsupportedLookup { field: String, lookup: String },

    /// The operator has no inverse and cannot be negated.
    #[error("negated filters are not supported for lookup '{lookup}' on '{field}'")]
    UnsupportedNegation { field: String, lookup: String },

    /// A compound (AND/OR) expression was passed to a negation.
    #[error("compound expressions cannot be negated ({count} given)")]
    CompoundNegationUnsupported { count: usize },

    /// A raw fragment's placeholder count does not match its parameters.
    #[error(
        "malformed fragment '{template}': {placeholders} placeholders for {params} parameters"
    )]
    MalformedFragment {
        template: String,
        placeholders: usize,
        params: usize,
    },

    /// A value could not be coerced to the field's attribute type.
    #[error("invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// An OPTION name is not a plain identifier.
    #[error("invalid option name '{name}'")]
    InvalidOption { name: String },

    /// Configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A failure reported by the external statement executor.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl QueryError {
    /// Returns true if this error reflects caller misuse of the filter API
    /// rather than an internal defect or an executor failure.
    pub fn is_caller_error(&self) -> bool {
        !matches!(
            self,
            QueryError::MalformedFragment { .. } | QueryError::Execution(_)
        )
    }
}

/// Errors raised while loading or validating a [`SearchConfig`](crate::config::SearchConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse search config: {0}")]
    Parse(String),

    /// The configuration parsed but holds an invalid setting.
    #[error("invalid search config: {setting}: {message}")]
    Invalid { setting: String, message: String },
}

/// Result type alias for query-building operations.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_lookup_display() {
        let err = QueryError::InvalidLookup {
            key: "price__gte__x".to_string(),
            message: "nested lookups not supported".to_string(),
        };
        assert!(err.to_string().contains("price__gte__x"));
        assert!(err.to_string().contains("nested"));
    }

    #[test]
    fn test_malformed_fragment_display() {
        let err = QueryError::MalformedFragment {
            template: "IN(tags, ?)".to_string(),
            placeholders: 1,
            params: 2,
        };
        assert!(err.to_string().contains("1 placeholders for 2 parameters"));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: QueryError = ConfigError::Invalid {
            setting: "max_limit".to_string(),
            message: "must be positive".to_string(),
        }
        .into();
        assert!(matches!(err, QueryError::Config(_)));
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("max_limit"));
    }
}
