//! The `OPTION` clause.
//!
//! Options are per-query engine directives such as `ranker`, `max_matches`
//! or `field_weights`. Setting a key twice keeps the last value but the
//! key's original position, so serialization is deterministic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::schema::is_identifier;

use super::matching::escape_text;

/// The value of a single option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean, rendered as `1` or `0`.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String, rendered single-quoted.
    Str(String),
    /// Named weights, rendered as `(name=weight, ...)`.
    Weights(Vec<(String, i64)>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(x) => write!(f, "{}", x),
            OptionValue::Str(s) => write!(f, "'{}'", escape_text(s)),
            OptionValue::Weights(weights) => {
                let parts: Vec<String> = weights
                    .iter()
                    .map(|(name, weight)| format!("{}={}", name, weight))
                    .collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        OptionValue::Int(i64::from(i))
    }
}

impl From<u32> for OptionValue {
    fn from(i: u32) -> Self {
        OptionValue::Int(i64::from(i))
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<Vec<(&str, i64)>> for OptionValue {
    fn from(weights: Vec<(&str, i64)>) -> Self {
        OptionValue::Weights(
            weights
                .into_iter()
                .map(|(name, weight)| (name.to_string(), weight))
                .collect(),
        )
    }
}

/// Ordered option set with last-write-wins semantics per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    entries: Vec<(String, OptionValue)>,
}

impl OptionSet {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, overwriting any earlier value for the same key.
    pub fn set(&mut self, name: impl Into<String>, value: OptionValue) -> QueryResult<()> {
        let name = name.into();
        validate_option(&name, &value)?;

        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
        Ok(())
    }

    /// Returns the value for `name`.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns true if no options are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct option keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates options in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the `OPTION` clause, or None when empty.
    pub fn to_sql(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(format!("OPTION {}", parts.join(", ")))
    }
}

fn validate_option(name: &str, value: &OptionValue) -> QueryResult<()> {
    if !is_identifier(name) {
        return Err(QueryError::InvalidOption {
            name: name.to_string(),
        });
    }
    if let OptionValue::Weights(weights) = value {
        if let Some((bad, _)) = weights.iter().find(|(n, _)| !is_identifier(n)) {
            return Err(QueryError::InvalidOption {
                name: format!("{}.{}", name, bad),
            });
        }
    }
    Ok(())
}
