//! SQL fragments with positional parameters.
//!
//! SphinxQL speaks the MySQL wire protocol, so bound values use the
//! positional `?` placeholder and are numbered implicitly by position.

use std::fmt;

use crate::error::{QueryError, QueryResult};

/// The positional placeholder marker.
pub const PLACEHOLDER: char = '?';

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Signed integer parameter.
    Integer(i64),
    /// Unsigned integer parameter (document ids above `i64::MAX`).
    Unsigned(u64),
    /// Float parameter.
    Float(f64),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a float parameter.
    pub fn float(f: f64) -> Self {
        SqlParam::Float(f)
    }
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::String(s) => write!(f, "'{}'", s),
            SqlParam::Integer(i) => write!(f, "{}", i),
            SqlParam::Unsigned(u) => write!(f, "{}", u),
            SqlParam::Float(x) => write!(f, "{}", x),
            SqlParam::Null => write!(f, "NULL"),
        }
    }
}

/// A conditional expression with positional placeholders and the values
/// bound to them, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    /// The SQL template.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

impl RawFragment {
    /// Creates a fragment with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Counts the placeholders in the template, ignoring any that appear
    /// inside single-quoted literals.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut in_literal = false;
        let mut escaped = false;

        for c in self.sql.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_literal => escaped = true,
                '\'' => in_literal = !in_literal,
                PLACEHOLDER if !in_literal => count += 1,
                _ => {}
            }
        }
        count
    }

    /// Checks that the template binds exactly as many placeholders as there
    /// are parameters.
    pub fn validate(&self) -> QueryResult<()> {
        let placeholders = self.placeholder_count();
        if placeholders != self.params.len() {
            return Err(QueryError::MalformedFragment {
                template: self.sql.clone(),
                placeholders,
                params: self.params.len(),
            });
        }
        Ok(())
    }

    /// Combines with another fragment using AND.
    pub fn and(mut self, other: RawFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("{} AND {}", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Combines with another fragment using OR. Operands are parenthesized.
    pub fn or(mut self, other: RawFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) OR ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Renders `count` comma-separated placeholders.
pub fn placeholders(count: usize) -> String {
    vec![PLACEHOLDER.to_string(); count].join(", ")
}
