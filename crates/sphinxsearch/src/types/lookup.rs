//! Lookup operators.
//!
//! A lookup key has the form `field__operator`. The operator names follow the
//! familiar ORM vocabulary; `notequal` exists because the engine rejects the
//! negated-equality form `NOT (a = b)`.

use std::fmt;

/// The separator between field name and operator in a lookup key.
pub const LOOKUP_SEP: &str = "__";

/// A filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOp {
    /// Equality (the default operator).
    Exact,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Set membership.
    In,
    /// Full-text search on the field, routed to `MATCH()`.
    Search,
    /// Inequality, rendered as `<>`.
    NotEqual,
}

impl LookupOp {
    /// All operators, in declaration order.
    pub const ALL: [LookupOp; 8] = [
        LookupOp::Exact,
        LookupOp::Gt,
        LookupOp::Gte,
        LookupOp::Lt,
        LookupOp::Lte,
        LookupOp::In,
        LookupOp::Search,
        LookupOp::NotEqual,
    ];

    /// Parses an operator name, returning None for unknown operators.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(LookupOp::Exact),
            "gt" => Some(LookupOp::Gt),
            "gte" => Some(LookupOp::Gte),
            "lt" => Some(LookupOp::Lt),
            "lte" => Some(LookupOp::Lte),
            "in" => Some(LookupOp::In),
            "search" => Some(LookupOp::Search),
            "notequal" => Some(LookupOp::NotEqual),
            _ => None,
        }
    }

    /// Returns the operator name as used in lookup keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOp::Exact => "exact",
            LookupOp::Gt => "gt",
            LookupOp::Gte => "gte",
            LookupOp::Lt => "lt",
            LookupOp::Lte => "lte",
            LookupOp::In => "in",
            LookupOp::Search => "search",
            LookupOp::NotEqual => "notequal",
        }
    }

    /// Returns the operator that selects exactly the complement of this one.
    ///
    /// Only comparison operators and equality have an inverse; `in`,
    /// `search` and `notequal` return None.
    pub fn negated(&self) -> Option<Self> {
        match self {
            LookupOp::Gte => Some(LookupOp::Lt),
            LookupOp::Gt => Some(LookupOp::Lte),
            LookupOp::Lt => Some(LookupOp::Gte),
            LookupOp::Lte => Some(LookupOp::Gt),
            LookupOp::Exact => Some(LookupOp::NotEqual),
            LookupOp::In | LookupOp::Search | LookupOp::NotEqual => None,
        }
    }

    /// Returns the SQL comparison operator for plain attribute comparisons.
    pub fn to_sql_op(&self) -> Option<&'static str> {
        match self {
            LookupOp::Exact => Some("="),
            LookupOp::Gt => Some(">"),
            LookupOp::Gte => Some(">="),
            LookupOp::Lt => Some("<"),
            LookupOp::Lte => Some("<="),
            LookupOp::NotEqual => Some("<>"),
            LookupOp::In | LookupOp::Search => None,
        }
    }
}

impl fmt::Display for LookupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
