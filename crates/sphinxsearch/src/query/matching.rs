//! Full-text `MATCH()` clause accumulation.
//!
//! Match expressions are grouped by scope: either unscoped, or limited to a
//! single full-text field with the `@field` operator. Repeated calls union
//! their terms into the existing scope, so `match(a) + match(b)` and
//! `match(a, b)` serialize identically.
//!
//! The serialized expression is bound as a single parameter to `MATCH(?)`;
//! it is never interpolated into the statement text.

use std::fmt;

/// Scope of a match expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchScope {
    /// Matches across all full-text fields.
    Unscoped,
    /// Matches only within the named field.
    Field(String),
}

impl fmt::Display for MatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchScope::Unscoped => write!(f, "*"),
            MatchScope::Field(name) => write!(f, "@{}", name),
        }
    }
}

/// One or more match terms, as passed to a `match` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTerms(pub Vec<String>);

impl From<&str> for MatchTerms {
    fn from(s: &str) -> Self {
        MatchTerms(vec![s.to_string()])
    }
}

impl From<String> for MatchTerms {
    fn from(s: String) -> Self {
        MatchTerms(vec![s])
    }
}

impl From<Vec<&str>> for MatchTerms {
    fn from(terms: Vec<&str>) -> Self {
        MatchTerms(terms.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for MatchTerms {
    fn from(terms: Vec<String>) -> Self {
        MatchTerms(terms)
    }
}

impl<const N: usize> From<[&str; N]> for MatchTerms {
    fn from(terms: [&str; N]) -> Self {
        MatchTerms(terms.into_iter().map(str::to_string).collect())
    }
}

/// Accumulated match terms per scope, in first-insertion order.
///
/// Within a scope terms are distinct and keep their insertion order. Terms
/// are only ever added, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchExpression {
    scopes: Vec<(MatchScope, Vec<String>)>,
}

impl MatchExpression {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `terms` into `scope`. Empty terms are skipped; a scope is only
    /// created once it receives a term. Returns how many new terms were added.
    pub fn add(&mut self, scope: MatchScope, terms: MatchTerms) -> usize {
        let mut added = 0;
        for term in terms.0 {
            if term.is_empty() {
                tracing::warn!(scope = %scope, "Ignoring empty match expression");
                continue;
            }
            let slot = match self.scopes.iter().position(|(s, _)| *s == scope) {
                Some(i) => &mut self.scopes[i].1,
                None => {
                    self.scopes.push((scope.clone(), Vec::new()));
                    let last = self.scopes.len() - 1;
                    &mut self.scopes[last].1
                }
            };
            if !slot.contains(&term) {
                slot.push(term);
                added += 1;
            }
        }
        added
    }

    /// Returns the terms accumulated for `scope`.
    pub fn terms(&self, scope: &MatchScope) -> &[String] {
        self.scopes
            .iter()
            .find(|(s, _)| s == scope)
            .map(|(_, terms)| terms.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true if no terms have been added.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Serializes the expression into the string bound to `MATCH(?)`.
    ///
    /// Quotes and backslashes inside terms are escaped before assembly.
    pub fn to_query_string(&self) -> Option<String> {
        if self.scopes.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .scopes
            .iter()
            .map(|(scope, terms)| {
                let joined = terms
                    .iter()
                    .map(|t| escape_text(t))
                    .collect::<Vec<_>>()
                    .join(" ");
                match scope {
                    MatchScope::Unscoped => joined,
                    MatchScope::Field(name) => format!("@{} {}", name, joined),
                }
            })
            .collect();
        Some(parts.join(" "))
    }
}

/// Backslash-escapes single quotes and backslashes.
pub fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\'' | '\\') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> MatchScope {
        MatchScope::Field(name.to_string())
    }

    #[test]
    fn test_unscoped_join() {
        let mut expr = MatchExpression::new();
        expr.add(MatchScope::Unscoped, ["hello", "world"].into());
        assert_eq!(expr.to_query_string().unwrap(), "hello world");
    }

    #[test]
    fn test_scoped_serialization_order() {
        let mut expr = MatchExpression::new();
        expr.add(field("title"), "rust".into());
        expr.add(MatchScope::Unscoped, "fast".into());
        expr.add(field("body"), ["safe", "systems"].into());

        assert_eq!(
            expr.to_query_string().unwrap(),
            "@title rust fast @body safe systems"
        );
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut once = MatchExpression::new();
        once.add(field("a"), ["x", "y"].into());

        let mut twice = MatchExpression::new();
        twice.add(field("a"), "x".into());
        twice.add(field("a"), "y".into());
        assert_eq!(twice.add(field("a"), "x".into()), 0);

        assert_eq!(once.to_query_string(), twice.to_query_string());
        assert_eq!(twice.terms(&field("a")), ["x", "y"]);
    }

    #[test]
    fn test_escaping() {
        let mut expr = MatchExpression::new();
        expr.add(MatchScope::Unscoped, "it's a \\ test".into());
        assert_eq!(expr.to_query_string().unwrap(), "it\\'s a \\\\ test");
    }

    #[test]
    fn test_empty_terms_create_no_scope() {
        let mut expr = MatchExpression::new();
        assert_eq!(expr.add(field("title"), MatchTerms::default()), 0);
        assert_eq!(expr.add(field("title"), "".into()), 0);
        assert!(expr.is_empty());
        assert!(expr.to_query_string().is_none());
    }
}
