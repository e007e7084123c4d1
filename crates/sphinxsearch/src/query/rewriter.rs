//! Predicate rewriting for the SphinxQL dialect.
//!
//! Some predicates cannot be expressed with plain comparisons against a
//! search index:
//!
//! - `field__search` becomes a scoped `MATCH()` term.
//! - Multi-value attributes need function forms: `IN(tags, ...)` for
//!   membership and equality, `LEAST(tags)` / `GREATEST(tags)` for ranges.
//! - Inequality must be written `col <> ?`; the engine rejects
//!   `NOT (col = ?)`. Full-text fields are referenced with the attribute
//!   marker (`@title`).
//!
//! Everything else passes through to the base query unchanged.

use crate::error::{QueryError, QueryResult};
use crate::types::{FieldDescriptor, LookupOp, LookupValue};

use super::fragment::{RawFragment, SqlParam, placeholders};
use super::matching::{MatchScope, MatchTerms};
use super::state::QueryState;

/// A resolved filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<'a> {
    /// The target field.
    pub field: &'a FieldDescriptor,
    /// The operator.
    pub op: LookupOp,
    /// The right-hand side.
    pub value: LookupValue,
}

impl<'a> Predicate<'a> {
    /// Creates a predicate.
    pub fn new(field: &'a FieldDescriptor, op: LookupOp, value: LookupValue) -> Self {
        Self { field, op, value }
    }
}

/// The result of rewriting a single predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewritten<'a> {
    /// The predicate became a raw fragment.
    Fragment(RawFragment),
    /// The predicate became match terms.
    Match {
        /// Match scope (the field).
        scope: MatchScope,
        /// Terms to union into the scope.
        terms: MatchTerms,
    },
    /// The predicate needs no rewriting.
    PassThrough(Predicate<'a>),
}

/// Whether [`PredicateRewriter::apply`] consumed the predicate.
#[derive(Debug, Clone)]
pub enum Outcome<'a> {
    /// Fully handled; the returned state carries the rewrite.
    Consumed(QueryState),
    /// Must be compiled by the base query.
    PassThrough(Predicate<'a>),
}

/// Rewrites predicates the base query cannot express.
#[derive(Debug, Clone, Copy)]
pub struct PredicateRewriter<'c> {
    attribute_marker: &'c str,
}

impl<'c> PredicateRewriter<'c> {
    /// Creates a rewriter. `attribute_marker` prefixes full-text field
    /// references in inequality rewrites.
    pub fn new(attribute_marker: &'c str) -> Self {
        Self { attribute_marker }
    }

    /// Rewrites `predicate` and folds the result into a new copy of `state`.
    pub fn apply<'a>(&self, predicate: Predicate<'a>, state: &QueryState) -> QueryResult<Outcome<'a>> {
        Ok(match self.rewrite(predicate)? {
            Rewritten::Fragment(fragment) => Outcome::Consumed(state.with_fragment(fragment)),
            Rewritten::Match { scope, terms } => Outcome::Consumed(state.with_match(scope, terms)),
            Rewritten::PassThrough(predicate) => Outcome::PassThrough(predicate),
        })
    }

    /// Rewrites `predicate` without touching any state.
    ///
    /// Rules apply in precedence order: `search`, then multi-value
    /// attributes, then `notequal`.
    pub fn rewrite<'a>(&self, predicate: Predicate<'a>) -> QueryResult<Rewritten<'a>> {
        let field = predicate.field;

        if predicate.op == LookupOp::Search {
            let terms = match_terms(field, predicate.value)?;
            tracing::debug!(field = %field.name, "Rewrote search lookup into MATCH()");
            return Ok(Rewritten::Match {
                scope: MatchScope::Field(field.storage_column().to_string()),
                terms,
            });
        }

        if field.is_multi_value() {
            let fragment = self.rewrite_multi_value(field, predicate.op, predicate.value)?;
            tracing::debug!(
                field = %field.name,
                lookup = %predicate.op,
                sql = %fragment.sql,
                "Rewrote multi-value lookup"
            );
            return Ok(Rewritten::Fragment(fragment));
        }

        if predicate.op == LookupOp::NotEqual {
            let column = if field.is_full_text() {
                format!("{}{}", self.attribute_marker, field.name)
            } else {
                field.storage_column().to_string()
            };
            let param = single(field, predicate.op, &predicate.value)?;
            tracing::debug!(field = %field.name, column = %column, "Rewrote inequality");
            return Ok(Rewritten::Fragment(RawFragment::with_params(
                format!("{} <> ?", column),
                vec![param],
            )));
        }

        tracing::trace!(field = %field.name, lookup = %predicate.op, "Passing lookup through");
        Ok(Rewritten::PassThrough(predicate))
    }

    fn rewrite_multi_value(
        &self,
        field: &FieldDescriptor,
        op: LookupOp,
        value: LookupValue,
    ) -> QueryResult<RawFragment> {
        let column = field.storage_column();

        if op == LookupOp::In {
            let params = value
                .into_values()
                .iter()
                .map(|v| v.prep_for(field))
                .collect::<QueryResult<Vec<_>>>()?;
            if params.is_empty() {
                return Err(QueryError::InvalidValue {
                    field: field.name.clone(),
                    message: "'in' requires at least one value".to_string(),
                });
            }
            return Ok(RawFragment::with_params(
                format!("IN({}, {})", column, placeholders(params.len())),
                params,
            ));
        }

        let template = match op {
            LookupOp::Exact => format!("IN({}, ?)", column),
            LookupOp::Gte => format!("LEAST({}) >= ?", column),
            LookupOp::Gt => format!("LEAST({}) > ?", column),
            LookupOp::Lt => format!("GREATEST({}) < ?", column),
            LookupOp::Lte => format!("GREATEST({}) <= ?", column),
            _ => {
                return Err(QueryError::UnsupportedLookup {
                    field: field.name.clone(),
                    lookup: op.to_string(),
                });
            }
        };
        let param = single(field, op, &value)?;
        Ok(RawFragment::with_params(template, vec![param]))
    }
}

/// Coerces the single value of a scalar lookup.
fn single(field: &FieldDescriptor, op: LookupOp, value: &LookupValue) -> QueryResult<SqlParam> {
    value
        .as_scalar()
        .ok_or_else(|| QueryError::InvalidValue {
            field: field.name.clone(),
            message: format!("'{}' expects a single value", op),
        })?
        .prep_for(field)
}

/// Converts a `search` value into match terms.
fn match_terms(field: &FieldDescriptor, value: LookupValue) -> QueryResult<MatchTerms> {
    value
        .into_values()
        .iter()
        .map(|v| {
            v.as_match_text().ok_or_else(|| QueryError::InvalidValue {
                field: field.name.clone(),
                message: format!("{:?} cannot be used as match text", v),
            })
        })
        .collect::<QueryResult<Vec<_>>>()
        .map(MatchTerms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttrType, Value};

    const MARKER: &str = "@";

    fn fragment(rewritten: Rewritten<'_>) -> RawFragment {
        match rewritten {
            Rewritten::Fragment(f) => f,
            other => panic!("expected fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_mva_in() {
        let tags = FieldDescriptor::multi32("tags");
        let rewriter = PredicateRewriter::new(MARKER);
        let frag = fragment(
            rewriter
                .rewrite(Predicate::new(&tags, LookupOp::In, vec![1, 2, 3].into()))
                .unwrap(),
        );
        assert_eq!(frag.sql, "IN(tags, ?, ?, ?)");
        assert_eq!(
            frag.params,
            vec![SqlParam::Integer(1), SqlParam::Integer(2), SqlParam::Integer(3)]
        );
    }

    #[test]
    fn test_mva_in_scalar_normalized() {
        let tags = FieldDescriptor::multi64("tags");
        let rewriter = PredicateRewriter::new(MARKER);
        let frag = fragment(
            rewriter
                .rewrite(Predicate::new(&tags, LookupOp::In, 4.into()))
                .unwrap(),
        );
        assert_eq!(frag.sql, "IN(tags, ?)");
        assert_eq!(frag.params.len(), 1);
    }

    #[test]
    fn test_mva_exact_and_ranges() {
        let tags = FieldDescriptor::multi32("tags").with_column("tag_ids");
        let rewriter = PredicateRewriter::new(MARKER);
        let cases = [
            (LookupOp::Exact, "IN(tag_ids, ?)"),
            (LookupOp::Gte, "LEAST(tag_ids) >= ?"),
            (LookupOp::Gt, "LEAST(tag_ids) > ?"),
            (LookupOp::Lt, "GREATEST(tag_ids) < ?"),
            (LookupOp::Lte, "GREATEST(tag_ids) <= ?"),
        ];
        for (op, expected) in cases {
            let frag = fragment(rewriter.rewrite(Predicate::new(&tags, op, 1.into())).unwrap());
            assert_eq!(frag.sql, expected);
            assert_eq!(frag.params, vec![SqlParam::Integer(1)]);
        }
    }

    #[test]
    fn test_mva_notequal_unsupported() {
        let tags = FieldDescriptor::multi32("tags");
        let rewriter = PredicateRewriter::new(MARKER);
        let err = rewriter
            .rewrite(Predicate::new(&tags, LookupOp::NotEqual, 1.into()))
            .unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedLookup { .. }));
    }

    #[test]
    fn test_search_takes_precedence_over_mva() {
        let tags = FieldDescriptor::multi32("tags");
        let rewriter = PredicateRewriter::new(MARKER);
        let rewritten = rewriter
            .rewrite(Predicate::new(&tags, LookupOp::Search, "blue".into()))
            .unwrap();
        assert_eq!(
            rewritten,
            Rewritten::Match {
                scope: MatchScope::Field("tags".to_string()),
                terms: "blue".into(),
            }
        );
    }

    #[test]
    fn test_notequal_plain_column() {
        let status = FieldDescriptor::attribute("status", AttrType::Integer).with_column("status_attr");
        let rewriter = PredicateRewriter::new(MARKER);
        let frag = fragment(
            rewriter
                .rewrite(Predicate::new(&status, LookupOp::NotEqual, "2".into()))
                .unwrap(),
        );
        assert_eq!(frag.sql, "status_attr <> ?");
        assert_eq!(frag.params, vec![SqlParam::Integer(2)]);
    }

    #[test]
    fn test_notequal_full_text_uses_marker() {
        let title = FieldDescriptor::full_text("title");
        let rewriter = PredicateRewriter::new(MARKER);
        let frag = fragment(
            rewriter
                .rewrite(Predicate::new(&title, LookupOp::NotEqual, "draft".into()))
                .unwrap(),
        );
        assert_eq!(frag.sql, "@title <> ?");
        assert_eq!(frag.params, vec![SqlParam::string("draft")]);
    }

    #[test]
    fn test_passthrough() {
        let price = FieldDescriptor::attribute("price", AttrType::Float);
        let rewriter = PredicateRewriter::new(MARKER);
        let predicate = Predicate::new(&price, LookupOp::Gte, Value::Float(5.0).into());
        assert_eq!(
            rewriter.rewrite(predicate.clone()).unwrap(),
            Rewritten::PassThrough(predicate)
        );
    }

    #[test]
    fn test_apply_consumes_into_new_state() {
        let tags = FieldDescriptor::multi32("tags");
        let rewriter = PredicateRewriter::new(MARKER);
        let state = QueryState::new();

        let outcome = rewriter
            .apply(Predicate::new(&tags, LookupOp::Exact, 1.into()), &state)
            .unwrap();
        match outcome {
            Outcome::Consumed(next) => {
                assert_eq!(next.fragments().len(), 1);
                assert!(state.fragments().is_empty());
            }
            Outcome::PassThrough(_) => panic!("expected consumed"),
        }
    }
}
