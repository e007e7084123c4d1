//! Copy-on-write query state.
//!
//! [`QueryState`] holds everything the engine dialect needs beyond the base
//! predicate chain: raw fragments from rewritten predicates, match terms and
//! options. Each component sits behind an [`Arc`]; mutators clone the state
//! and then use [`Arc::make_mut`], so a derived state copies only the
//! component it changes and the original is never modified.

use std::sync::Arc;

use crate::error::QueryResult;

use super::fragment::RawFragment;
use super::matching::{MatchExpression, MatchScope, MatchTerms};
use super::options::{OptionSet, OptionValue};

/// Engine-specific state attached to a query.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    fragments: Arc<Vec<RawFragment>>,
    matches: Arc<MatchExpression>,
    options: Arc<OptionSet>,
    negations: usize,
}

impl QueryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state seeded with `options`.
    pub fn with_default_options(options: OptionSet) -> Self {
        Self {
            options: Arc::new(options),
            ..Self::default()
        }
    }

    /// Returns a new state with `fragment` ANDed after existing fragments.
    pub fn with_fragment(&self, fragment: RawFragment) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.fragments).push(fragment);
        next
    }

    /// Returns a new state with `terms` unioned into `scope`.
    pub fn with_match(&self, scope: MatchScope, terms: MatchTerms) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.matches).add(scope, terms);
        next
    }

    /// Returns a new state with the option set (last write wins).
    pub fn with_option(&self, name: impl Into<String>, value: OptionValue) -> QueryResult<Self> {
        let mut next = self.clone();
        Arc::make_mut(&mut next.options).set(name, value)?;
        Ok(next)
    }

    /// Returns a new state that records one more negated lookup.
    pub fn with_negation(&self) -> Self {
        let mut next = self.clone();
        next.negations += 1;
        next
    }

    /// Raw fragments in insertion order.
    pub fn fragments(&self) -> &[RawFragment] {
        &self.fragments
    }

    /// Accumulated match terms.
    pub fn matches(&self) -> &MatchExpression {
        &self.matches
    }

    /// Accumulated options.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Number of lookups rewritten through negation.
    pub fn negations(&self) -> usize {
        self.negations
    }
}
