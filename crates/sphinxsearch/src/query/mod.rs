//! SphinxQL query construction.
//!
//! - [`resolver`] - Splits `field__operator` keys and resolves them against a schema
//! - [`rewriter`] - Rewrites predicates the base query cannot express
//! - [`matching`] - Accumulates and serializes `MATCH()` expressions
//! - [`options`] - The `OPTION` clause
//! - [`state`] - Copy-on-write search state
//! - [`base`] - The base relational query and the [`QueryMutator`] seam
//! - [`compiler`] - Assembles the final statement
//! - [`queryset`] - The chainable public API
//!
//! # Pipeline
//!
//! ```text
//! filter("tags__in", [1, 2])
//!   └── LookupResolver       -> (tags: mva32, in)
//!   └── PredicateRewriter    -> Consumed: IN(tags, ?, ?)
//!         └── QueryState     -> new state with one more fragment
//!
//! compile()
//!   └── StatementCompiler    -> SELECT ... WHERE <base> AND <fragments> AND MATCH(?) ... OPTION ...
//! ```

pub mod base;
pub mod compiler;
pub mod fragment;
pub mod matching;
pub mod options;
pub mod queryset;
pub mod resolver;
pub mod rewriter;
pub mod state;

pub use base::{BaseQuery, Condition, OrderTerm, QueryMutator};
pub use compiler::{CompiledStatement, StatementCompiler};
pub use fragment::{RawFragment, SqlParam};
pub use matching::{MatchExpression, MatchScope, MatchTerms};
pub use options::{OptionSet, OptionValue};
pub use queryset::{Filter, SearchIndex, SearchQuerySet, StatementExecutor};
pub use resolver::{LookupKey, LookupResolver};
pub use rewriter::{Outcome, Predicate, PredicateRewriter, Rewritten};
pub use state::QueryState;
