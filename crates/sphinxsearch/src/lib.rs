//! SphinxQL query builder
//!
//! This crate turns Django-style filter chains into SphinxQL statements for
//! Sphinx and Manticore search daemons. It produces statement text and bound
//! parameters; executing them is left to a [`StatementExecutor`].
//!
//! # Features
//!
//! - **Lookups**: `field__operator` keys (`exact`, `gt`, `gte`, `lt`, `lte`, `in`, `search`)
//! - **Multi-value attributes**: `IN()`, `LEAST()` and `GREATEST()` rewrites
//! - **Full-text matching**: scoped and unscoped terms merged into one bound `MATCH(?)`
//! - **Negation**: `exclude` rewrites operators into their inverses
//! - **Options**: ordered, last-write-wins `OPTION` clause
//! - **Immutable chaining**: every call returns a new query; bases can be reused
//!
//! # Architecture
//!
//! - [`types`] - Field descriptors, values and lookup operators
//! - [`schema`] - Index schemas and the [`LookupProvider`] trait
//! - [`config`] - Query-building configuration
//! - [`query`] - Resolution, rewriting, state and compilation
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```
//! use sphinxsearch::{IndexSchema, SearchIndex};
//! use sphinxsearch::config::SearchConfig;
//! use sphinxsearch::query::SqlParam;
//! use sphinxsearch::types::{AttrType, FieldDescriptor};
//!
//! let schema = IndexSchema::builder("products")
//!     .field(FieldDescriptor::full_text("title"))
//!     .field(FieldDescriptor::attribute("price", AttrType::Integer))
//!     .field(FieldDescriptor::multi32("tags"))
//!     .build()?;
//!
//! let index = SearchIndex::new(schema, SearchConfig::default())?;
//!
//! let stmt = index
//!     .query()?
//!     .filter([("price__gt", 100)])?
//!     .filter([("tags", 7)])?
//!     .match_text("phone")
//!     .options([("ranker", "bm25")])?
//!     .compile()?;
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT id, price, tags FROM products \
//!      WHERE price > ? AND IN(tags, ?) AND MATCH(?) OPTION ranker='bm25'"
//! );
//! assert_eq!(
//!     stmt.params,
//!     vec![SqlParam::Integer(100), SqlParam::Integer(7), SqlParam::string("phone")]
//! );
//! # Ok::<(), sphinxsearch::QueryError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod query;
pub mod schema;
pub mod types;

// Re-export commonly used types at crate root
pub use config::SearchConfig;
pub use error::{ConfigError, QueryError, QueryResult};
pub use query::{
    CompiledStatement, Filter, QueryMutator, QueryState, SearchIndex, SearchQuerySet,
    StatementExecutor,
};
pub use schema::{IndexSchema, LookupProvider};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
