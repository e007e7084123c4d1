//! Chainable search queries.
//!
//! [`SearchIndex`] binds a schema to a configuration and hands out
//! [`SearchQuerySet`]s. Every query method returns a new, independently
//! usable query; the receiver is never modified, so a base query can be
//! reused across branches or shared between threads.

use std::fmt;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::{QueryError, QueryResult};
use crate::schema::LookupProvider;
use crate::types::{LookupOp, LookupValue};

use super::base::{BaseQuery, Condition, OrderTerm, QueryMutator};
use super::compiler::{CompiledStatement, StatementCompiler};
use super::matching::{MatchScope, MatchTerms};
use super::options::OptionValue;
use super::resolver::{LookupKey, LookupResolver};
use super::rewriter::{Outcome, Predicate, PredicateRewriter, Rewritten};
use super::state::QueryState;

/// A filter expression: a single lookup or an AND/OR tree of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `key = value`, where key is `field` or `field__operator`.
    Lookup {
        /// Lookup key.
        key: String,
        /// Right-hand side.
        value: LookupValue,
    },
    /// All sub-filters must hold.
    All(Vec<Filter>),
    /// At least one sub-filter must hold.
    Any(Vec<Filter>),
}

impl Filter {
    /// Creates a single lookup.
    pub fn lookup(key: impl Into<String>, value: impl Into<LookupValue>) -> Self {
        Filter::Lookup {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates an AND group.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::All(filters.into_iter().collect())
    }

    /// Creates an OR group.
    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Any(filters.into_iter().collect())
    }

    /// Returns true for AND/OR groups.
    pub fn is_compound(&self) -> bool {
        !matches!(self, Filter::Lookup { .. })
    }
}

/// Executes compiled statements against a search daemon.
///
/// Connection handling, retries and timeouts belong to the implementor.
pub trait StatementExecutor {
    /// Row type produced by the executor.
    type Row;
    /// Error type produced by the executor.
    type Error: fmt::Display;

    /// Executes `statement` and returns its rows.
    fn execute(&self, statement: &CompiledStatement) -> Result<Vec<Self::Row>, Self::Error>;
}

/// A search index: schema plus configuration.
#[derive(Clone)]
pub struct SearchIndex {
    provider: Arc<dyn LookupProvider>,
    config: Arc<SearchConfig>,
}

impl fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("index", &self.provider.index_name())
            .field("config", &self.config)
            .finish()
    }
}

impl SearchIndex {
    /// Creates an index handle, validating the configuration.
    pub fn new(provider: impl LookupProvider + 'static, config: SearchConfig) -> QueryResult<Self> {
        config.validate()?;
        Ok(Self {
            provider: Arc::new(provider),
            config: Arc::new(config),
        })
    }

    /// Returns the schema.
    pub fn provider(&self) -> &dyn LookupProvider {
        self.provider.as_ref()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Starts a query over this index using [`BaseQuery`].
    ///
    /// Full-text fields are left out of the SELECT list since the engine
    /// does not return them.
    pub fn query(&self) -> QueryResult<SearchQuerySet> {
        let columns = self
            .provider
            .fields()
            .iter()
            .filter(|f| !f.is_full_text())
            .map(|f| f.storage_column().to_string())
            .collect();
        let base = BaseQuery::new(self.provider.index_name(), columns);
        self.query_with(base)
    }

    /// Starts a query on top of a caller-supplied base query.
    pub fn query_with<B: QueryMutator>(&self, base: B) -> QueryResult<SearchQuerySet<B>> {
        let base = base.with_limits(0, self.config.default_limit);
        Ok(SearchQuerySet {
            provider: Arc::clone(&self.provider),
            config: Arc::clone(&self.config),
            base,
            state: QueryState::with_default_options(self.config.option_set()?),
            offset: 0,
            limit: self.config.default_limit,
        })
    }
}

/// An immutable, chainable search query.
#[derive(Clone)]
pub struct SearchQuerySet<B: QueryMutator = BaseQuery> {
    provider: Arc<dyn LookupProvider>,
    config: Arc<SearchConfig>,
    base: B,
    state: QueryState,
    offset: usize,
    limit: Option<usize>,
}

impl<B: QueryMutator + fmt::Debug> fmt::Debug for SearchQuerySet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuerySet")
            .field("index", &self.provider.index_name())
            .field("base", &self.base)
            .field("state", &self.state)
            .finish()
    }
}

impl<B: QueryMutator> SearchQuerySet<B> {
    /// Filters by `field__operator = value` lookups, ANDed together.
    ///
    /// ```
    /// # use sphinxsearch::{IndexSchema, SearchIndex, config::SearchConfig};
    /// # use sphinxsearch::types::{AttrType, FieldDescriptor};
    /// let schema = IndexSchema::builder("products")
    ///     .field(FieldDescriptor::attribute("price", AttrType::Integer))
    ///     .field(FieldDescriptor::multi32("tags"))
    ///     .build()?;
    /// let index = SearchIndex::new(schema, SearchConfig::default())?;
    ///
    /// let stmt = index
    ///     .query()?
    ///     .filter([("price__gte", 10)])?
    ///     .filter([("tags__in", vec![1, 2, 3])])?
    ///     .compile()?;
    ///
    /// assert_eq!(
    ///     stmt.sql,
    ///     "SELECT id, price, tags FROM products WHERE price >= ? AND IN(tags, ?, ?, ?)"
    /// );
    /// # Ok::<(), sphinxsearch::QueryError>(())
    /// ```
    pub fn filter<K, V>(&self, lookups: impl IntoIterator<Item = (K, V)>) -> QueryResult<Self>
    where
        K: AsRef<str>,
        V: Into<LookupValue>,
    {
        let mut next = self.clone();
        for (key, value) in lookups {
            let (field, op) = next.resolver().resolve(key.as_ref())?;
            next = next.apply_predicate(Predicate::new(field, op, value.into()))?;
        }
        Ok(next)
    }

    /// Filters by a single expression, which may be an AND/OR tree.
    ///
    /// Inside a tree, multi-value and inequality lookups are inlined as raw
    /// conditions. `search` lookups cannot be nested.
    pub fn filter_expr(&self, filter: Filter) -> QueryResult<Self> {
        match filter {
            Filter::Lookup { key, value } => self.filter([(key, value)]),
            compound => {
                let condition = self.build_condition(compound)?;
                let mut next = self.clone();
                next.base = next.base.with_condition(condition);
                Ok(next)
            }
        }
    }

    /// Excludes rows matching each lookup.
    ///
    /// Negation is rewritten rather than wrapped in `NOT`: `gte` becomes
    /// `lt`, `gt` becomes `lte`, `lt` becomes `gte`, `lte` becomes `gt` and
    /// equality becomes `notequal`. Other operators fail with
    /// [`QueryError::UnsupportedNegation`].
    pub fn exclude<K, V>(&self, lookups: impl IntoIterator<Item = (K, V)>) -> QueryResult<Self>
    where
        K: AsRef<str>,
        V: Into<LookupValue>,
    {
        let mut next = self.clone();
        for (key, value) in lookups {
            let (field, op) = next.resolver().resolve_negated(key.as_ref())?;
            next = next.apply_predicate(Predicate::new(field, op, value.into()))?;
            next.state = next.state.with_negation();
        }
        Ok(next)
    }

    /// Excludes rows matching each filter. Compound filters are rejected
    /// with [`QueryError::CompoundNegationUnsupported`] before anything is
    /// applied.
    pub fn exclude_expr(&self, filters: impl IntoIterator<Item = Filter>) -> QueryResult<Self> {
        let filters: Vec<Filter> = filters.into_iter().collect();
        let compound = filters.iter().filter(|f| f.is_compound()).count();
        if compound > 0 {
            return Err(QueryError::CompoundNegationUnsupported { count: compound });
        }

        let lookups = filters.into_iter().filter_map(|f| match f {
            Filter::Lookup { key, value } => Some((key, value)),
            Filter::All(_) | Filter::Any(_) => None,
        });
        self.exclude(lookups)
    }

    /// Adds unscoped full-text terms to `MATCH()`.
    pub fn match_text(&self, terms: impl Into<MatchTerms>) -> Self {
        let mut next = self.clone();
        next.state = next.state.with_match(MatchScope::Unscoped, terms.into());
        next
    }

    /// Adds terms scoped to one field (`@field ...`) to `MATCH()`.
    pub fn match_field(&self, field: &str, terms: impl Into<MatchTerms>) -> QueryResult<Self> {
        let descriptor = self.resolver().resolve_field(field)?;
        let scope = MatchScope::Field(descriptor.storage_column().to_string());
        let mut next = self.clone();
        next.state = next.state.with_match(scope, terms.into());
        Ok(next)
    }

    /// Adds unscoped and field-scoped terms in one call. Every field is
    /// resolved before anything is added.
    pub fn match_query<S, T>(
        &self,
        free: impl Into<MatchTerms>,
        scoped: impl IntoIterator<Item = (S, T)>,
    ) -> QueryResult<Self>
    where
        S: AsRef<str>,
        T: Into<MatchTerms>,
    {
        let resolver = self.resolver();
        let scoped = scoped
            .into_iter()
            .map(|(field, terms)| {
                let descriptor = resolver.resolve_field(field.as_ref())?;
                Ok((
                    MatchScope::Field(descriptor.storage_column().to_string()),
                    terms.into(),
                ))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        let mut next = self.match_text(free);
        for (scope, terms) in scoped {
            next.state = next.state.with_match(scope, terms);
        }
        Ok(next)
    }

    /// Adds `column <> ?` conditions. Keys must be plain field names.
    pub fn notequal<K, V>(&self, lookups: impl IntoIterator<Item = (K, V)>) -> QueryResult<Self>
    where
        K: AsRef<str>,
        V: Into<LookupValue>,
    {
        let mut next = self.clone();
        for (key, value) in lookups {
            let key = key.as_ref();
            if LookupKey::parse(key)?.lookup.is_some() {
                return Err(QueryError::InvalidLookup {
                    key: key.to_string(),
                    message: "notequal takes plain field names".to_string(),
                });
            }
            let field = next.resolver().resolve_field(key)?;
            next = next.apply_predicate(Predicate::new(field, LookupOp::NotEqual, value.into()))?;
        }
        Ok(next)
    }

    /// Sets OPTION values; a repeated key keeps its position and takes the
    /// new value.
    pub fn options<K, V>(&self, options: impl IntoIterator<Item = (K, V)>) -> QueryResult<Self>
    where
        K: Into<String>,
        V: Into<OptionValue>,
    {
        let mut next = self.clone();
        for (name, value) in options {
            next.state = next.state.with_option(name, value.into())?;
        }
        Ok(next)
    }

    /// Sets ordering. A leading `-` sorts descending.
    pub fn order_by<S: AsRef<str>>(&self, fields: impl IntoIterator<Item = S>) -> QueryResult<Self> {
        let resolver = self.resolver();
        let mut terms = Vec::new();
        for term in fields {
            let term = term.as_ref();
            let (name, descending) = match term.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (term, false),
            };
            let field = resolver.resolve_field(name)?;
            if field.is_full_text() {
                return Err(QueryError::UnsupportedLookup {
                    field: field.name.clone(),
                    lookup: "order_by".to_string(),
                });
            }
            terms.push(OrderTerm {
                column: field.storage_column().to_string(),
                descending,
            });
        }

        let mut next = self.clone();
        next.base = next.base.with_order_by(terms);
        Ok(next)
    }

    /// Limits the number of rows, clamped to the configured maximum.
    pub fn limit(&self, count: usize) -> Self {
        let mut next = self.clone();
        next.limit = Some(self.config.clamp_limit(count));
        next.base = next.base.with_limits(next.offset, next.limit);
        next
    }

    /// Skips `count` rows. Without an explicit limit the configured maximum
    /// is used as the row count.
    pub fn offset(&self, count: usize) -> Self {
        let mut next = self.clone();
        next.offset = count;
        let limit = next.limit.unwrap_or(self.config.max_limit);
        next.limit = Some(limit);
        next.base = next.base.with_limits(count, Some(limit));
        next
    }

    /// Compiles the query into a statement and ordered parameters.
    pub fn compile(&self) -> QueryResult<CompiledStatement> {
        StatementCompiler::compile(&self.base, &self.state)
    }

    /// Compiles the query and runs it through `executor`.
    pub fn fetch<E: StatementExecutor>(&self, executor: &E) -> QueryResult<Vec<E::Row>> {
        let statement = self.compile()?;
        executor
            .execute(&statement)
            .map_err(|e| QueryError::Execution(e.to_string()))
    }

    /// The engine-specific state.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// The base relational query.
    pub fn base(&self) -> &B {
        &self.base
    }

    fn resolver(&self) -> LookupResolver<'_> {
        LookupResolver::new(self.provider.as_ref(), &self.config.primary_key_alias)
    }

    fn rewriter(&self) -> PredicateRewriter<'_> {
        PredicateRewriter::new(&self.config.attribute_marker)
    }

    fn apply_predicate(&self, predicate: Predicate<'_>) -> QueryResult<Self> {
        let mut next = self.clone();
        match self.rewriter().apply(predicate, &self.state)? {
            Outcome::Consumed(state) => next.state = state,
            Outcome::PassThrough(predicate) => {
                let condition = Condition::compare(predicate.field, predicate.op, predicate.value)?;
                next.base = next.base.with_condition(condition);
            }
        }
        Ok(next)
    }

    fn build_condition(&self, filter: Filter) -> QueryResult<Condition> {
        match filter {
            Filter::Lookup { key, value } => {
                let (field, op) = self.resolver().resolve(&key)?;
                match self.rewriter().rewrite(Predicate::new(field, op, value))? {
                    Rewritten::Fragment(fragment) => Ok(Condition::Raw(fragment)),
                    Rewritten::Match { .. } => Err(QueryError::UnsupportedLookup {
                        field: field.name.clone(),
                        lookup: format!("{} inside a compound filter", op),
                    }),
                    Rewritten::PassThrough(p) => Condition::compare(p.field, p.op, p.value),
                }
            }
            Filter::All(filters) => filters
                .into_iter()
                .map(|f| self.build_condition(f))
                .collect::<QueryResult<Vec<_>>>()
                .map(Condition::All),
            Filter::Any(filters) => filters
                .into_iter()
                .map(|f| self.build_condition(f))
                .collect::<QueryResult<Vec<_>>>()
                .map(Condition::Any),
        }
    }
}
