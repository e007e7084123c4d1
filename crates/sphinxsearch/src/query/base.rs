//! The base relational query.
//!
//! [`QueryMutator`] is the narrow interface the search layer needs from a
//! relational query object: add a standard condition, set ordering and
//! paging, and render the base clauses. [`BaseQuery`] is the default
//! implementation; every mutator returns a new value.

use crate::error::{QueryError, QueryResult};
use crate::types::{FieldDescriptor, LookupOp, LookupValue};

use super::fragment::{RawFragment, SqlParam, placeholders};

/// A condition in the base predicate chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A plain comparison on a storage column.
    Compare {
        /// Storage column.
        column: String,
        /// Operator; `In` renders as a parenthesized list.
        op: LookupOp,
        /// Coerced values, one per placeholder.
        params: Vec<SqlParam>,
    },
    /// A pre-rendered fragment.
    Raw(RawFragment),
    /// All sub-conditions must hold.
    All(Vec<Condition>),
    /// At least one sub-condition must hold.
    Any(Vec<Condition>),
}

impl Condition {
    /// Builds a standard comparison for `field`, coercing `value`.
    pub fn compare(field: &FieldDescriptor, op: LookupOp, value: LookupValue) -> QueryResult<Self> {
        let params = match op {
            LookupOp::In => {
                let values = value.into_values();
                if values.is_empty() {
                    return Err(QueryError::InvalidValue {
                        field: field.name.clone(),
                        message: "'in' requires at least one value".to_string(),
                    });
                }
                values
                    .iter()
                    .map(|v| v.prep_for(field))
                    .collect::<QueryResult<Vec<_>>>()?
            }
            LookupOp::Exact | LookupOp::Gt | LookupOp::Gte | LookupOp::Lt | LookupOp::Lte => {
                let scalar = value.as_scalar().ok_or_else(|| QueryError::InvalidValue {
                    field: field.name.clone(),
                    message: format!("'{}' expects a single value", op),
                })?;
                vec![scalar.prep_for(field)?]
            }
            LookupOp::Search | LookupOp::NotEqual => {
                return Err(QueryError::UnsupportedLookup {
                    field: field.name.clone(),
                    lookup: op.to_string(),
                });
            }
        };

        Ok(Condition::Compare {
            column: field.storage_column().to_string(),
            op,
            params,
        })
    }

    /// Renders this condition.
    pub fn to_fragment(&self) -> RawFragment {
        match self {
            Condition::Compare { column, op, params } => {
                let sql = match op.to_sql_op() {
                    Some(sql_op) => format!("{} {} ?", column, sql_op),
                    None => format!("{} IN ({})", column, placeholders(params.len())),
                };
                RawFragment::with_params(sql, params.clone())
            }
            Condition::Raw(fragment) => fragment.clone(),
            Condition::All(conditions) => conditions
                .iter()
                .map(Condition::to_fragment)
                .map(parenthesize)
                .fold(RawFragment::new(""), RawFragment::and),
            Condition::Any(conditions) => {
                let mut fragments = conditions.iter().map(Condition::to_fragment);
                let first = fragments.next().unwrap_or_else(|| RawFragment::new(""));
                fragments.fold(first, RawFragment::or)
            }
        }
    }
}

/// Wraps a compound fragment in parentheses.
fn parenthesize(fragment: RawFragment) -> RawFragment {
    if fragment.sql.contains(" AND ") || fragment.sql.contains(" OR ") {
        RawFragment::with_params(format!("({})", fragment.sql), fragment.params)
    } else {
        fragment
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    /// Storage column.
    pub column: String,
    /// Sort descending.
    pub descending: bool,
}

/// Operations the search layer requires from the underlying relational query.
pub trait QueryMutator: Clone + Send + Sync {
    /// Returns a new query with `condition` ANDed to the base chain.
    fn with_condition(&self, condition: Condition) -> Self;

    /// Returns a new query with the given ordering, replacing any previous one.
    fn with_order_by(&self, terms: Vec<OrderTerm>) -> Self;

    /// Returns a new query with the given paging.
    fn with_limits(&self, offset: usize, limit: Option<usize>) -> Self;

    /// Renders `SELECT ... FROM ...`.
    fn select_clause(&self) -> String;

    /// Renders the base predicates ANDed together, without `WHERE`.
    fn where_fragment(&self) -> RawFragment;

    /// Renders `ORDER BY` and `LIMIT`, if any.
    fn tail_clause(&self) -> Option<String>;
}

/// Default relational query over one index.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseQuery {
    index: String,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Vec<OrderTerm>,
    offset: usize,
    limit: Option<usize>,
}

impl BaseQuery {
    /// Creates a query selecting `columns` from `index`.
    pub fn new(index: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index: index.into(),
            columns,
            conditions: Vec::new(),
            order_by: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Conditions in insertion order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The requested row count, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl QueryMutator for BaseQuery {
    fn with_condition(&self, condition: Condition) -> Self {
        let mut next = self.clone();
        next.conditions.push(condition);
        next
    }

    fn with_order_by(&self, terms: Vec<OrderTerm>) -> Self {
        let mut next = self.clone();
        next.order_by = terms;
        next
    }

    fn with_limits(&self, offset: usize, limit: Option<usize>) -> Self {
        let mut next = self.clone();
        next.offset = offset;
        next.limit = limit;
        next
    }

    fn select_clause(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        format!("SELECT {} FROM {}", columns, self.index)
    }

    fn where_fragment(&self) -> RawFragment {
        self.conditions
            .iter()
            .map(Condition::to_fragment)
            .map(parenthesize)
            .fold(RawFragment::new(""), RawFragment::and)
    }

    fn tail_clause(&self) -> Option<String> {
        let mut parts = Vec::new();

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|t| format!("{} {}", t.column, if t.descending { "DESC" } else { "ASC" }))
                .collect();
            parts.push(format!("ORDER BY {}", terms.join(", ")));
        }

        if let Some(limit) = self.limit {
            if self.offset > 0 {
                parts.push(format!("LIMIT {}, {}", self.offset, limit));
            } else {
                parts.push(format!("LIMIT {}", limit));
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
