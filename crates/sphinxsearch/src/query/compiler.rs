//! Statement compilation.
//!
//! Assembles one SphinxQL statement from the base query and the search
//! state. The WHERE clause has a fixed order: base predicates, then raw
//! fragments in insertion order, then the single `MATCH(?)`. The OPTION
//! clause comes last, after ORDER BY and LIMIT.

use std::fmt;

use crate::error::QueryResult;

use super::base::QueryMutator;
use super::fragment::{RawFragment, SqlParam};
use super::state::QueryState;

/// A compiled statement and its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// Statement text with `?` placeholders.
    pub sql: String,
    /// Bound parameters.
    pub params: Vec<SqlParam>,
}

impl fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Compiles queries into statements.
pub struct StatementCompiler;

impl StatementCompiler {
    /// Compiles `base` and `state` into a single statement.
    ///
    /// Fails with [`QueryError::MalformedFragment`](crate::error::QueryError::MalformedFragment)
    /// if any fragment's placeholder count disagrees with its parameters;
    /// nothing is produced in that case.
    pub fn compile<B: QueryMutator>(base: &B, state: &QueryState) -> QueryResult<CompiledStatement> {
        let base_where = base.where_fragment();
        base_where.validate()?;

        let mut conditions = base_where;
        for fragment in state.fragments() {
            fragment.validate()?;
            conditions = conditions.and(fragment.clone());
        }

        if let Some(expression) = state.matches().to_query_string() {
            conditions = conditions.and(RawFragment::with_params(
                "MATCH(?)",
                vec![SqlParam::String(expression)],
            ));
        }

        let mut sql = base.select_clause();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.sql);
        }
        if let Some(tail) = base.tail_clause() {
            sql.push(' ');
            sql.push_str(&tail);
        }
        if let Some(options) = state.options().to_sql() {
            sql.push(' ');
            sql.push_str(&options);
        }

        tracing::debug!(
            sql = %sql,
            params = conditions.params.len(),
            "Compiled SphinxQL statement"
        );

        Ok(CompiledStatement {
            sql,
            params: conditions.params,
        })
    }
}
