//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use sphinxsearch::config::SearchConfig;
use sphinxsearch::query::SqlParam;
use sphinxsearch::types::{AttrType, FieldDescriptor};
use sphinxsearch::{CompiledStatement, IndexSchema, SearchIndex, SearchQuerySet, StatementExecutor};

/// A product index with one field of every kind.
pub fn product_schema() -> IndexSchema {
    IndexSchema::builder("products")
        .field(FieldDescriptor::full_text("title"))
        .field(FieldDescriptor::full_text("body"))
        .field(FieldDescriptor::attribute("price", AttrType::Integer))
        .field(FieldDescriptor::attribute("rating", AttrType::Float))
        .field(FieldDescriptor::attribute("status", AttrType::Integer).with_column("status_attr"))
        .field(FieldDescriptor::attribute("in_stock", AttrType::Bool))
        .field(FieldDescriptor::attribute("created", AttrType::Timestamp))
        .field(FieldDescriptor::multi32("tags"))
        .field(FieldDescriptor::multi64("sellers"))
        .build()
        .expect("product schema is valid")
}

/// The product index with default settings.
pub fn product_index() -> SearchIndex {
    SearchIndex::new(product_schema(), SearchConfig::default()).expect("default config is valid")
}

/// A fresh query over the product index.
pub fn products() -> SearchQuerySet {
    product_index().query().expect("query starts")
}

/// Returns the WHERE clause of a compiled query, or an empty string.
pub fn where_clause(qs: &SearchQuerySet) -> String {
    let sql = qs.compile().expect("query compiles").sql;
    let rest = match sql.split_once(" WHERE ") {
        Some((_, rest)) => rest,
        None => return String::new(),
    };
    ["ORDER BY", "LIMIT", "OPTION"]
        .iter()
        .filter_map(|kw| rest.find(&format!(" {}", kw)))
        .min()
        .map(|end| rest[..end].to_string())
        .unwrap_or_else(|| rest.to_string())
}

/// Executor that records statements and returns canned rows.
#[derive(Default)]
pub struct RecordingExecutor {
    pub statements: Mutex<Vec<CompiledStatement>>,
    pub rows: Vec<Vec<SqlParam>>,
}

impl RecordingExecutor {
    pub fn with_rows(rows: Vec<Vec<SqlParam>>) -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            rows,
        }
    }

    pub fn executed(&self) -> Vec<CompiledStatement> {
        self.statements.lock().expect("lock poisoned").clone()
    }
}

impl StatementExecutor for RecordingExecutor {
    type Row = Vec<SqlParam>;
    type Error = String;

    fn execute(&self, statement: &CompiledStatement) -> Result<Vec<Self::Row>, Self::Error> {
        self.statements
            .lock()
            .map_err(|e| e.to_string())?
            .push(statement.clone());
        Ok(self.rows.clone())
    }
}

/// Installs a test subscriber once; output is shown with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
