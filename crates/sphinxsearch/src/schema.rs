//! Index schema registry.
//!
//! The schema maps attribute names to [`FieldDescriptor`]s and designates the
//! document id field. The query layer only needs read access, expressed by
//! the [`LookupProvider`] trait, so any mapping layer can supply its own
//! registry.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigError, QueryResult};
use crate::types::{FieldDescriptor, FieldKind, LOOKUP_SEP};

/// Default name of the document id field.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Returns true if `s` is a plain SQL identifier.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Read-only field metadata for one index.
pub trait LookupProvider: Send + Sync {
    /// The index (table) name.
    fn index_name(&self) -> &str;

    /// Looks up a field by attribute name.
    fn field(&self, name: &str) -> Option<&FieldDescriptor>;

    /// The document id field.
    fn primary_key(&self) -> &FieldDescriptor;

    /// All fields in declaration order.
    fn fields(&self) -> &[FieldDescriptor];
}

/// Schema of a single search index.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    index: String,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    primary_key: usize,
}

impl IndexSchema {
    /// Starts building a schema for `index`.
    pub fn builder(index: impl Into<String>) -> IndexSchemaBuilder {
        IndexSchemaBuilder::new(index)
    }
}

impl LookupProvider for IndexSchema {
    fn index_name(&self) -> &str {
        &self.index
    }

    fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    fn primary_key(&self) -> &FieldDescriptor {
        &self.fields[self.primary_key]
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Builder for [`IndexSchema`].
///
/// If no primary key is declared, a BigInt `id` document id is added first.
#[derive(Debug, Clone)]
pub struct IndexSchemaBuilder {
    index: String,
    fields: Vec<FieldDescriptor>,
}

impl IndexSchemaBuilder {
    /// Creates a new builder.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds and validates the schema.
    pub fn build(self) -> QueryResult<IndexSchema> {
        if !is_identifier(&self.index) {
            return Err(invalid("index", format!("'{}' is not an identifier", self.index)).into());
        }

        let mut fields = self.fields;
        let pk_count = fields.iter().filter(|f| f.is_primary_key()).count();
        match pk_count {
            0 => fields.insert(0, FieldDescriptor::primary_key(DEFAULT_PRIMARY_KEY)),
            1 => {}
            n => {
                return Err(invalid("fields", format!("{} primary keys declared, expected one", n)).into());
            }
        }

        let mut by_name = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if !is_identifier(&field.name) || field.name.contains(LOOKUP_SEP) {
                return Err(invalid("fields", format!("'{}' is not a valid field name", field.name)).into());
            }
            if !is_identifier(field.storage_column()) {
                return Err(invalid(
                    "fields",
                    format!("'{}' is not a valid column name", field.storage_column()),
                )
                .into());
            }
            if by_name.insert(field.name.clone(), i).is_some() {
                return Err(invalid("fields", format!("duplicate field '{}'", field.name)).into());
            }
        }

        let primary_key = fields
            .iter()
            .position(|f| f.kind == FieldKind::PrimaryKey)
            .unwrap_or_default();

        tracing::debug!(
            index = %self.index,
            fields = fields.len(),
            "Built index schema"
        );

        Ok(IndexSchema {
            index: self.index,
            fields,
            by_name,
            primary_key,
        })
    }
}

fn invalid(setting: &str, message: String) -> ConfigError {
    ConfigError::Invalid {
        setting: format!("schema.{}", setting),
        message,
    }
}
