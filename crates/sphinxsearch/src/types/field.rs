//! Field descriptors for index schemas.
//!
//! A [`FieldDescriptor`] describes one column of a search index: its
//! attribute name, its storage column, and its kind. The kind decides which
//! rewriting rules apply when the field appears in a filter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an index field.
///
/// Full-text fields are indexed text that can only be searched through
/// `MATCH()`. Multi-value attributes hold a set of integers per document and
/// are queried with function forms (`IN()`, `LEAST()`, `GREATEST()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A plain attribute (integer, float, bool, string or timestamp).
    Scalar,
    /// A full-text field.
    FullText,
    /// A multi-value attribute of 32-bit unsigned integers.
    Multi32,
    /// A multi-value attribute of 64-bit integers.
    Multi64,
    /// The document id.
    PrimaryKey,
}

impl FieldKind {
    /// Returns true for both multi-value attribute kinds.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, FieldKind::Multi32 | FieldKind::Multi64)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar"),
            FieldKind::FullText => write!(f, "full_text"),
            FieldKind::Multi32 => write!(f, "multi32"),
            FieldKind::Multi64 => write!(f, "multi64"),
            FieldKind::PrimaryKey => write!(f, "primary_key"),
        }
    }
}

/// The value type of an attribute, used to coerce bound values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    /// 32-bit integer attribute.
    #[default]
    Integer,
    /// 64-bit integer attribute.
    BigInt,
    /// Floating point attribute.
    Float,
    /// Boolean attribute, stored as 0/1.
    Bool,
    /// String attribute (or full-text field).
    String,
    /// Timestamp attribute, stored as unix seconds.
    Timestamp,
}

/// Describes a single field of an index.
///
/// Descriptors are immutable once declared. The schema owns them and the
/// query layer only ever borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Attribute name used in lookups.
    pub name: String,
    /// Explicit storage column; falls back to `name` when absent.
    pub column: Option<String>,
    /// Field kind.
    pub kind: FieldKind,
    /// Value type used for coercion.
    pub attr_type: AttrType,
}

impl FieldDescriptor {
    /// Creates a scalar attribute.
    pub fn attribute(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind: FieldKind::Scalar,
            attr_type,
        }
    }

    /// Creates a full-text field.
    pub fn full_text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind: FieldKind::FullText,
            attr_type: AttrType::String,
        }
    }

    /// Creates a 32-bit multi-value attribute.
    pub fn multi32(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind: FieldKind::Multi32,
            attr_type: AttrType::Integer,
        }
    }

    /// Creates a 64-bit multi-value attribute.
    pub fn multi64(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind: FieldKind::Multi64,
            attr_type: AttrType::BigInt,
        }
    }

    /// Creates the document id field.
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind: FieldKind::PrimaryKey,
            attr_type: AttrType::BigInt,
        }
    }

    /// Sets an explicit storage column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Returns the storage column, falling back to the attribute name.
    pub fn storage_column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// Returns true for multi-value attributes.
    pub fn is_multi_value(&self) -> bool {
        self.kind.is_multi_value()
    }

    /// Returns true for full-text fields.
    pub fn is_full_text(&self) -> bool {
        self.kind == FieldKind::FullText
    }

    /// Returns true for the document id field.
    pub fn is_primary_key(&self) -> bool {
        self.kind == FieldKind::PrimaryKey
    }
}
