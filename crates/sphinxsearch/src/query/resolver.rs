//! Lookup key resolution.
//!
//! Turns a key such as `price__gte` into the field descriptor and operator it
//! names. Keys have at most one separator; related-field traversal is not
//! available against a search index.

use crate::error::{QueryError, QueryResult};
use crate::schema::LookupProvider;
use crate::types::{FieldDescriptor, LOOKUP_SEP, LookupOp};

/// A lookup key split into its field name and optional operator name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupKey<'k> {
    /// The field name (or the primary-key alias).
    pub field: &'k str,
    /// The operator name, if the key had one.
    pub lookup: Option<&'k str>,
}

impl<'k> LookupKey<'k> {
    /// Splits `key` on the lookup separator.
    pub fn parse(key: &'k str) -> QueryResult<Self> {
        let tokens: Vec<&str> = key.split(LOOKUP_SEP).collect();
        let parsed = match *tokens.as_slice() {
            [field] => LookupKey {
                field,
                lookup: None,
            },
            [field, lookup] => LookupKey {
                field,
                lookup: Some(lookup),
            },
            _ => {
                return Err(QueryError::InvalidLookup {
                    key: key.to_string(),
                    message: "nested lookups not supported".to_string(),
                });
            }
        };

        if parsed.field.is_empty() || parsed.lookup == Some("") {
            return Err(QueryError::InvalidLookup {
                key: key.to_string(),
                message: "empty field or operator".to_string(),
            });
        }
        Ok(parsed)
    }
}

/// Resolves lookup keys against a schema.
pub struct LookupResolver<'a> {
    provider: &'a dyn LookupProvider,
    pk_alias: &'a str,
}

impl<'a> LookupResolver<'a> {
    /// Creates a resolver. `pk_alias` is the placeholder token that always
    /// names the document id field.
    pub fn new(provider: &'a dyn LookupProvider, pk_alias: &'a str) -> Self {
        Self { provider, pk_alias }
    }

    /// Resolves `key` into a field and operator. The operator defaults to
    /// `exact` when the key has none.
    pub fn resolve(&self, key: &str) -> QueryResult<(&'a FieldDescriptor, LookupOp)> {
        let parsed = LookupKey::parse(key)?;
        let field = self.resolve_field(parsed.field)?;
        let op = match parsed.lookup {
            None => LookupOp::Exact,
            Some(name) => LookupOp::parse(name).ok_or_else(|| QueryError::UnsupportedLookup {
                field: field.name.clone(),
                lookup: name.to_string(),
            })?,
        };
        Ok((field, op))
    }

    /// Resolves the logical negation of `key`.
    ///
    /// A key without an operator negates to `notequal`. The operator is
    /// checked before the field, so an operator without an inverse fails
    /// with [`QueryError::UnsupportedNegation`] even on unknown fields.
    pub fn resolve_negated(&self, key: &str) -> QueryResult<(&'a FieldDescriptor, LookupOp)> {
        let parsed = LookupKey::parse(key)?;
        let negated = match parsed.lookup {
            None => LookupOp::NotEqual,
            Some(name) => LookupOp::parse(name)
                .and_then(|op| op.negated())
                .ok_or_else(|| QueryError::UnsupportedNegation {
                    field: parsed.field.to_string(),
                    lookup: name.to_string(),
                })?,
        };
        let field = self.resolve_field(parsed.field)?;
        Ok((field, negated))
    }

    /// Resolves a bare field name, honouring the primary-key alias.
    pub fn resolve_field(&self, name: &str) -> QueryResult<&'a FieldDescriptor> {
        if name == self.pk_alias {
            return Ok(self.provider.primary_key());
        }
        self.provider
            .field(name)
            .ok_or_else(|| QueryError::UnknownField {
                index: self.provider.index_name().to_string(),
                field: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IndexSchema;
    use crate::types::AttrType;

    fn schema() -> IndexSchema {
        IndexSchema::builder("products")
            .field(FieldDescriptor::primary_key("doc_id"))
            .field(FieldDescriptor::attribute("price", AttrType::Float))
            .field(FieldDescriptor::multi32("tags"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_operator() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        let (field, op) = resolver.resolve("price").unwrap();
        assert_eq!(field.name, "price");
        assert_eq!(op, LookupOp::Exact);
    }

    #[test]
    fn test_explicit_operator() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        let (field, op) = resolver.resolve("tags__in").unwrap();
        assert_eq!(field.name, "tags");
        assert_eq!(op, LookupOp::In);
    }

    #[test]
    fn test_nested_lookup_rejected() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        let err = resolver.resolve("price__gte__x").unwrap_err();
        assert!(matches!(err, QueryError::InvalidLookup { .. }));
        assert!(err.to_string().contains("nested"));
    }

    #[test]
    fn test_pk_alias() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        let (field, op) = resolver.resolve("pk__gt").unwrap();
        assert_eq!(field.name, "doc_id");
        assert_eq!(op, LookupOp::Gt);
    }

    #[test]
    fn test_unknown_field() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        assert!(matches!(
            resolver.resolve("colour"),
            Err(QueryError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_unknown_operator() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        assert!(matches!(
            resolver.resolve("price__contains"),
            Err(QueryError::UnsupportedLookup { .. })
        ));
    }

    #[test]
    fn test_empty_tokens_rejected() {
        assert!(LookupKey::parse("price__").is_err());
        assert!(LookupKey::parse("__gte").is_err());
        assert!(LookupKey::parse("").is_err());
    }

    #[test]
    fn test_negated_resolution() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        assert_eq!(resolver.resolve_negated("price__gte").unwrap().1, LookupOp::Lt);
        assert_eq!(resolver.resolve_negated("price__lte").unwrap().1, LookupOp::Gt);
        assert_eq!(resolver.resolve_negated("price").unwrap().1, LookupOp::NotEqual);
        assert_eq!(
            resolver.resolve_negated("price__exact").unwrap().1,
            LookupOp::NotEqual
        );
    }

    #[test]
    fn test_negation_without_inverse() {
        let schema = schema();
        let resolver = LookupResolver::new(&schema, "pk");
        for key in ["tags__in", "price__search", "price__notequal", "nope__startswith"] {
            assert!(matches!(
                resolver.resolve_negated(key),
                Err(QueryError::UnsupportedNegation { .. })
            ));
        }
    }
}
