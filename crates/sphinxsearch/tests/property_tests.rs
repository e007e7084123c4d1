//! Property tests for lookup resolution, match accumulation and options.

mod common;

use proptest::prelude::*;

use common::products;
use sphinxsearch::query::{LookupResolver, MatchExpression, MatchScope, OptionSet, OptionValue};
use sphinxsearch::types::LookupOp;
use sphinxsearch::{LookupProvider, QueryError};

const FIELDS: [&str; 5] = ["price", "rating", "status", "tags", "title"];

fn arb_field() -> impl Strategy<Value = &'static str> {
    prop::sample::select(FIELDS.to_vec())
}

fn arb_op() -> impl Strategy<Value = LookupOp> {
    prop::sample::select(LookupOp::ALL.to_vec())
}

fn arb_term() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    #[test]
    fn resolver_recovers_field_and_operator(field in arb_field(), op in arb_op()) {
        let schema = common::product_schema();
        let resolver = LookupResolver::new(&schema, "pk");

        let key = format!("{}__{}", field, op);
        let (resolved, parsed) = resolver.resolve(&key).unwrap();
        prop_assert_eq!(&resolved.name, field);
        prop_assert_eq!(parsed, op);

        let (bare, exact) = resolver.resolve(field).unwrap();
        prop_assert_eq!(&bare.name, field);
        prop_assert_eq!(exact, LookupOp::Exact);
    }

    #[test]
    fn resolver_rejects_nested_keys(field in arb_field(), parts in prop::collection::vec("[a-z]{1,5}", 2..5)) {
        let schema = common::product_schema();
        let resolver = LookupResolver::new(&schema, "pk");

        let key = format!("{}__{}", field, parts.join("__"));
        let is_invalid = matches!(resolver.resolve(&key), Err(QueryError::InvalidLookup { .. }));
        prop_assert!(is_invalid);
    }

    #[test]
    fn pk_alias_always_names_primary_key(op in arb_op()) {
        let schema = common::product_schema();
        let resolver = LookupResolver::new(&schema, "pk");
        let (field, _) = resolver.resolve(&format!("pk__{}", op)).unwrap();
        prop_assert_eq!(&field.name, &schema.primary_key().name);
    }

    #[test]
    fn match_accumulation_is_order_insensitive_per_call_split(
        terms in prop::collection::vec(arb_term(), 1..8),
        split in 0usize..8,
    ) {
        let split = split.min(terms.len());
        let (head, tail) = terms.split_at(split);

        let mut once = MatchExpression::new();
        once.add(MatchScope::Unscoped, terms.clone().into());

        let mut twice = MatchExpression::new();
        twice.add(MatchScope::Unscoped, head.to_vec().into());
        twice.add(MatchScope::Unscoped, tail.to_vec().into());

        prop_assert_eq!(once.to_query_string(), twice.to_query_string());
    }

    #[test]
    fn match_union_is_idempotent(terms in prop::collection::vec(arb_term(), 1..8)) {
        let once = products().match_text(terms.clone());
        let again = once.match_text(terms);
        prop_assert_eq!(once.compile().unwrap(), again.compile().unwrap());
    }

    #[test]
    fn option_keys_keep_first_position(
        writes in prop::collection::vec((prop::sample::select(vec!["a", "b", "c"]), any::<i64>()), 1..12),
    ) {
        let mut options = OptionSet::new();
        for (name, value) in &writes {
            options.set(*name, OptionValue::Int(*value)).unwrap();
        }

        let mut expected_order: Vec<&str> = Vec::new();
        for (name, _) in &writes {
            if !expected_order.contains(name) {
                expected_order.push(*name);
            }
        }
        let names: Vec<&str> = options.iter().map(|(n, _)| n).collect();
        prop_assert_eq!(names, expected_order);

        for (name, value) in options.iter() {
            let last = writes.iter().rev().find(|(n, _)| *n == name).map(|(_, v)| *v);
            prop_assert_eq!(value, &OptionValue::Int(last.unwrap()));
        }
    }

    #[test]
    fn exclude_equals_filter_with_inverse(value in 0i64..1_000_000) {
        let pairs = [
            ("price__gte", "price__lt"),
            ("price__gt", "price__lte"),
            ("price__lt", "price__gte"),
            ("price__lte", "price__gt"),
        ];
        for (negated, direct) in pairs {
            let excluded = products().exclude([(negated, value)]).unwrap().compile().unwrap();
            let filtered = products().filter([(direct, value)]).unwrap().compile().unwrap();
            prop_assert_eq!(excluded, filtered);
        }
    }
}
