// Property-based tests for dynamic clause composition
// Filter predicates and partial-update assignments

use jobly_common::db::sql::{compose_job_filter, ColumnMap, SetClause};
use jobly_common::db::SqlValue;
use jobly_common::errors::RepositoryError;
use jobly_common::models::JobFilter;
use proptest::prelude::*;

fn arb_filter() -> impl Strategy<Value = JobFilter> {
    (
        proptest::option::of(0u32..1_000_000),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[A-Za-z0-9 %_]{0,12}"),
    )
        .prop_map(|(min_salary, has_equity, title)| JobFilter {
            min_salary,
            has_equity,
            title,
        })
}

fn arb_value() -> impl Strategy<Value = SqlValue> {
    prop_oneof![
        any::<bool>().prop_map(SqlValue::from),
        any::<i32>().prop_map(SqlValue::from),
        "[a-z]{0,8}".prop_map(SqlValue::from),
        Just(SqlValue::numeric(None)),
        Just(SqlValue::Text(None)),
    ]
}

// Property: predicate count
// The number of predicates equals the number of present criteria with a
// qualifying value; hasEquity=false contributes nothing.
#[test]
fn property_predicate_count_matches_present_criteria() {
    proptest!(|(filter in arb_filter())| {
        let clause = compose_job_filter(&filter);

        let expected = filter.min_salary.is_some() as usize
            + (filter.has_equity == Some(true)) as usize
            + filter.title.is_some() as usize;
        prop_assert_eq!(clause.predicates().len(), expected);

        // Only minSalary and title bind values
        let expected_params =
            filter.min_salary.is_some() as usize + filter.title.is_some() as usize;
        prop_assert_eq!(clause.params().len(), expected_params);

        prop_assert_eq!(clause.where_sql().is_none(), expected == 0);
    });
}

// Property: placeholders are numbered from $1 without gaps
#[test]
fn property_filter_placeholders_are_contiguous() {
    proptest!(|(filter in arb_filter())| {
        let clause = compose_job_filter(&filter);
        let sql = clause.where_sql().unwrap_or_default();

        for index in 1..=clause.params().len() {
            let placeholder = format!("${}", index);
            prop_assert!(sql.contains(&placeholder), "missing {} in {}", placeholder, sql);
        }
        let next = format!("${}", clause.params().len() + 1);
        prop_assert!(!sql.contains(&next));
    });
}

// Property: partial update preserves order and arity
// One assignment per key, in input order, and the next free index follows the last value.
#[test]
fn property_set_clause_preserves_order() {
    proptest!(|(values in prop::collection::vec(arb_value(), 1..8))| {
        let changes: Vec<(String, SqlValue)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("col{}", i), v.clone()))
            .collect();

        let clause = SetClause::compose(changes, ColumnMap::IDENTITY).unwrap();
        prop_assert_eq!(clause.param_count(), values.len());

        let sql = clause.sql();
        let assignments: Vec<&str> = sql.split(", ").collect();
        prop_assert_eq!(assignments.len(), values.len());
        for (i, assignment) in assignments.iter().enumerate() {
            let expected_prefix = format!("\"col{}\"=${}", i, i + 1);
            prop_assert!(assignment.starts_with(&expected_prefix));
        }

        let (_, mut params) = clause.into_parts();
        prop_assert_eq!(params.next_index(), values.len() + 1);
        prop_assert_eq!(params.push("key"), format!("${}", values.len() + 1));
        prop_assert_eq!(&params.as_slice()[..values.len()], values.as_slice());
    });
}

// Property: empty change-set always fails before anything is built
#[test]
fn property_empty_update_is_rejected() {
    let result = SetClause::compose(Vec::<(String, SqlValue)>::new(), ColumnMap::new(&[("a", "b")]));
    assert!(matches!(result, Err(RepositoryError::EmptyUpdate)));
}
