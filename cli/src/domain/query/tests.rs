//! End-to-end query tests over an in-memory table

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};

use super::*;
use crate::data::table::{Table, Value};

fn people() -> Table {
    Table::from_columns([
        (
            "nom",
            Arc::new(StringArray::from(vec![
                Some("Anne"),
                Some("Paul"),
                Some("Marian"),
                Some("Zoé"),
                None,
            ])) as ArrayRef,
        ),
        (
            "age",
            Arc::new(Int64Array::from(vec![
                Some(34),
                Some(17),
                Some(70),
                None,
                Some(45),
            ])) as ArrayRef,
        ),
        (
            "score",
            Arc::new(Float64Array::from(vec![
                Some(1.5),
                Some(2.0),
                None,
                Some(f64::NAN),
                Some(0.5),
            ])) as ArrayRef,
        ),
        (
            "actif",
            Arc::new(BooleanArray::from(vec![
                Some(true),
                Some(false),
                Some(true),
                None,
                Some(false),
            ])) as ArrayRef,
        ),
        (
            "status",
            Arc::new(StringArray::from(vec![
                Some("actif"),
                Some("inactif"),
                Some("archive"),
                Some("actif"),
                None,
            ])) as ArrayRef,
        ),
    ])
    .unwrap()
}

fn try_select(query: &str) -> Result<Vec<usize>, QueryError> {
    let table = people();
    let predicate = bind(&translate(&parse(query)?)?, &table)?;
    Ok(predicate
        .mask(&table)
        .into_iter()
        .enumerate()
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect())
}

fn select(query: &str) -> Vec<usize> {
    try_select(query).unwrap()
}

// ============================================================================
// COMPARISONS
// ============================================================================

#[test]
fn test_integer_comparisons() {
    assert_eq!(select("age > 30"), vec![0, 2, 4]);
    assert_eq!(select("age <= 34"), vec![0, 1]);
    assert_eq!(select("age == 17"), vec![1]);
    assert_eq!(select("age >= 34.5"), vec![2, 4]);
}

#[test]
fn test_reversed_operands_are_mirrored() {
    assert_eq!(select("30 < age"), select("age > 30"));
    assert_eq!(select("'Anne' == nom"), vec![0]);
}

#[test]
fn test_negative_numbers() {
    assert_eq!(select("age > -1"), vec![0, 1, 2, 4]);
}

#[test]
fn test_float_column_and_nan() {
    assert_eq!(select("score >= 1.5"), vec![0, 1]);
    assert_eq!(select("score < 1"), vec![4]);
    assert_eq!(select("score is null"), vec![2, 3]);
}

#[test]
fn test_text_comparisons_are_lexicographic() {
    assert_eq!(select("nom < 'N'"), vec![0, 2]);
    assert_eq!(select("nom == 'anne'"), Vec::<usize>::new());
}

#[test]
fn test_boolean_column() {
    assert_eq!(select("actif == true"), vec![0, 2]);
    assert_eq!(select("actif != true"), vec![1, 3, 4]);
}

#[test]
fn test_null_cells_only_match_inequality() {
    assert_eq!(select("nom == 'Anne' or nom != 'Anne'"), vec![0, 1, 2, 3, 4]);
    assert_eq!(select("nom == 'Anne'"), vec![0]);
    assert_eq!(select("nom != 'Anne'"), vec![1, 2, 3, 4]);
}

#[test]
fn test_equality_across_kinds_never_matches() {
    assert_eq!(select("age == '34'"), Vec::<usize>::new());
    assert_eq!(select("age != '34'"), vec![0, 1, 2, 3, 4]);
}

// ============================================================================
// MEMBERSHIP
// ============================================================================

#[test]
fn test_membership_lists() {
    assert_eq!(select("status in ('actif', 'inactif')"), vec![0, 1, 3]);
    assert_eq!(select("status not in ('actif')"), vec![1, 2, 4]);
    assert_eq!(select("age in (17, 70)"), vec![1, 2]);
}

#[test]
fn test_empty_slots_are_skipped() {
    assert_eq!(select("status in ('actif',)"), vec![0, 3]);
    assert_eq!(select("status in ()"), Vec::<usize>::new());
}

#[test]
fn test_bare_words_are_rejected() {
    assert_eq!(
        try_select("status in (actif)"),
        Err(QueryError::UnquotedValue {
            column: "status".to_string(),
            word: "actif".to_string()
        })
    );
}

// ============================================================================
// SQL-LIKE FORMS
// ============================================================================

#[test]
fn test_like_patterns_are_case_insensitive() {
    assert_eq!(select(r#"nom LIKE "%An%""#), vec![0, 2]);
    assert_eq!(select("nom like 'pa%'"), vec![1]);
    assert_eq!(select("nom like '%É'"), vec![3]);
}

#[test]
fn test_like_requires_text() {
    assert!(matches!(
        try_select("age like '%1%'"),
        Err(QueryError::TypeMismatch { .. })
    ));
}

#[test]
fn test_null_tests() {
    assert_eq!(select("nom IS NULL"), vec![4]);
    assert_eq!(select("nom IS NOT NULL"), vec![0, 1, 2, 3]);
    assert_eq!(select("nom NOT NULL"), select("nom IS NOT NULL"));
}

// ============================================================================
// BOOLEAN STRUCTURE
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(select("age < 20 or age > 60 and actif == true"), vec![1, 2]);
    assert_eq!(select("(age < 20 or age > 60) and actif == true"), vec![2]);
}

#[test]
fn test_not_and_parentheses() {
    assert_eq!(select("not (age > 30)"), vec![1, 3]);
    assert_eq!(select("not not age > 30"), select("age > 30"));
}

#[test]
fn test_tautology_keeps_every_row_in_order() {
    assert_eq!(select("age > 0 or age is null"), vec![0, 1, 2, 3, 4]);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_unknown_column_lists_available() {
    let err = try_select("age2 > 5").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown column 'age2'. Available columns: nom, age, score, actif, status"
    );
}

#[test]
fn test_ordering_across_kinds_is_an_error() {
    let err = try_select("nom > 5").unwrap_err();
    assert_eq!(
        err,
        QueryError::TypeMismatch {
            column: "nom".to_string(),
            op: ">".to_string(),
            column_type: "text",
            operand: "a number".to_string(),
        }
    );
}

#[test]
fn test_bind_fails_before_any_row_is_read() {
    // The valid left side would match rows, but the whole query is rejected
    assert!(try_select("age > 30 or missing == 1").is_err());
}

#[test]
fn test_syntax_errors() {
    assert!(try_select("age >").unwrap_err().is_syntax());
    assert!(try_select("(age > 1").unwrap_err().is_syntax());
    assert!(try_select("age > 1)").unwrap_err().is_syntax());
    assert!(try_select("nom == 'Anne").unwrap_err().is_syntax());
    assert!(try_select("age = 1").unwrap_err().is_syntax());
}

#[test]
fn test_filtered_table_keeps_columns() {
    let table = people();
    let predicate = bind(&translate(&parse("age > 40").unwrap()).unwrap(), &table).unwrap();
    let filtered = table.filter(&predicate.mask(&table)).unwrap();

    assert_eq!(filtered.column_names(), table.column_names());
    assert_eq!(filtered.num_rows(), 2);
    assert_eq!(filtered.value(0, 0), Value::Str("Marian"));
    assert!(predicate.matches(&table, 2));
}
