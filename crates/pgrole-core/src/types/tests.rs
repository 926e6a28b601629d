use super::*;
use pretty_assertions::assert_eq;

fn names(values: Vec<Value>) -> QueryResult {
    QueryResult {
        columns: vec!["rolname".to_string()],
        rows: values.into_iter().map(|v| Row::new(vec![v])).collect(),
    }
}

#[test]
fn test_first_column_strings_skips_nulls() {
    let result = names(vec![Value::from("a"), Value::Null, Value::from("b")]);
    assert_eq!(result.first_column_strings(), vec!["a", "b"]);
    assert!(result.has_rows());
}

#[test]
fn test_first_column_strings_ignores_non_text() {
    let result = names(vec![Value::Int32(1), Value::from("pg_monitor")]);
    assert_eq!(result.first_column_strings(), vec!["pg_monitor"]);
}

#[test]
fn test_empty_result() {
    let result = QueryResult::default();
    assert!(!result.has_rows());
    assert!(result.first_column_strings().is_empty());
}
