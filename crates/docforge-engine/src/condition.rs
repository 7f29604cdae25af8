//! Condition evaluation
//!
//! The only implementation of the operator table. Form visibility, content
//! variant selection and document conditionals all call [`evaluate`], so the
//! three call sites cannot drift apart.

use docforge_types::{Condition, Operator};
use serde_json::Value;

use crate::errors::{Warning, WarningKind};
use crate::resolver::resolve;

/// Evaluate an optional condition against the data record
///
/// - No condition, or no target field: `true`
/// - Target field missing from the data: `false` for every known operator
/// - Unknown operator: `true` (fail-open, see [`check`])
pub fn evaluate(condition: Option<&Condition>, data: &Value) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    if !condition.has_target() {
        return true;
    }
    if condition.operator.is_unknown() {
        return true;
    }
    let Some(actual) = resolve(data, condition.field.trim()) else {
        return false;
    };
    let expected = &condition.value;

    match &condition.operator {
        Operator::Equals => loose_eq(actual, expected),
        Operator::NotEquals => !loose_eq(actual, expected),
        Operator::Contains => contains(actual, expected),
        Operator::NotContains => !contains(actual, expected),
        Operator::GreaterThan => compare(actual, expected, |a, b| a > b),
        Operator::LessThan => compare(actual, expected, |a, b| a < b),
        Operator::Unknown(_) => true,
    }
}

/// Report an unknown operator; evaluation itself still fails open
pub fn check(condition: Option<&Condition>) -> Option<Warning> {
    let condition = condition?;
    match &condition.operator {
        Operator::Unknown(name) => Some(
            Warning::new(
                WarningKind::UnknownOperator,
                format!(
                    "Unknown operator '{}' on field '{}' treated as satisfied",
                    name, condition.field
                ),
            )
            .about(name.clone()),
        ),
        _ => None,
    }
}

/// Scalar equality with number/string/bool coercion
///
/// Form inputs often deliver `"5"` where a template compares against `5`.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            parse_number(s).is_some_and(|parsed| Some(parsed) == n.as_f64())
        }
        (Value::Bool(flag), Value::String(s)) | (Value::String(s), Value::Bool(flag)) => {
            s.trim().eq_ignore_ascii_case(if *flag { "true" } else { "false" })
        }
        _ => a == b,
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        Value::String(text) => match text_form(needle) {
            Some(needle) => text.contains(needle.as_str()),
            None => false,
        },
        _ => false,
    }
}

fn compare(actual: &Value, expected: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn text_form(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(field: &str, op: &str, value: Value) -> Condition {
        Condition::new(field, Operator::from(op.to_string()), value)
    }

    #[test]
    fn test_absent_condition_is_visible() {
        assert!(evaluate(None, &json!({})));
        assert!(evaluate(Some(&cond("", "equals", json!(1))), &json!({})));
        assert!(evaluate(Some(&cond("  ", "equals", json!(1))), &json!({})));
    }

    #[test]
    fn test_equals() {
        let data = json!({"includeSafety": false, "tier": "gold", "count": 3});
        assert!(!evaluate(Some(&cond("includeSafety", "equals", json!(true))), &data));
        assert!(evaluate(Some(&cond("includeSafety", "equals", json!(false))), &data));
        assert!(evaluate(Some(&cond("tier", "equals", json!("gold"))), &data));
        assert!(evaluate(Some(&cond("count", "equals", json!("3"))), &data));
        assert!(evaluate(Some(&cond("count", "equals", json!(3.0))), &data));
    }

    #[test]
    fn test_bool_string_coercion() {
        let data = json!({"flag": "true"});
        assert!(evaluate(Some(&cond("flag", "equals", json!(true))), &data));
        assert!(evaluate(Some(&cond("flag", "not_equals", json!(false))), &data));
    }

    #[test]
    fn test_not_equals() {
        let data = json!({"tier": "gold"});
        assert!(evaluate(Some(&cond("tier", "not_equals", json!("silver"))), &data));
        assert!(!evaluate(Some(&cond("tier", "not_equals", json!("gold"))), &data));
    }

    #[test]
    fn test_missing_field_is_not_satisfied() {
        let data = json!({});
        for op in [
            "equals",
            "not_equals",
            "contains",
            "not_contains",
            "greater_than",
            "less_than",
        ] {
            assert!(
                !evaluate(Some(&cond("ghost", op, json!("x"))), &data),
                "operator {} should not be satisfied by a missing field",
                op
            );
        }
    }

    #[test]
    fn test_contains_array_and_substring() {
        let data = json!({"tags": ["hazmat", "fragile"], "notes": "handle with care", "ids": [1, 2]});
        assert!(evaluate(Some(&cond("tags", "contains", json!("hazmat"))), &data));
        assert!(!evaluate(Some(&cond("tags", "contains", json!("haz"))), &data));
        assert!(evaluate(Some(&cond("notes", "contains", json!("care"))), &data));
        assert!(evaluate(Some(&cond("ids", "contains", json!("2"))), &data));
        assert!(evaluate(Some(&cond("tags", "not_contains", json!("perishable"))), &data));
        assert!(!evaluate(Some(&cond("notes", "not_contains", json!("handle"))), &data));
    }

    #[test]
    fn test_contains_on_scalar_number_is_false() {
        let data = json!({"n": 42});
        assert!(!evaluate(Some(&cond("n", "contains", json!(4))), &data));
        assert!(evaluate(Some(&cond("n", "not_contains", json!(4))), &data));
    }

    #[test]
    fn test_numeric_comparisons() {
        let data = json!({"budget": 5000, "qty": "12"});
        assert!(evaluate(Some(&cond("budget", "greater_than", json!(1000))), &data));
        assert!(!evaluate(Some(&cond("budget", "less_than", json!(1000))), &data));
        assert!(evaluate(Some(&cond("qty", "greater_than", json!("9"))), &data));
        assert!(!evaluate(Some(&cond("budget", "greater_than", json!(5000))), &data));
        assert!(!evaluate(Some(&cond("budget", "greater_than", json!("lots"))), &data));
    }

    #[test]
    fn test_unknown_operator_fails_open() {
        let data = json!({"tier": "gold"});
        let c = cond("tier", "matches", json!("g.*"));
        assert!(evaluate(Some(&c), &data));
        assert!(evaluate(Some(&c), &json!({})));

        let warning = check(Some(&c)).unwrap();
        assert_eq!(warning.kind, WarningKind::UnknownOperator);
        assert_eq!(warning.subject.as_deref(), Some("matches"));
        assert!(check(Some(&cond("tier", "equals", json!(1)))).is_none());
        assert!(check(None).is_none());
    }

    #[test]
    fn test_nested_field_path() {
        let data = json!({"client": {"country": "NZ"}});
        assert!(evaluate(Some(&cond("client.country", "equals", json!("NZ"))), &data));
    }
}
