//! Script-style coercions over JSON values
//!
//! Template expressions were authored against a loosely typed scripting host,
//! so equality, truthiness and stringification follow those rules rather than
//! Rust's. `None` stands for "undefined" throughout.

use serde_json::{Number, Value};

use super::ExprError;

/// Largest integer a double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Build a JSON number, keeping integral values integral so they print without a fraction
pub fn number(n: f64) -> Result<Value, ExprError> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Value::Number(Number::from(n as i64)));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| ExprError::Type(format!("Arithmetic result is not a finite number ({})", n)))
}

pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Array(items)) if items.is_empty() => 0.0,
        Some(Value::Array(items)) if items.len() == 1 => to_number(Some(&Value::String(to_text(&items[0])))),
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// Stringify a value the way the output stream sees it
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

pub fn to_text_or_undefined(value: Option<&Value>) -> String {
    value.map(to_text).unwrap_or_else(|| "undefined".to_string())
}

pub fn type_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) => "object",
    }
}

pub fn strict_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.as_f64() == b.as_f64(),
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    let nullish = |v: Option<&Value>| matches!(v, None | Some(Value::Null));
    if nullish(left) || nullish(right) {
        return nullish(left) && nullish(right);
    }

    match (left, right) {
        (Some(Value::String(a)), Some(Value::String(b))) => a == b,
        (Some(Value::Array(_) | Value::Object(_)), Some(Value::Array(_) | Value::Object(_))) => left == right,
        (Some(Value::Array(_) | Value::Object(_)), Some(other)) | (Some(other), Some(Value::Array(_) | Value::Object(_))) => {
            let composite = if matches!(left, Some(Value::Array(_) | Value::Object(_))) {
                left
            } else {
                right
            };
            let text = Value::String(composite.map(to_text).unwrap_or_default());
            loose_eq(Some(&text), Some(other))
        }
        _ => to_number(left) == to_number(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integral_numbers_stay_integral() {
        assert_eq!(number(30.0).unwrap(), json!(30));
        assert_eq!(to_text(&number(2.5).unwrap()), "2.5");
        assert_eq!(to_text(&json!(10.0)), "10");
    }

    #[test]
    fn test_non_finite_is_an_error() {
        assert!(number(f64::INFINITY).is_err());
        assert!(number(f64::NAN).is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(truthy(Some(&json!("0"))));
        assert!(truthy(Some(&json!([]))));
        assert!(truthy(Some(&json!({}))));
    }

    #[test]
    fn test_loose_equality() {
        assert!(loose_eq(None, Some(&json!(null))));
        assert!(loose_eq(Some(&json!("5")), Some(&json!(5))));
        assert!(loose_eq(Some(&json!(true)), Some(&json!(1))));
        assert!(!loose_eq(Some(&json!(0)), Some(&json!(null))));
        assert!(loose_eq(Some(&json!([1, 2])), Some(&json!("1,2"))));
    }

    #[test]
    fn test_strict_equality() {
        assert!(!strict_eq(Some(&json!("5")), Some(&json!(5))));
        assert!(strict_eq(Some(&json!(5)), Some(&json!(5.0))));
        assert!(!strict_eq(None, Some(&json!(null))));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_text(&json!({"a": 1})), "[object Object]");
        assert_eq!(to_text_or_undefined(None), "undefined");
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Some(&json!(" 42 "))), 42.0);
        assert_eq!(to_number(Some(&json!(""))), 0.0);
        assert!(to_number(Some(&json!("abc"))).is_nan());
        assert!(to_number(None).is_nan());
    }
}
