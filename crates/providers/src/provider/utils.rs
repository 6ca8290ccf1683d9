//! Small JSON helpers shared by the provider adapters.

use serde_json::Value;

/// JavaScript-style truthiness for payload flags the backends populate
/// inconsistently: absent, `null`, `false`, `0` and `""` all mean "unset".
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Numeric view of a payload field that may arrive as a number or a
/// stringified number.
pub(crate) fn as_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
