use serde_json::{Number, Value};
use url::Url;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Appends one query parameter per key of `body` onto `url`.
///
/// Object bodies contribute their keys in insertion order, array bodies their
/// indices and string bodies one index per character. Numbers and booleans
/// have no keys and leave the url untouched.
pub(crate) fn append_query_params(url: &mut Url, body: &Value) {
    let pairs: Vec<(String, String)> = match body {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), query_value(value)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), query_value(value)))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(index, c)| (index.to_string(), c.to_string()))
            .collect(),
        _ => return,
    };

    if pairs.is_empty() {
        return;
    }

    let mut query = url.query_pairs_mut();
    for (key, value) in &pairs {
        query.append_pair(key, value);
    }
}

/// The string form a value takes as a query parameter.
///
/// Strings are used verbatim, arrays are joined with `,` (with `null` items
/// left empty) and objects collapse to `[object Object]`.
pub(crate) fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_value(n),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => query_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Whole floats within the safe-integer range print without a fraction, so
/// `5.0` becomes `5`.
fn number_value(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Whether a body counts as present for query building. `null`, `false`, `0`
/// and the empty string do not.
pub(crate) fn is_present(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
