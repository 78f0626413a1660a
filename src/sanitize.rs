use std::sync::LazyLock;

use serde_json::{Map, Value};

pub const ELLIPSIS: &str = "...";

static EMPTY_MAP: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

pub fn as_sequence(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

pub fn as_mapping(value: Option<&Value>) -> &Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => &EMPTY_MAP,
    }
}

pub fn as_display_string(value: Option<&Value>, max_len: Option<usize>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    match max_len {
        Some(max_len) if text.chars().count() > max_len => {
            let mut cut = text.chars().take(max_len).collect::<String>();
            cut.push_str(ELLIPSIS);
            cut
        }
        _ => text,
    }
}

pub fn safe_length(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        Some(Value::String(s)) => s.chars().count(),
        _ => 0,
    }
}

pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

// `2`, `2.0` and `"2"` all give "2".
pub fn canonical_number(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return i.to_string();
            }
            if let Some(u) = n.as_u64() {
                return u.to_string();
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                _ => n.to_string(),
            }
        }
        Some(Value::String(s)) => s.trim().to_owned(),
        other => as_display_string(other, None),
    }
}

pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
