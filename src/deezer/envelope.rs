use serde_json::Value;

use crate::error::ProviderError;

/// Turns the `error` member of a gateway envelope into an error, if any.
///
/// The gateway is inconsistent about the shape of this member: it may be an
/// object of `CODE: message` pairs, an array of messages, a bare value, or an
/// empty container when everything went fine. Messages are lower-cased on
/// their first letter and joined with `"; "`.
pub fn envelope_error(error: &Value) -> Option<ProviderError> {
    let messages: Vec<String> = match error {
        Value::Null => Vec::new(),
        Value::Object(map) => map.values().filter_map(message).collect(),
        Value::Array(items) => items.iter().filter_map(message).collect(),
        other => message(other).into_iter().collect(),
    };

    if messages.is_empty() {
        return None;
    }

    Some(ProviderError::Api(messages.join("; ")))
}

fn message(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(false) => return None,
        other => other.to_string(),
    };

    let text = uncapitalize(text.trim());
    if text.is_empty() { None } else { Some(text) }
}

/// Lower-cases the first character of `text`.
pub fn uncapitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
