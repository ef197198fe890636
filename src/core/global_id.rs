//! Relay-style global identifiers: `base64("{Type}:{id}")`

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode a type name and local id into an opaque global id
pub fn to_global_id(type_name: &str, id: &str) -> String {
    STANDARD.encode(format!("{}:{}", type_name, id))
}

/// Decode a global id into `(type_name, id)`
///
/// Returns `None` when the input is not base64 or lacks the separator.
pub fn from_global_id(global_id: &str) -> Option<(String, String)> {
    let bytes = STANDARD.decode(global_id).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (type_name, id) = decoded.split_once(':')?;
    Some((type_name.to_string(), id.to_string()))
}

/// Render a JSON key value as the `id` half of a global id
pub(crate) fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
