//! Response normalization.
//!
//! The backend is inconsistent about list shapes: some routes return a bare
//! JSON array, others wrap it in an object under a resource key, `data`, or
//! `items`. All of that branching lives here, once; callers always receive
//! one canonical shape. Malformed bodies degrade to an empty collection
//! rather than an error (the affected view renders empty and the condition
//! is logged for diagnostics).

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Normalize a list response. Accepts `[...]`, `{"<key>": [...]}`,
/// `{"data": [...]}` or `{"items": [...]}`.
pub fn list<T: DeserializeOwned>(value: Value, key: &str) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let wrapped = [key, "data", "items"]
                .iter()
                .find_map(|k| match map.remove(*k) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                });
            match wrapped {
                Some(items) => items,
                None => {
                    warn!(key, "list response is neither an array nor a wrapped array");
                    return Vec::new();
                }
            }
        }
        other => {
            warn!(key, body = %other, "unexpected list response shape");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(key, error = %e, "skipping malformed list item");
                None
            }
        })
        .collect()
}

/// Normalize a single-object response. Accepts the object itself or
/// `{"<key>": {...}}`.
pub fn item<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ApiError> {
    if let Value::Object(map) = &value {
        if let Some(inner @ Value::Object(_)) = map.get(key) {
            return serde_json::from_value(inner.clone())
                .map_err(|e| ApiError::Decode(e.to_string()));
        }
    }
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull a string field out of a response, trying each candidate key in turn.
pub fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use leadmate_core::task::Task;
    use serde_json::json;

    fn task_json(id: &str) -> Value {
        json!({ "id": id, "title": "T", "status": "todo" })
    }

    #[test]
    fn bare_array_decodes() {
        let tasks: Vec<Task> = list(json!([task_json("t1"), task_json("t2")]), "tasks");
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn wrapped_array_decodes_under_resource_key() {
        let tasks: Vec<Task> = list(json!({ "tasks": [task_json("t1")] }), "tasks");
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn wrapped_array_decodes_under_data() {
        let tasks: Vec<Task> = list(json!({ "data": [task_json("t1")] }), "tasks");
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn unexpected_shape_falls_back_to_empty() {
        let tasks: Vec<Task> = list(json!({ "count": 3 }), "tasks");
        assert!(tasks.is_empty());
        let tasks: Vec<Task> = list(json!("nope"), "tasks");
        assert!(tasks.is_empty());
    }

    #[test]
    fn malformed_items_are_skipped_not_fatal() {
        let tasks: Vec<Task> = list(
            json!([task_json("t1"), { "title": "missing id" }]),
            "tasks",
        );
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id.as_str(), "t1");
    }

    #[test]
    fn item_accepts_both_shapes() {
        let direct: Task = item(task_json("t1"), "task").unwrap();
        assert_eq!(direct.id.as_str(), "t1");
        let wrapped: Task = item(json!({ "task": task_json("t2") }), "task").unwrap();
        assert_eq!(wrapped.id.as_str(), "t2");
    }

    #[test]
    fn item_rejects_garbage() {
        let result: Result<Task, _> = item(json!({ "nope": true }), "task");
        assert!(result.is_err());
    }

    #[test]
    fn string_field_tries_keys_in_order() {
        let body = json!({ "message": "broken", "error": "other" });
        assert_eq!(string_field(&body, &["message", "error"]).as_deref(), Some("broken"));
        assert_eq!(string_field(&body, &["missing"]), None);
    }
}
