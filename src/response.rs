//! The uniform result shape returned by every exposed operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical result of a boundary operation.
///
/// `success` is true exactly when `error` is unset for every result built through the
/// constructors below. Operation-specific fields (`cwd`, `path`, `contents`, `data`, ...)
/// live in `extra` and serialize flat next to the fixed fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = non_empty(output.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(message.into());
        self
    }

    /// Attach an operation-specific field, overwriting any previous value
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Nest `value` under the `data` key
    pub fn with_data(self, value: impl Into<Value>) -> Self {
        self.with_field("data", value)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Error text if present, else output, else a generic marker.
    /// Used when reporting a failure in a log line.
    pub fn failure_reason(&self) -> &str {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.output.as_deref().filter(|o| !o.is_empty()))
            .unwrap_or("unknown error")
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": format!("Serialization error: {e}") })
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Builds an [`OperationResult`] from loosely-typed parts.
///
/// Merge order:
/// 1. `success` is kept when explicitly true, otherwise it is derived from the absence
///    of an error.
/// 2. Empty `error`, `message` and `output` values are dropped.
/// 3. `data` holding a list lands under `paths`, or under `data` when a `paths` field
///    was also supplied. An object is flattened into the result. Anything else is kept
///    under `data`.
/// 4. Named fields are applied last and overwrite earlier keys.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    success: Option<bool>,
    error: Option<String>,
    output: Option<String>,
    message: Option<String>,
    data: Option<Value>,
    fields: Vec<(String, Value)>,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = non_empty(error.into());
        self
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = non_empty(output.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(message.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> OperationResult {
        let success = self.success == Some(true) || self.error.is_none();
        let mut result = OperationResult {
            success,
            error: self.error,
            output: self.output,
            message: self.message,
            extra: Map::new(),
        };

        let paths_supplied = self.fields.iter().any(|(k, _)| k == "paths");
        match self.data {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                let key = if paths_supplied { "data" } else { "paths" };
                result.absorb(key.to_string(), Value::Array(items));
            }
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    result.absorb(key, value);
                }
            }
            Some(other) => result.absorb("data".to_string(), other),
        }

        for (key, value) in self.fields {
            result.absorb(key, value);
        }

        result
    }
}

impl OperationResult {
    /// Route a merged key into the fixed fields when it names one, otherwise into `extra`
    fn absorb(&mut self, key: String, value: Value) {
        let as_text = |value: &Value| match value {
            Value::Null => None,
            Value::String(s) => non_empty(s.clone()),
            other => Some(other.to_string()),
        };

        match key.as_str() {
            "success" => {
                if let Some(flag) = value.as_bool() {
                    self.success = flag;
                }
            }
            "error" => self.error = as_text(&value),
            "output" => self.output = as_text(&value),
            "message" => self.message = as_text(&value),
            _ => {
                self.extra.insert(key, value);
            }
        }
    }
}

impl From<OperationResult> for Value {
    fn from(result: OperationResult) -> Self {
        result.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_derived_from_error() {
        let ok = ResponseBuilder::new().message("done").build();
        assert!(ok.success);

        let failed = ResponseBuilder::new().error("broken").build();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("broken"));
    }

    #[test]
    fn test_explicit_success_is_honored() {
        let result = ResponseBuilder::new().success(true).error("warning").build();
        assert!(result.success);
    }

    #[test]
    fn test_explicit_false_without_error_derives_true() {
        let result = ResponseBuilder::new().success(false).build();
        assert!(result.success);
    }

    #[test]
    fn test_empty_strings_are_dropped() {
        let result = ResponseBuilder::new().error("").output("").message("").build();
        assert!(result.success);
        assert_eq!(result.to_value(), json!({ "success": true }));
    }

    #[test]
    fn test_building_twice_is_identical() {
        let build = || ResponseBuilder::new().success(true).message("ok").build();
        assert_eq!(build(), build());
        assert_eq!(build().to_value(), json!({ "success": true, "message": "ok" }));
    }

    #[test]
    fn test_list_data_goes_under_paths() {
        let result = ResponseBuilder::new().data(json!(["a", "b"])).build();
        assert_eq!(result.field("paths"), Some(&json!(["a", "b"])));
        assert!(result.field("data").is_none());
    }

    #[test]
    fn test_list_data_goes_under_data_when_paths_supplied() {
        let result = ResponseBuilder::new()
            .data(json!(["a", "b"]))
            .field("paths", json!(["c"]))
            .build();
        assert_eq!(result.field("data"), Some(&json!(["a", "b"])));
        assert_eq!(result.field("paths"), Some(&json!(["c"])));
    }

    #[test]
    fn test_object_data_is_flattened() {
        let result = ResponseBuilder::new()
            .data(json!({ "thread_id": "abc", "interval_seconds": 10 }))
            .build();
        assert_eq!(
            result.to_value(),
            json!({ "success": true, "thread_id": "abc", "interval_seconds": 10 })
        );
    }

    #[test]
    fn test_scalar_data_is_kept_under_data() {
        let result = ResponseBuilder::new().data(42).build();
        assert_eq!(result.field("data"), Some(&json!(42)));
    }

    #[test]
    fn test_fields_overwrite_earlier_keys() {
        let result = ResponseBuilder::new()
            .message("first")
            .data(json!({ "cwd": "/a" }))
            .field("cwd", "/b")
            .field("message", "second")
            .build();
        assert_eq!(result.field("cwd"), Some(&json!("/b")));
        assert_eq!(result.message.as_deref(), Some("second"));
    }

    #[test]
    fn test_failure_reason_prefers_error_then_output() {
        assert_eq!(OperationResult::failure("bad").failure_reason(), "bad");

        let mut result = OperationResult::failure("");
        result.output = Some("stdout text".to_string());
        assert_eq!(result.failure_reason(), "stdout text");

        assert_eq!(OperationResult::failure("").failure_reason(), "unknown error");
    }

    #[test]
    fn test_serialization_flattens_extra() {
        let result = OperationResult::ok()
            .with_output("out")
            .with_data(json!({ "thread_id": "t" }));
        assert_eq!(
            result.to_value(),
            json!({ "success": true, "output": "out", "data": { "thread_id": "t" } })
        );
    }
}
