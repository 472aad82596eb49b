use serde_json::{Map, Value};

use crate::error::ArgError;

/// Utility functions for positional argument validation
pub struct ArgValidation;

impl ArgValidation {
    /// Validate that we have at least the required number of arguments
    pub fn require_args(arguments: &[Value], required: usize, operation: &str) -> Result<(), ArgError> {
        if arguments.len() < required {
            return Err(ArgError::Missing {
                operation: operation.to_string(),
                required,
            });
        }
        Ok(())
    }

    /// Extract a string argument at the given index
    pub fn extract_string(arguments: &[Value], index: usize, arg_name: &str) -> Result<String, ArgError> {
        arguments
            .get(index)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ArgError::WrongType {
                position: index + 1,
                expected: "a string",
                name: arg_name.to_string(),
            })
    }

    /// Extract an optional string; missing, null and empty all read as `None`
    pub fn extract_optional_string(arguments: &[Value], index: usize) -> Option<String> {
        arguments
            .get(index)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Extract a string argument, falling back to `default` when absent or empty
    pub fn extract_string_or_default(arguments: &[Value], index: usize, default: &str) -> String {
        Self::extract_optional_string(arguments, index).unwrap_or_else(|| default.to_string())
    }

    /// Extract a non-negative integer given either as a number or as numeric text.
    /// Anything else reads as `None`.
    pub fn extract_u64(arguments: &[Value], index: usize) -> Option<u64> {
        match arguments.get(index)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Extract an object argument at the given index
    pub fn extract_object(arguments: &[Value], index: usize, arg_name: &str) -> Result<Map<String, Value>, ArgError> {
        arguments
            .get(index)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ArgError::WrongType {
                position: index + 1,
                expected: "an object",
                name: arg_name.to_string(),
            })
    }
}
