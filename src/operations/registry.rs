use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{error, info};

use super::{Operation, OperationRoute};
use crate::types::{OperationRequest, OperationResponse};

/// Registry that holds all registered operations
#[derive(Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Box<dyn Operation>>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new operation
    pub fn register<O: Operation + 'static>(&mut self, operation: O) {
        let name = operation.name().to_string();
        info!("Registering operation: {}", name);
        self.operations.insert(name, Box::new(operation));
    }

    /// Check if an operation is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// List all registered operation names, sorted
    pub fn list_operations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.keys().cloned().collect();
        names.sort();
        names
    }

    /// Execute an operation by name and return its raw JSON result
    pub fn execute(&self, request: &OperationRequest) -> Value {
        match self.operations.get(&request.operation) {
            Some(operation) => {
                info!("Executing operation: {} with {} args", request.operation, request.args.len());
                operation.execute(&request.args)
            }
            None => {
                error!("Operation '{}' not found", request.operation);
                json!({
                    "success": false,
                    "error": format!("Operation '{}' not found", request.operation),
                })
            }
        }
    }

    /// Execute an operation by name and wrap the result for HTTP.
    ///
    /// `success` mirrors the result's own flag; results without one (plain text,
    /// booleans) count as successful calls.
    pub fn execute_http(&self, request: OperationRequest) -> OperationResponse {
        let result = self.execute(&request);
        let success = result.get("success").and_then(Value::as_bool).unwrap_or(true);
        OperationResponse {
            result,
            success,
            operation: request.operation,
        }
    }

    /// Get all HTTP routes from registered operations
    pub fn get_all_routes(&self) -> Vec<(OperationRoute, String)> {
        let mut routes = Vec::new();
        for name in self.list_operations() {
            if let Some(operation) = self.operations.get(&name) {
                for route in operation.routes() {
                    routes.push((route, name.clone()));
                }
            }
        }
        routes
    }

    /// Get the description of an operation by name
    pub fn get_operation_description(&self, name: &str) -> Option<&'static str> {
        self.operations.get(name).map(|op| op.description())
    }

    /// Get an operation by name (returns a reference to the boxed trait object)
    pub fn get_operation(&self, name: &str) -> Option<&dyn Operation> {
        self.operations.get(name).map(|b| &**b)
    }
}
