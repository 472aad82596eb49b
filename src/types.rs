// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request structure for operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl OperationRequest {
    pub fn new(operation: impl Into<String>, args: Vec<serde_json::Value>) -> Self {
        Self {
            operation: operation.into(),
            args,
        }
    }
}

/// Body of `POST /rpc`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HttpRequest {
    pub operation: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub args: Vec<serde_json::Value>,
}

/// Body of `POST /api/<operation>`
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ArgsPayload {
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub args: Vec<serde_json::Value>,
}

/// Response structure for operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    #[schema(value_type = Object)]
    pub result: serde_json::Value,
    pub success: bool,
    pub operation: String,
}
