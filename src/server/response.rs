//! JSON envelope shared by every API route.
//!
//! Bodies look like `{ success, status, message?, data?, ... }` and the HTTP
//! status code always equals `status`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Route specific top level fields, e.g. `processedCount` or `filters`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiResponse {
    fn new(status: StatusCode) -> Self {
        ApiResponse {
            success: status.is_success(),
            status: status.as_u16(),
            message: None,
            data: None,
            extra: Map::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status).with_message(message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(StatusCode::NOT_FOUND, message)
    }

    /// Logs the cause and answers with a generic 500.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, err);
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Falls back to a 500 if `data` cannot be serialized.
    pub fn with_data<T: Serialize>(self, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                data: Some(value),
                ..self
            },
            Err(e) => Self::internal("Failed to serialize response data", e),
        }
    }

    pub fn with_field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.extra.insert(key.to_string(), value);
                self
            }
            Err(e) => Self::internal("Failed to serialize response field", e),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
