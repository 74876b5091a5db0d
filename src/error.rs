// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error carrying the status code and the client-facing message.
/// Serialized as the standard error envelope
/// `{"status":"Error","error":"..."}`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(Vec<String>),

    // 401 Unauthorized
    Unauthorized(String),

    // 502 Bad Gateway (storage and the auth service are both upstream
    // dependencies; unexpected failures never surface as 500)
    BadGateway(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::BadGateway(_) => 502,
        }
    }

    /// Client-safe error message. Validation failures join their per-field
    /// messages into one line.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Validation(messages) => messages.join(", "),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::BadGateway(msg) => msg.clone(),
        }
    }

    /// Convert to the JSON error envelope.
    pub fn to_json(&self) -> Value {
        json!({
            "status": "Error",
            "error": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(messages: Vec<String>) -> Self {
        ApiError::Validation(messages)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
