use axum::body::Bytes;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::ServiceError;

pub mod authorization;
pub mod client;
pub mod plan;
pub mod report;
pub mod trainer;
pub mod validation;

/// Reject empty bodies, then decode JSON. Both failure modes are 400s with
/// fixed messages.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("empty request"));
    }
    serde_json::from_slice(body).map_err(|e| {
        error!("failed to decode request body: {e}");
        ApiError::bad_request("failed to decode request body")
    })
}

/// Caller identity injected by the auth middleware. A missing or empty
/// identity is reported as 502 bad gateway, matching the deployed behavior.
pub(crate) fn caller_email(auth: Option<&AuthUser>) -> Result<String, ApiError> {
    match auth {
        Some(user) if !user.email.is_empty() => Ok(user.email.clone()),
        _ => {
            error!("empty email from request context");
            Err(ApiError::bad_gateway("bad gateway"))
        }
    }
}

/// Shared service-to-HTTP error mapping. Business-rule violations become
/// fixed-message 400s, credential failures 401, and upstream auth/storage
/// failures 502 with the endpoint's fallback message.
pub(crate) fn map_service_error(err: ServiceError, role_message: &str, fallback: &str) -> ApiError {
    match err {
        ServiceError::InvalidRoleRequest => ApiError::bad_request(role_message),
        ServiceError::InvalidCredentials => ApiError::unauthorized("invalid credentials"),
        ServiceError::UserAlreadyExists
        | ServiceError::FieldIsTooLong
        | ServiceError::DuplicateKey
        | ServiceError::UserNotFound
        | ServiceError::ClientNotFound
        | ServiceError::TrainerNotFound
        | ServiceError::NotActiveTrainer => ApiError::bad_request(err.to_string()),
        ServiceError::Auth(_) | ServiceError::Storage(_) => {
            error!("{fallback}: {err}");
            ApiError::bad_gateway(fallback)
        }
    }
}
