use thiserror::Error;

use crate::auth_client::AuthClientError;
use crate::storage::StorageError;

pub mod user_auth_service;
pub mod user_service;

pub use user_auth_service::UserAuthService;
pub use user_service::UserService;

/// Service-level error taxonomy. Business-rule violations carry fixed
/// variants; upstream auth/storage failures pass through transparently and
/// end up as 502s at the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("field is too long")]
    FieldIsTooLong,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("duplicate key value violates unique constraint")]
    DuplicateKey,

    #[error("creating trainer/client profile while being client/trainer")]
    InvalidRoleRequest,

    #[error("user not found")]
    UserNotFound,

    #[error("client's profile does not exist")]
    ClientNotFound,

    #[error("trainer's profile does not exist")]
    TrainerNotFound,

    #[error("trainer is not active")]
    NotActiveTrainer,

    #[error(transparent)]
    Auth(#[from] AuthClientError),

    #[error(transparent)]
    Storage(StorageError),
}

/// Shared mapping for profile and record writes: constraint violations become
/// their service-level counterparts, anything else stays opaque.
pub(crate) fn map_write_error(err: StorageError) -> ServiceError {
    match err {
        StorageError::DuplicateKey => ServiceError::DuplicateKey,
        StorageError::FieldIsTooLong => ServiceError::FieldIsTooLong,
        other => ServiceError::Storage(other),
    }
}
