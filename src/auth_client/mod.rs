use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;

pub use http::HttpAuthClient;

/// Errors surfaced by the remote authorization service client.
#[derive(Debug, Error)]
pub enum AuthClientError {
    #[error("auth client is not available")]
    ClientUnavailable,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid token")]
    InvalidToken,

    #[error("{0}")]
    Message(String),
}

/// Login/password pair forwarded to the authorization service.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateTokenResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "user-login")]
    pub user_login: String,
    #[serde(default)]
    pub error: String,
}

/// Register/login/validate calls against the remote authorization service.
/// The HTTP implementation lives in [`http::HttpAuthClient`]; services and
/// middleware depend on this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Registers credentials remotely and returns the issued token.
    async fn register_user(&self, credentials: &Credentials) -> Result<String, AuthClientError>;

    /// Exchanges credentials for a token.
    async fn login_user(&self, credentials: &Credentials) -> Result<String, AuthClientError>;

    /// Validates a bearer token and resolves it to the user's email.
    async fn validate_token(&self, token: &str) -> Result<String, AuthClientError>;
}
