use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use crate::api::TokenResponse;
use crate::error::ApiError;
use crate::models::Role;
use crate::server::AppState;
use crate::services::ServiceError;

use super::{decode_body, validation};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /authorization/register - register a new user and issue a token.
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let req: RegisterRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let email = validation::require_string(req.email.as_deref(), "Email", &mut errors);
    let password = validation::require_string(req.password.as_deref(), "Password", &mut errors);
    let name = validation::require_string(req.name.as_deref(), "Name", &mut errors);
    let role = match req.role.as_deref() {
        None | Some("") => {
            errors.push(validation::required_message("Role"));
            None
        }
        Some("trainer") => Some(Role::Trainer),
        Some("client") => Some(Role::Client),
        Some(_) => {
            errors.push("field Role is not valid".to_string());
            None
        }
    };
    validation::finish(errors)?;
    let role = match role {
        Some(role) => role,
        None => return Err(ApiError::bad_request("field Role is not valid")),
    };

    match state
        .user_auth_service
        .register_user(&email, &password, &name, role)
        .await
    {
        Ok(token) => {
            info!("successfully registered user {email}");
            Ok(Json(TokenResponse::ok(token)))
        }
        Err(ServiceError::UserAlreadyExists) => {
            Err(ApiError::bad_request("user already with such email"))
        }
        Err(ServiceError::FieldIsTooLong) => Err(ApiError::bad_request(
            "login and password must be no more than 100 symbols",
        )),
        Err(err) => {
            error!("failed to save user: {err}");
            Err(ApiError::bad_gateway("failed to save user"))
        }
    }
}

/// POST /authorization/login - exchange credentials for a token.
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let req: LoginRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let email = validation::require_string(req.email.as_deref(), "Email", &mut errors);
    let password = validation::require_string(req.password.as_deref(), "Password", &mut errors);
    validation::finish(errors)?;

    match state.user_auth_service.login(&email, &password).await {
        Ok(token) => Ok(Json(TokenResponse::ok(token))),
        Err(ServiceError::InvalidCredentials) => {
            info!("invalid credentials for {email}");
            Err(ApiError::unauthorized("invalid credentials"))
        }
        Err(err) => {
            error!("failed to sign in: {err}");
            Err(ApiError::bad_gateway("failed to sign in"))
        }
    }
}
