use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::AppState;

/// Authenticated caller identity resolved by the authorization service.
/// Inserted into request extensions; the sole way handlers learn who is
/// calling.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: String,
}

/// Bearer-token authentication middleware. Extracts the token from the
/// Authorization header and delegates validation to the remote authorization
/// service; handlers downstream read the resolved [`AuthUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing or invalid token"))?;

    let email = state
        .auth_client
        .validate_token(&token)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;
    if email.is_empty() {
        return Err(ApiError::unauthorized("Invalid token"));
    }

    request.extensions_mut().insert(AuthUser { email });
    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header.
fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("authorization")?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        return None;
    }
    Some(token.to_string())
}
