use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::OkResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{wire_time, Metric};
use crate::server::AppState;

use super::{caller_email, decode_body, map_service_error, validation};

#[derive(Debug, Deserialize)]
pub struct CreateClientProfileRequest {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bodyfat: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SelectTrainerRequest {
    #[serde(rename = "trainer-id")]
    pub trainer_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddMetricsRequest {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bodyfat: Option<f64>,
    pub bmi: Option<f64>,
    #[serde(rename = "measured-at")]
    pub measured_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientProfileResponse {
    pub height: f64,
    pub weight: f64,
    pub bodyfat: f64,
}

/// POST /user/clients/profile - fill in the caller's client profile.
pub async fn create_profile(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;
    let req: CreateClientProfileRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let height = validation::require_f64(req.height, "Height", &mut errors);
    let weight = validation::require_f64(req.weight, "Weight", &mut errors);
    let body_fat = validation::require_f64(req.bodyfat, "Bodyfat", &mut errors);
    validation::finish(errors)?;

    state
        .user_service
        .create_client(&email, height, weight, body_fat)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot create client profile while being trainer",
                "create client failed",
            )
        })?;

    Ok(Json(OkResponse::ok()))
}

/// GET /user/clients/profile - the caller's client profile.
pub async fn get_profile(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<ClientProfileResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;

    let client = state
        .user_service
        .get_client_profile(&email)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot get client profile while being trainer",
                "get client profile failed",
            )
        })?;

    Ok(Json(ClientProfileResponse {
        height: client.height,
        weight: client.weight,
        bodyfat: client.body_fat,
    }))
}

/// PATCH /user/clients/select-trainers - point the caller at a trainer.
pub async fn select_trainer(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;
    let req: SelectTrainerRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let trainer_id = validation::require_i64(req.trainer_id, "TrainerID", &mut errors);
    validation::finish(errors)?;

    state
        .user_service
        .select_trainer(&email, trainer_id)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot select trainer while being trainer",
                "select trainer failed",
            )
        })?;

    Ok(Json(OkResponse::ok()))
}

/// POST /user/clients/metrics - log a body measurement.
pub async fn add_metrics(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;
    let req: AddMetricsRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let height = validation::require_f64(req.height, "Height", &mut errors);
    let weight = validation::require_f64(req.weight, "Weight", &mut errors);
    let body_fat = validation::require_f64(req.bodyfat, "Bodyfat", &mut errors);
    let bmi = validation::require_f64(req.bmi, "BMI", &mut errors);
    let measured_at = match req.measured_at.as_deref() {
        None | Some("") => {
            errors.push(validation::required_message("MeasuredAt"));
            None
        }
        Some(raw) => match wire_time::parse(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(validation::invalid_message("MeasuredAt"));
                None
            }
        },
    };
    validation::finish(errors)?;
    let measured_at = match measured_at {
        Some(measured_at) => measured_at,
        None => return Err(ApiError::bad_request(validation::invalid_message("MeasuredAt"))),
    };

    state
        .user_service
        .add_metrics(&email, height, weight, body_fat, bmi, measured_at)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot add metrics while being trainer",
                "add metrics failed",
            )
        })?;

    Ok(Json(OkResponse::ok()))
}

/// GET /user/clients/metrics - the caller's measurement history.
pub async fn get_metrics(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<Metric>>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;

    let metrics = state.user_service.get_metrics(&email).await.map_err(|e| {
        map_service_error(
            e,
            "cannot get metrics while being trainer",
            "get metrics failed",
        )
    })?;

    Ok(Json(metrics))
}
