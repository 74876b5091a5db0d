use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::OkResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{Client, TrainerStatus};
use crate::server::AppState;

use super::{caller_email, decode_body, map_service_error, validation};

#[derive(Debug, Deserialize)]
pub struct CreateTrainerProfileRequest {
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub achievement: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrainerProfileResponse {
    pub qualification: String,
    pub experience: String,
    pub achievements: String,
    pub status: TrainerStatus,
}

/// POST /user/trainers/profile - fill in the caller's trainer profile.
pub async fn create_profile(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;
    let req: CreateTrainerProfileRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let qualification =
        validation::require_string(req.qualification.as_deref(), "Qualification", &mut errors);
    let experience =
        validation::require_string(req.experience.as_deref(), "Experience", &mut errors);
    let achievement =
        validation::require_string(req.achievement.as_deref(), "Achievement", &mut errors);
    validation::finish(errors)?;

    state
        .user_service
        .create_trainer(&email, &qualification, &experience, &achievement)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot create trainer profile while being client",
                "create trainer failed",
            )
        })?;

    Ok(Json(OkResponse::ok()))
}

/// GET /user/trainers/profile - the caller's trainer profile.
pub async fn get_profile(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<TrainerProfileResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;

    let trainer = state
        .user_service
        .get_trainer_profile(&email)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot get trainer profile while being client",
                "get trainer profile failed",
            )
        })?;

    Ok(Json(TrainerProfileResponse {
        qualification: trainer.qualifications,
        experience: trainer.experience,
        achievements: trainer.achievements,
        status: trainer.status,
    }))
}

/// GET /user/trainers/clients - clients assigned to the calling trainer.
pub async fn get_clients(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<Client>>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;

    let clients = state
        .user_service
        .get_trainers_clients(&email)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot list clients while being client",
                "get trainer's clients failed",
            )
        })?;

    Ok(Json(clients))
}
