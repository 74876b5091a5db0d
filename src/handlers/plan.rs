use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::OkResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::TrainingPlan;
use crate::server::AppState;

use super::{caller_email, decode_body, map_service_error, validation};

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    #[serde(rename = "client-id")]
    pub client_id: Option<i64>,
    pub description: Option<String>,
    pub schedule: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanHistoryQuery {
    #[serde(rename = "client-id")]
    pub client_id: Option<i64>,
}

/// POST /user/training-plan - author a plan for a client. The client id is
/// taken as given, per the service contract.
pub async fn create_plan(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;
    let req: CreatePlanRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let client_id = validation::require_i64(req.client_id, "ClientID", &mut errors);
    let description =
        validation::require_string(req.description.as_deref(), "Description", &mut errors);
    let schedule = validation::require_string(req.schedule.as_deref(), "Schedule", &mut errors);
    validation::finish(errors)?;

    state
        .user_service
        .create_plan(&email, client_id, &description, &schedule)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot create training plan while being client",
                "create training plan failed",
            )
        })?;

    Ok(Json(OkResponse::ok()))
}

/// GET /user/training-plan - plan history scoped to the caller's role.
pub async fn get_plans(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<PlanHistoryQuery>,
) -> Result<Json<Vec<TrainingPlan>>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;

    let plans = state
        .user_service
        .get_training_plans(&email, query.client_id)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot get training plans for this role",
                "get training plans failed",
            )
        })?;

    Ok(Json(plans))
}
