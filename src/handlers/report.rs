use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::OkResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::ProgressReport;
use crate::server::AppState;

use super::{caller_email, decode_body, map_service_error, validation};

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    #[serde(rename = "client-id")]
    pub client_id: Option<i64>,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportHistoryQuery {
    #[serde(rename = "client-id")]
    pub client_id: Option<i64>,
}

/// POST /user/progress-report - record a progress report for a client.
pub async fn create_report(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;
    let req: CreateReportRequest = decode_body(&body)?;

    let mut errors = Vec::new();
    let client_id = validation::require_i64(req.client_id, "ClientID", &mut errors);
    let comments = validation::require_string(req.comments.as_deref(), "Comments", &mut errors);
    validation::finish(errors)?;

    state
        .user_service
        .add_progress_report(&email, &comments, client_id)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot create progress report while being client",
                "create progress report failed",
            )
        })?;

    Ok(Json(OkResponse::ok()))
}

/// GET /user/progress-report - report history scoped to the caller's role.
pub async fn get_reports(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<ReportHistoryQuery>,
) -> Result<Json<Vec<ProgressReport>>, ApiError> {
    let email = caller_email(auth.as_ref().map(|Extension(user)| user))?;

    let reports = state
        .user_service
        .get_progress_reports(&email, query.client_id)
        .await
        .map_err(|e| {
            map_service_error(
                e,
                "cannot get progress reports for this role",
                "get progress reports failed",
            )
        })?;

    Ok(Json(reports))
}
