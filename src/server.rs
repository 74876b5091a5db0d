use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth_client::AuthApi;
use crate::handlers::{authorization, client, plan, report, trainer};
use crate::middleware::auth_middleware;
use crate::services::{UserAuthService, UserService};
use crate::storage::Storage;

/// Dependencies wired once at startup and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth_client: Arc<dyn AuthApi>,
    pub user_auth_service: Arc<UserAuthService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, auth_client: Arc<dyn AuthApi>) -> Self {
        let user_auth_service = Arc::new(UserAuthService::new(
            storage.clone(),
            auth_client.clone(),
        ));
        let user_service = Arc::new(UserService::new(storage.clone()));
        Self {
            storage,
            auth_client,
            user_auth_service,
            user_service,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(health))
        .route("/authorization/register", post(authorization::register))
        .route("/authorization/login", post(authorization::login))
        // Bearer-authenticated user API
        .merge(user_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/user/trainers/profile",
            post(trainer::create_profile).get(trainer::get_profile),
        )
        .route("/user/trainers/clients", get(trainer::get_clients))
        .route(
            "/user/training-plan",
            post(plan::create_plan).get(plan::get_plans),
        )
        .route(
            "/user/progress-report",
            post(report::create_report).get(report::get_reports),
        )
        .route(
            "/user/clients/profile",
            post(client::create_profile).get(client::get_profile),
        )
        .route("/user/clients/select-trainers", patch(client::select_trainer))
        .route(
            "/user/clients/metrics",
            post(client::add_metrics).get(client::get_metrics),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "OK", "database": "ok"})),
        ),
        Err(e) => {
            tracing::error!("health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "Error", "error": "database unavailable"})),
            )
        }
    }
}
