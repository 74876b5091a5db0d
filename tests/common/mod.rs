//! Shared test harness: an in-memory persistence gateway and a stub
//! authorization service, wired into the real router so tests exercise the
//! full decode -> validate -> middleware -> service -> storage path.

// Each integration test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use fitcoach_api::auth_client::{AuthApi, AuthClientError, Credentials};
use fitcoach_api::models::{
    Client, Metric, ProgressReport, Role, Trainer, TrainerStatus, TrainingPlan, User,
};
use fitcoach_api::server::{app, AppState};
use fitcoach_api::storage::{NewMetric, Storage, StorageError};

pub const DEFAULT_TRAINER_ID: i64 = 1;

/// In-memory stand-in for the Postgres gateway. Mirrors its constraint
/// behavior: unique emails, unique profile per user, varchar length limits,
/// and the seeded default trainer.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: Mutex<Tables>,
    next_id: AtomicI64,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    trainers: Vec<Trainer>,
    clients: Vec<Client>,
    plans: Vec<TrainingPlan>,
    reports: Vec<ProgressReport>,
    metrics: Vec<Metric>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        let storage = Self {
            inner: Mutex::default(),
            next_id: AtomicI64::new(2),
        };
        {
            let mut tables = storage.inner.lock().unwrap();
            tables.users.push(User {
                id: DEFAULT_TRAINER_ID,
                email: "default.trainer@fitcoach.local".into(),
                name: "Default Trainer".into(),
                role: Role::Trainer,
                registered_at: chrono::Utc::now(),
            });
            tables.trainers.push(Trainer {
                id: DEFAULT_TRAINER_ID,
                user_id: DEFAULT_TRAINER_ID,
                qualifications: String::new(),
                experience: String::new(),
                achievements: String::new(),
                status: TrainerStatus::Active,
            });
        }
        storage
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Flip a trainer's status, for NotActiveTrainer scenarios.
    pub fn set_trainer_status(&self, trainer_id: i64, status: TrainerStatus) {
        let mut tables = self.inner.lock().unwrap();
        if let Some(trainer) = tables.trainers.iter_mut().find(|t| t.id == trainer_id) {
            trainer.status = status;
        }
    }

    pub fn trainer_of_client(&self, client_id: i64) -> Option<i64> {
        let tables = self.inner.lock().unwrap();
        tables
            .clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.trainer_id)
    }

    pub fn client_id_for(&self, email: &str) -> Option<i64> {
        let tables = self.inner.lock().unwrap();
        let user = tables.users.iter().find(|u| u.email == email)?;
        tables
            .clients
            .iter()
            .find(|c| c.user_id == user.id)
            .map(|c| c.id)
    }

    pub fn trainer_id_for(&self, email: &str) -> Option<i64> {
        let tables = self.inner.lock().unwrap();
        let user = tables.users.iter().find(|u| u.email == email)?;
        tables
            .trainers
            .iter()
            .find(|t| t.user_id == user.id)
            .map(|t| t.id)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn save_user(&self, email: &str, name: &str, role: Role) -> Result<i64, StorageError> {
        if email.len() > 100 || name.len() > 100 {
            return Err(StorageError::FieldIsTooLong);
        }
        let mut tables = self.inner.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StorageError::DuplicateKey);
        }
        drop(tables);
        let id = self.alloc_id();
        let mut tables = self.inner.lock().unwrap();
        tables.users.push(User {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role,
            registered_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn save_trainer(
        &self,
        user_id: i64,
        qualifications: &str,
        experience: &str,
        achievements: &str,
    ) -> Result<(), StorageError> {
        if qualifications.len() > 150 || experience.len() > 250 || achievements.len() > 250 {
            return Err(StorageError::FieldIsTooLong);
        }
        let id = self.alloc_id();
        let mut tables = self.inner.lock().unwrap();
        if let Some(existing) = tables.trainers.iter_mut().find(|t| t.user_id == user_id) {
            existing.qualifications = qualifications.to_string();
            existing.experience = experience.to_string();
            existing.achievements = achievements.to_string();
            return Ok(());
        }
        tables.trainers.push(Trainer {
            id,
            user_id,
            qualifications: qualifications.to_string(),
            experience: experience.to_string(),
            achievements: achievements.to_string(),
            status: TrainerStatus::Active,
        });
        Ok(())
    }

    async fn get_trainer(&self, id: i64) -> Result<Option<Trainer>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables.trainers.iter().find(|t| t.id == id).cloned())
    }

    async fn get_trainer_by_user_id(&self, user_id: i64) -> Result<Option<Trainer>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables.trainers.iter().find(|t| t.user_id == user_id).cloned())
    }

    async fn save_client(
        &self,
        user_id: i64,
        trainer_id: i64,
        height: f64,
        weight: f64,
        body_fat: f64,
    ) -> Result<(), StorageError> {
        let id = self.alloc_id();
        let mut tables = self.inner.lock().unwrap();
        if let Some(existing) = tables.clients.iter_mut().find(|c| c.user_id == user_id) {
            existing.height = height;
            existing.weight = weight;
            existing.body_fat = body_fat;
            return Ok(());
        }
        tables.clients.push(Client {
            id,
            user_id,
            trainer_id,
            height,
            weight,
            body_fat,
        });
        Ok(())
    }

    async fn get_client_by_user_id(&self, user_id: i64) -> Result<Option<Client>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables.clients.iter().find(|c| c.user_id == user_id).cloned())
    }

    async fn set_client_trainer(
        &self,
        client_id: i64,
        trainer_id: i64,
    ) -> Result<(), StorageError> {
        let mut tables = self.inner.lock().unwrap();
        match tables.clients.iter_mut().find(|c| c.id == client_id) {
            Some(client) => {
                client.trainer_id = trainer_id;
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn get_trainers_clients(&self, trainer_id: i64) -> Result<Vec<Client>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .clients
            .iter()
            .filter(|c| c.trainer_id == trainer_id)
            .cloned()
            .collect())
    }

    async fn save_training_plan(
        &self,
        trainer_id: i64,
        client_id: i64,
        description: &str,
        schedule: &str,
    ) -> Result<i64, StorageError> {
        let id = self.alloc_id();
        let mut tables = self.inner.lock().unwrap();
        tables.plans.push(TrainingPlan {
            id,
            trainer_id,
            client_id,
            description: description.to_string(),
            schedule: schedule.to_string(),
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn get_training_plans(
        &self,
        trainer_id: i64,
        client_id: Option<i64>,
    ) -> Result<Vec<TrainingPlan>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .plans
            .iter()
            .filter(|p| {
                p.trainer_id == trainer_id && client_id.map_or(true, |id| p.client_id == id)
            })
            .cloned()
            .collect())
    }

    async fn get_client_training_plans(
        &self,
        client_id: i64,
    ) -> Result<Vec<TrainingPlan>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .plans
            .iter()
            .filter(|p| p.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn save_progress_report(
        &self,
        trainer_id: i64,
        client_id: i64,
        comments: &str,
    ) -> Result<i64, StorageError> {
        let id = self.alloc_id();
        let mut tables = self.inner.lock().unwrap();
        tables.reports.push(ProgressReport {
            id,
            trainer_id,
            client_id,
            comments: comments.to_string(),
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn get_progress_reports(
        &self,
        trainer_id: i64,
        client_id: Option<i64>,
    ) -> Result<Vec<ProgressReport>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .reports
            .iter()
            .filter(|r| {
                r.trainer_id == trainer_id && client_id.map_or(true, |id| r.client_id == id)
            })
            .cloned()
            .collect())
    }

    async fn get_client_progress_reports(
        &self,
        client_id: i64,
    ) -> Result<Vec<ProgressReport>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .reports
            .iter()
            .filter(|r| r.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn save_metric(&self, metric: &NewMetric) -> Result<i64, StorageError> {
        let id = self.alloc_id();
        let mut tables = self.inner.lock().unwrap();
        tables.metrics.push(Metric {
            id,
            client_id: metric.client_id,
            height: metric.height,
            weight: metric.weight,
            body_fat: metric.body_fat,
            bmi: metric.bmi,
            measured_at: metric.measured_at,
        });
        Ok(id)
    }

    async fn get_metrics(&self, client_id: i64) -> Result<Vec<Metric>, StorageError> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .metrics
            .iter()
            .filter(|m| m.client_id == client_id)
            .cloned()
            .collect())
    }
}

/// Stub authorization service: registration issues a deterministic token,
/// login checks the recorded password, and token validation resolves back to
/// the login that produced the token.
#[derive(Default)]
pub struct StubAuthService {
    credentials: Mutex<HashMap<String, String>>,
    tokens: Mutex<HashMap<String, String>>,
}

impl StubAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_token(&self, login: &str) -> String {
        let token = format!("token-for-{login}");
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), login.to_string());
        token
    }
}

#[async_trait]
impl AuthApi for StubAuthService {
    async fn register_user(&self, credentials: &Credentials) -> Result<String, AuthClientError> {
        self.credentials
            .lock()
            .unwrap()
            .insert(credentials.login.clone(), credentials.password.clone());
        Ok(self.issue_token(&credentials.login))
    }

    async fn login_user(&self, credentials: &Credentials) -> Result<String, AuthClientError> {
        let known = self.credentials.lock().unwrap();
        match known.get(&credentials.login) {
            Some(password) if *password == credentials.password => {
                drop(known);
                Ok(self.issue_token(&credentials.login))
            }
            _ => Err(AuthClientError::UserNotFound),
        }
    }

    async fn validate_token(&self, token: &str) -> Result<String, AuthClientError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthClientError::InvalidToken)
    }
}

pub struct TestApp {
    pub router: Router,
    pub storage: Arc<InMemoryStorage>,
}

pub fn test_app() -> TestApp {
    let storage = Arc::new(InMemoryStorage::new());
    let auth = Arc::new(StubAuthService::new());
    let state = AppState::new(storage.clone(), auth);
    TestApp {
        router: app(state),
        storage,
    }
}

pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = builder.body(body).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Same as [`request`], but with a raw (possibly malformed) body.
pub async fn request_raw(
    router: &Router,
    method: &str,
    uri: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Register a user through the API and return the issued bearer token.
pub async fn register(router: &Router, email: &str, role: &str) -> String {
    let (status, body) = request(
        router,
        "POST",
        "/authorization/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "password123",
            "name": "Test User",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"].as_str().expect("token in response").to_string()
}
