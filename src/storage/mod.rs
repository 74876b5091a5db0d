use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{Client, Metric, ProgressReport, Role, Trainer, TrainingPlan, User};

pub mod postgres;

pub use postgres::PgStorage;

/// Errors from the persistence gateway. Constraint violations are classified
/// from the driver's structured diagnostics before they reach the services.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate key value violates unique constraint")]
    DuplicateKey,

    #[error("field is too long")]
    FieldIsTooLong,

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// New metric row, as submitted by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    pub client_id: i64,
    pub height: f64,
    pub weight: f64,
    pub body_fat: f64,
    pub bmi: f64,
    pub measured_at: NaiveDateTime,
}

/// Typed CRUD over the six entities. Services depend on this trait, not on
/// the Postgres implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Pings the backing store to confirm connectivity.
    async fn health_check(&self) -> Result<(), StorageError>;

    async fn save_user(&self, email: &str, name: &str, role: Role) -> Result<i64, StorageError>;
    async fn get_user(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Insert the trainer profile for `user_id`, or fill in an existing empty
    /// one created at registration.
    async fn save_trainer(
        &self,
        user_id: i64,
        qualifications: &str,
        experience: &str,
        achievements: &str,
    ) -> Result<(), StorageError>;
    async fn get_trainer(&self, id: i64) -> Result<Option<Trainer>, StorageError>;
    async fn get_trainer_by_user_id(&self, user_id: i64) -> Result<Option<Trainer>, StorageError>;

    /// Insert the client profile for `user_id`, or fill in an existing empty
    /// one created at registration. The trainer assignment is only used on
    /// first insert; a later profile update keeps the selected trainer.
    async fn save_client(
        &self,
        user_id: i64,
        trainer_id: i64,
        height: f64,
        weight: f64,
        body_fat: f64,
    ) -> Result<(), StorageError>;
    async fn get_client_by_user_id(&self, user_id: i64) -> Result<Option<Client>, StorageError>;
    async fn set_client_trainer(
        &self,
        client_id: i64,
        trainer_id: i64,
    ) -> Result<(), StorageError>;
    async fn get_trainers_clients(&self, trainer_id: i64) -> Result<Vec<Client>, StorageError>;

    async fn save_training_plan(
        &self,
        trainer_id: i64,
        client_id: i64,
        description: &str,
        schedule: &str,
    ) -> Result<i64, StorageError>;
    async fn get_training_plans(
        &self,
        trainer_id: i64,
        client_id: Option<i64>,
    ) -> Result<Vec<TrainingPlan>, StorageError>;
    async fn get_client_training_plans(
        &self,
        client_id: i64,
    ) -> Result<Vec<TrainingPlan>, StorageError>;

    async fn save_progress_report(
        &self,
        trainer_id: i64,
        client_id: i64,
        comments: &str,
    ) -> Result<i64, StorageError>;
    async fn get_progress_reports(
        &self,
        trainer_id: i64,
        client_id: Option<i64>,
    ) -> Result<Vec<ProgressReport>, StorageError>;
    async fn get_client_progress_reports(
        &self,
        client_id: i64,
    ) -> Result<Vec<ProgressReport>, StorageError>;

    async fn save_metric(&self, metric: &NewMetric) -> Result<i64, StorageError>;
    async fn get_metrics(&self, client_id: i64) -> Result<Vec<Metric>, StorageError>;
}
