use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::models::{Client, Metric, ProgressReport, Role, Trainer, TrainerStatus, TrainingPlan, User};
use crate::storage::postgres::DEFAULT_TRAINER_ID;
use crate::storage::{NewMetric, Storage};

use super::{map_write_error, ServiceError};

/// Role-gated profile, plan, report and metric operations. Every operation
/// resolves the caller by email first and checks the stored role before
/// touching any other row.
pub struct UserService {
    storage: Arc<dyn Storage>,
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn user_with_role(&self, email: &str, role: Role) -> Result<User, ServiceError> {
        let user = self
            .storage
            .get_user(email)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or_else(|| {
                error!("user with email <{email}> not found");
                ServiceError::UserNotFound
            })?;

        if user.role != role {
            info!("{email} is a {}, rejecting {role} operation", user.role);
            return Err(ServiceError::InvalidRoleRequest);
        }
        Ok(user)
    }

    async fn trainer_profile(&self, email: &str) -> Result<Trainer, ServiceError> {
        let user = self.user_with_role(email, Role::Trainer).await?;
        self.storage
            .get_trainer_by_user_id(user.id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::TrainerNotFound)
    }

    async fn client_profile(&self, email: &str) -> Result<Client, ServiceError> {
        let user = self.user_with_role(email, Role::Client).await?;
        self.storage
            .get_client_by_user_id(user.id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::ClientNotFound)
    }

    pub async fn create_trainer(
        &self,
        email: &str,
        qualification: &str,
        experience: &str,
        achievement: &str,
    ) -> Result<(), ServiceError> {
        let user = self.user_with_role(email, Role::Trainer).await?;
        self.storage
            .save_trainer(user.id, qualification, experience, achievement)
            .await
            .map_err(map_write_error)?;
        info!("trainer profile saved for {email}");
        Ok(())
    }

    pub async fn create_client(
        &self,
        email: &str,
        height: f64,
        weight: f64,
        body_fat: f64,
    ) -> Result<(), ServiceError> {
        let user = self.user_with_role(email, Role::Client).await?;
        self.storage
            .save_client(user.id, DEFAULT_TRAINER_ID, height, weight, body_fat)
            .await
            .map_err(map_write_error)?;
        info!("client profile saved for {email}");
        Ok(())
    }

    /// Points the caller's client profile at `trainer_id`. Only trainers in
    /// `ACTIVE` status can be selected.
    pub async fn select_trainer(
        &self,
        client_email: &str,
        trainer_id: i64,
    ) -> Result<(), ServiceError> {
        let client = self.client_profile(client_email).await?;

        let trainer = self
            .storage
            .get_trainer(trainer_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::TrainerNotFound)?;

        if trainer.status != TrainerStatus::Active {
            return Err(ServiceError::NotActiveTrainer);
        }

        self.storage
            .set_client_trainer(client.id, trainer.id)
            .await
            .map_err(ServiceError::Storage)?;
        info!("client {client_email} selected trainer {trainer_id}");
        Ok(())
    }

    pub async fn get_trainer_profile(&self, email: &str) -> Result<Trainer, ServiceError> {
        self.trainer_profile(email).await
    }

    pub async fn get_client_profile(&self, email: &str) -> Result<Client, ServiceError> {
        self.client_profile(email).await
    }

    pub async fn get_trainers_clients(&self, email: &str) -> Result<Vec<Client>, ServiceError> {
        let trainer = self.trainer_profile(email).await?;
        self.storage
            .get_trainers_clients(trainer.id)
            .await
            .map_err(ServiceError::Storage)
    }

    /// Inserts a training plan authored by the calling trainer. The client id
    /// is taken as given; it is not checked against the trainer's roster.
    pub async fn create_plan(
        &self,
        trainer_email: &str,
        client_id: i64,
        description: &str,
        schedule: &str,
    ) -> Result<(), ServiceError> {
        let trainer = self.trainer_profile(trainer_email).await?;
        self.storage
            .save_training_plan(trainer.id, client_id, description, schedule)
            .await
            .map_err(map_write_error)?;
        info!("training plan saved for client {client_id}");
        Ok(())
    }

    pub async fn add_progress_report(
        &self,
        trainer_email: &str,
        comments: &str,
        client_id: i64,
    ) -> Result<(), ServiceError> {
        let trainer = self.trainer_profile(trainer_email).await?;
        self.storage
            .save_progress_report(trainer.id, client_id, comments)
            .await
            .map_err(map_write_error)?;
        info!("progress report saved for client {client_id}");
        Ok(())
    }

    pub async fn add_metrics(
        &self,
        client_email: &str,
        height: f64,
        weight: f64,
        body_fat: f64,
        bmi: f64,
        measured_at: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        let client = self.client_profile(client_email).await?;
        let metric = NewMetric {
            client_id: client.id,
            height,
            weight,
            body_fat,
            bmi,
            measured_at,
        };
        self.storage
            .save_metric(&metric)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    pub async fn get_metrics(&self, client_email: &str) -> Result<Vec<Metric>, ServiceError> {
        let client = self.client_profile(client_email).await?;
        self.storage
            .get_metrics(client.id)
            .await
            .map_err(ServiceError::Storage)
    }

    /// Plan history, scoped by the caller's role: trainers read what they
    /// authored (optionally for one client), clients read what was written
    /// for them.
    pub async fn get_training_plans(
        &self,
        email: &str,
        client_id: Option<i64>,
    ) -> Result<Vec<TrainingPlan>, ServiceError> {
        let user = self
            .storage
            .get_user(email)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::UserNotFound)?;

        match user.role {
            Role::Trainer => {
                let trainer = self
                    .storage
                    .get_trainer_by_user_id(user.id)
                    .await
                    .map_err(ServiceError::Storage)?
                    .ok_or(ServiceError::TrainerNotFound)?;
                self.storage
                    .get_training_plans(trainer.id, client_id)
                    .await
                    .map_err(ServiceError::Storage)
            }
            Role::Client => {
                let client = self
                    .storage
                    .get_client_by_user_id(user.id)
                    .await
                    .map_err(ServiceError::Storage)?
                    .ok_or(ServiceError::ClientNotFound)?;
                self.storage
                    .get_client_training_plans(client.id)
                    .await
                    .map_err(ServiceError::Storage)
            }
        }
    }

    /// Report history, scoped the same way as [`Self::get_training_plans`].
    pub async fn get_progress_reports(
        &self,
        email: &str,
        client_id: Option<i64>,
    ) -> Result<Vec<ProgressReport>, ServiceError> {
        let user = self
            .storage
            .get_user(email)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::UserNotFound)?;

        match user.role {
            Role::Trainer => {
                let trainer = self
                    .storage
                    .get_trainer_by_user_id(user.id)
                    .await
                    .map_err(ServiceError::Storage)?
                    .ok_or(ServiceError::TrainerNotFound)?;
                self.storage
                    .get_progress_reports(trainer.id, client_id)
                    .await
                    .map_err(ServiceError::Storage)
            }
            Role::Client => {
                let client = self
                    .storage
                    .get_client_by_user_id(user.id)
                    .await
                    .map_err(ServiceError::Storage)?
                    .ok_or(ServiceError::ClientNotFound)?;
                self.storage
                    .get_client_progress_reports(client.id)
                    .await
                    .map_err(ServiceError::Storage)
            }
        }
    }
}
