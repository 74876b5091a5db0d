use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::models::{Client, Metric, ProgressReport, Role, Trainer, TrainingPlan, User};

use super::{NewMetric, Storage, StorageError};

/// Seeded placeholder trainer assigned to clients that have not selected one.
pub const DEFAULT_TRAINER_ID: i64 = 1;

const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
const SQLSTATE_STRING_TOO_LONG: &str = "22001";

/// Persistence gateway backed by Postgres.
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect to `dsn`, run the schema migration, and seed the default
    /// trainer row.
    pub async fn new(dsn: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(dsn)
            .await?;

        let storage = Self { pool };
        storage.migrate().await?;
        storage.seed_default_trainer().await?;
        Ok(storage)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        self.create_enum("role_enum", "CREATE TYPE role_enum AS ENUM ('trainer', 'client')")
            .await?;
        self.create_enum(
            "status_enum",
            "CREATE TYPE status_enum AS ENUM ('ACTIVE', 'BUSY', 'ON_VACATION')",
        )
        .await?;

        for ddl in TABLES {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        info!("database schema is up to date");
        Ok(())
    }

    /// `CREATE TYPE` has no `IF NOT EXISTS`, so presence is checked in
    /// `pg_type` first.
    async fn create_enum(&self, name: &str, ddl: &str) -> Result<(), StorageError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_type WHERE typname = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Inserts the dummy trainer (id = 1) and its backing user, then bumps
    /// the sequences past the fixed ids.
    async fn seed_default_trainer(&self) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO users (id, email, name, role) \
             VALUES ($1, 'default.trainer@fitcoach.local', 'Default Trainer', 'trainer') \
             ON CONFLICT DO NOTHING",
        )
        .bind(DEFAULT_TRAINER_ID)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO trainers (id, user_id) VALUES ($1, $1) ON CONFLICT DO NOTHING",
        )
        .bind(DEFAULT_TRAINER_ID)
        .execute(&self.pool)
        .await?;

        sqlx::query("SELECT setval('users_id_seq', (SELECT MAX(id) FROM users))")
            .execute(&self.pool)
            .await?;
        sqlx::query("SELECT setval('trainers_id_seq', (SELECT MAX(id) FROM trainers))")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(100) NOT NULL UNIQUE,
        name VARCHAR(100) NOT NULL,
        role role_enum NOT NULL,
        registered_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS trainers (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE REFERENCES users(id),
        qualifications VARCHAR(150) NOT NULL DEFAULT '',
        experience VARCHAR(250) NOT NULL DEFAULT '',
        achievements VARCHAR(250) NOT NULL DEFAULT '',
        status status_enum NOT NULL DEFAULT 'ACTIVE'
    )",
    "CREATE TABLE IF NOT EXISTS clients (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE REFERENCES users(id),
        trainer_id BIGINT NOT NULL DEFAULT 1 REFERENCES trainers(id),
        height DOUBLE PRECISION NOT NULL DEFAULT 0,
        weight DOUBLE PRECISION NOT NULL DEFAULT 0,
        body_fat DOUBLE PRECISION NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS training_plans (
        id BIGSERIAL PRIMARY KEY,
        trainer_id BIGINT NOT NULL REFERENCES trainers(id),
        client_id BIGINT NOT NULL REFERENCES clients(id),
        description TEXT NOT NULL,
        schedule TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS progress_reports (
        id BIGSERIAL PRIMARY KEY,
        trainer_id BIGINT NOT NULL REFERENCES trainers(id),
        client_id BIGINT NOT NULL REFERENCES clients(id),
        comments TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS metrics (
        id BIGSERIAL PRIMARY KEY,
        client_id BIGINT NOT NULL REFERENCES clients(id),
        height DOUBLE PRECISION NOT NULL,
        weight DOUBLE PRECISION NOT NULL,
        body_fat DOUBLE PRECISION NOT NULL,
        bmi DOUBLE PRECISION NOT NULL,
        measured_at TIMESTAMP NOT NULL
    )",
];

/// Map driver errors onto the storage taxonomy using the structured
/// SQLSTATE diagnostics.
fn classify(err: sqlx::Error) -> StorageError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return StorageError::NotFound;
    }

    let code = match &err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    };

    match code.as_deref() {
        Some(SQLSTATE_UNIQUE_VIOLATION) => StorageError::DuplicateKey,
        Some(SQLSTATE_STRING_TOO_LONG) => StorageError::FieldIsTooLong,
        _ => StorageError::Database(err),
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn save_user(&self, email: &str, name: &str, role: Role) -> Result<i64, StorageError> {
        sqlx::query_scalar(
            "INSERT INTO users (email, name, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(email)
        .bind(name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>, StorageError> {
        sqlx::query_as(
            "SELECT id, email, name, role, registered_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn save_trainer(
        &self,
        user_id: i64,
        qualifications: &str,
        experience: &str,
        achievements: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO trainers (user_id, qualifications, experience, achievements) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 qualifications = EXCLUDED.qualifications, \
                 experience = EXCLUDED.experience, \
                 achievements = EXCLUDED.achievements",
        )
        .bind(user_id)
        .bind(qualifications)
        .bind(experience)
        .bind(achievements)
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn get_trainer(&self, id: i64) -> Result<Option<Trainer>, StorageError> {
        sqlx::query_as(
            "SELECT id, user_id, qualifications, experience, achievements, status \
             FROM trainers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_trainer_by_user_id(&self, user_id: i64) -> Result<Option<Trainer>, StorageError> {
        sqlx::query_as(
            "SELECT id, user_id, qualifications, experience, achievements, status \
             FROM trainers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn save_client(
        &self,
        user_id: i64,
        trainer_id: i64,
        height: f64,
        weight: f64,
        body_fat: f64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO clients (user_id, trainer_id, height, weight, body_fat) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 height = EXCLUDED.height, \
                 weight = EXCLUDED.weight, \
                 body_fat = EXCLUDED.body_fat",
        )
        .bind(user_id)
        .bind(trainer_id)
        .bind(height)
        .bind(weight)
        .bind(body_fat)
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn get_client_by_user_id(&self, user_id: i64) -> Result<Option<Client>, StorageError> {
        sqlx::query_as(
            "SELECT id, user_id, trainer_id, height, weight, body_fat \
             FROM clients WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn set_client_trainer(
        &self,
        client_id: i64,
        trainer_id: i64,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE clients SET trainer_id = $1 WHERE id = $2")
            .bind(trainer_id)
            .bind(client_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_trainers_clients(&self, trainer_id: i64) -> Result<Vec<Client>, StorageError> {
        sqlx::query_as(
            "SELECT id, user_id, trainer_id, height, weight, body_fat \
             FROM clients WHERE trainer_id = $1 ORDER BY id",
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn save_training_plan(
        &self,
        trainer_id: i64,
        client_id: i64,
        description: &str,
        schedule: &str,
    ) -> Result<i64, StorageError> {
        sqlx::query_scalar(
            "INSERT INTO training_plans (trainer_id, client_id, description, schedule) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(trainer_id)
        .bind(client_id)
        .bind(description)
        .bind(schedule)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_training_plans(
        &self,
        trainer_id: i64,
        client_id: Option<i64>,
    ) -> Result<Vec<TrainingPlan>, StorageError> {
        match client_id {
            Some(client_id) => sqlx::query_as(
                "SELECT id, trainer_id, client_id, description, schedule, created_at \
                 FROM training_plans WHERE trainer_id = $1 AND client_id = $2 ORDER BY id",
            )
            .bind(trainer_id)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify),
            None => sqlx::query_as(
                "SELECT id, trainer_id, client_id, description, schedule, created_at \
                 FROM training_plans WHERE trainer_id = $1 ORDER BY id",
            )
            .bind(trainer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify),
        }
    }

    async fn get_client_training_plans(
        &self,
        client_id: i64,
    ) -> Result<Vec<TrainingPlan>, StorageError> {
        sqlx::query_as(
            "SELECT id, trainer_id, client_id, description, schedule, created_at \
             FROM training_plans WHERE client_id = $1 ORDER BY id",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn save_progress_report(
        &self,
        trainer_id: i64,
        client_id: i64,
        comments: &str,
    ) -> Result<i64, StorageError> {
        sqlx::query_scalar(
            "INSERT INTO progress_reports (trainer_id, client_id, comments) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(trainer_id)
        .bind(client_id)
        .bind(comments)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_progress_reports(
        &self,
        trainer_id: i64,
        client_id: Option<i64>,
    ) -> Result<Vec<ProgressReport>, StorageError> {
        match client_id {
            Some(client_id) => sqlx::query_as(
                "SELECT id, trainer_id, client_id, comments, created_at \
                 FROM progress_reports WHERE trainer_id = $1 AND client_id = $2 ORDER BY id",
            )
            .bind(trainer_id)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify),
            None => sqlx::query_as(
                "SELECT id, trainer_id, client_id, comments, created_at \
                 FROM progress_reports WHERE trainer_id = $1 ORDER BY id",
            )
            .bind(trainer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify),
        }
    }

    async fn get_client_progress_reports(
        &self,
        client_id: i64,
    ) -> Result<Vec<ProgressReport>, StorageError> {
        sqlx::query_as(
            "SELECT id, trainer_id, client_id, comments, created_at \
             FROM progress_reports WHERE client_id = $1 ORDER BY id",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn save_metric(&self, metric: &NewMetric) -> Result<i64, StorageError> {
        sqlx::query_scalar(
            "INSERT INTO metrics (client_id, height, weight, body_fat, bmi, measured_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(metric.client_id)
        .bind(metric.height)
        .bind(metric.weight)
        .bind(metric.body_fat)
        .bind(metric.bmi)
        .bind(metric.measured_at)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn get_metrics(&self, client_id: i64) -> Result<Vec<Metric>, StorageError> {
        sqlx::query_as(
            "SELECT id, client_id, height, weight, body_fat, bmi, measured_at \
             FROM metrics WHERE client_id = $1 ORDER BY id",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }
}
