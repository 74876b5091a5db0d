use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Account role. Persisted as the Postgres enum `role_enum`; a user holds
/// exactly one role for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainer,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Trainer => write!(f, "trainer"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// Trainer availability. Persisted as the Postgres enum `status_enum`.
/// Only `ACTIVE` trainers can be selected by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "status_enum", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainerStatus {
    Active,
    Busy,
    OnVacation,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(rename = "registered-at")]
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Trainer {
    pub id: i64,
    #[serde(rename = "user-id")]
    pub user_id: i64,
    pub qualifications: String,
    pub experience: String,
    pub achievements: String,
    pub status: TrainerStatus,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Client {
    pub id: i64,
    #[serde(rename = "user-id")]
    pub user_id: i64,
    #[serde(rename = "trainer-id")]
    pub trainer_id: i64,
    pub height: f64,
    pub weight: f64,
    #[serde(rename = "bodyfat")]
    pub body_fat: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainingPlan {
    pub id: i64,
    #[serde(rename = "trainer-id")]
    pub trainer_id: i64,
    #[serde(rename = "client-id")]
    pub client_id: i64,
    pub description: String,
    pub schedule: String,
    #[serde(rename = "created-at")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressReport {
    pub id: i64,
    #[serde(rename = "trainer-id")]
    pub trainer_id: i64,
    #[serde(rename = "client-id")]
    pub client_id: i64,
    pub comments: String,
    #[serde(rename = "created-at")]
    pub created_at: DateTime<Utc>,
}

/// Body measurement logged by a client. `measured_at` travels over the wire
/// in the fixed `YYYY-MM-DD HH:MM:SS` layout, not RFC 3339.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Metric {
    pub id: i64,
    #[serde(rename = "client-id")]
    pub client_id: i64,
    pub height: f64,
    pub weight: f64,
    #[serde(rename = "bodyfat")]
    pub body_fat: f64,
    pub bmi: f64,
    #[serde(rename = "measured-at", with = "wire_time")]
    pub measured_at: NaiveDateTime,
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` timestamp layout used on the
/// metrics wire format.
pub mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
    }
}
