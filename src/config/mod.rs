use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    Missing(String),

    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    pub db: DatabaseConfig,
    pub auth_client: AuthClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_secs: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_username")]
    pub username: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub dbname: String,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Never read from the config file; filled in from the DB_PASSWORD env.
    #[serde(skip)]
    pub password: String,
}

impl DatabaseConfig {
    pub fn dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username, self.password, self.host, self.port, self.dbname, self.sslmode
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthClientConfig {
    pub baseurl: String,
    #[serde(default = "default_auth_timeout")]
    pub timeout_secs: u64,
}

fn default_env() -> String {
    "local".to_string()
}

fn default_db_username() -> String {
    "postgres".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_sslmode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_auth_timeout() -> u64 {
    10
}

impl AppConfig {
    /// Load the YAML config file. The database password comes from the
    /// `DB_PASSWORD` environment variable, not the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_yaml::from_str(&raw)?;
        config.db.password = env::var("DB_PASSWORD").unwrap_or_default();
        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.http_server.host, self.http_server.port)
    }
}
