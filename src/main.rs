use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tower_http::timeout::TimeoutLayer;
use url::Url;

use fitcoach_api::auth_client::HttpAuthClient;
use fitcoach_api::config::AppConfig;
use fitcoach_api::server::{app, AppState};
use fitcoach_api::storage::PgStorage;

#[derive(Debug, Parser)]
#[command(name = "fitcoach-api", about = "Fitness coaching backend API")]
struct Args {
    /// Path to the YAML config file. Falls back to the CONFIG_PATH env var.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DB_PASSWORD and CONFIG_PATH are visible.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from))
        .context("config path is empty: pass --config or set CONFIG_PATH")?;
    let config = AppConfig::load(&config_path)?;
    tracing::info!("starting fitcoach-api in {} mode", config.env);

    let storage = Arc::new(
        PgStorage::new(&config.db.dsn(), config.db.max_connections)
            .await
            .context("failed to init storage")?,
    );

    let base_url = Url::parse(&config.auth_client.baseurl)
        .context("invalid auth_client.baseurl in config")?;
    let auth_client = Arc::new(
        HttpAuthClient::new(base_url, Duration::from_secs(config.auth_client.timeout_secs))
            .context("failed to build auth service client")?,
    );

    let state = AppState::new(storage, auth_client);
    let app = app(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.http_server.timeout_secs,
    )));

    let bind_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("server started on http://{bind_addr}");
    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
