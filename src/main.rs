//! user-api — serves the filtered user dataset behind JWT authentication.
//!
//! Reads config from env vars (a `.env` file is honored):
//!   JWT_SECRET           — HMAC secret for access tokens (required)
//!   API_USERNAME         — login accepted by /token (required)
//!   API_PASSWORD         — password accepted by /token (required)
//!   TOKEN_TTL_MINUTES    — access token lifetime (default: 30)
//!   USERS_API_BIND       — listen address (default: 127.0.0.1:8000)
//!   FILTERED_USERS_FILE  — dataset path (default: data/filtered_users.json)

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use user_aggregator::auth::{CredentialVerifier, EnvCredentials, JwtConfig};
use user_aggregator::routes::build_router;
use user_aggregator::user_directory::UserDirectory;

fn setup_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,user_api=debug"));

    fmt().with_env_filter(env_filter).init();
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let jwt_secret = env_var("JWT_SECRET")?;
    let username = env_var("API_USERNAME")?;
    let password = env_var("API_PASSWORD")?;
    let ttl_minutes: u64 = std::env::var("TOKEN_TTL_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let bind_addr =
        std::env::var("USERS_API_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let data_file = PathBuf::from(
        std::env::var("FILTERED_USERS_FILE")
            .unwrap_or_else(|_| "data/filtered_users.json".to_string()),
    );

    let directory = Arc::new(
        UserDirectory::load(&data_file)
            .with_context(|| format!("Failed to load dataset from {}", data_file.display()))?,
    );
    info!(
        "Loaded {} users from {}",
        directory.len(),
        data_file.display()
    );

    let verifier: Arc<dyn CredentialVerifier> = Arc::new(EnvCredentials::new(username, password));
    let jwt = JwtConfig::from_secret(jwt_secret.as_bytes(), ttl_minutes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(directory, verifier, jwt).layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("Listening on {bind_addr}");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
