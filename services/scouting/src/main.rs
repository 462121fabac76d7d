use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod players;
mod routes;
mod sessions;
mod settings;
mod state;
mod validation;

use auth::{config::AuthConfig, credentials::CredentialStore};
use common::{
    cache::RedisConfig,
    database::DatabaseConfig,
    demo::DEMO_NOTICE,
    store::PlayerStore,
};
use tokio::net::TcpListener;

use crate::{settings::ServerConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting scouting service");

    let server_config = ServerConfig::load()?;
    let auth_config = AuthConfig::from_env()?;
    info!("Auth configuration: {:?}", auth_config);

    let credentials = Arc::new(CredentialStore::demo()?);
    let reconstructor = auth_config.build_reconstructor(credentials);

    let store = PlayerStore::connect(DatabaseConfig::from_env(), RedisConfig::from_env()).await;
    if store.is_demo() {
        warn!("{}", DEMO_NOTICE);
    }

    let app_state = AppState::new(
        store,
        reconstructor,
        Duration::from_secs(auth_config.session_idle_timeout_secs),
    );

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&server_config.bind_address).await?;
    info!("Scouting service listening on {}", server_config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
