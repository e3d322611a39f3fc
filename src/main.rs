use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crud_admin::config::{config, ResourceRegistry};
use crud_admin::is_production;
use crud_admin::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so BACKEND_API_URI and friends are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting CRUD admin in {:?} mode", config.environment);
    tracing::info!("Backend API at {}", config.api.base_url);
    if is_production!() && !config.session.secure_cookie {
        tracing::warn!("Token cookie is not marked Secure in production");
    }

    let registry = ResourceRegistry::from_config(config)?;
    let state = AppState::new(config.clone(), registry)?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    println!("CRUD admin listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
