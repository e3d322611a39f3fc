use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{AuthService, CookieFileStore, Session};
use crate::config::{config, ResourceRegistry};

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("ADMIN_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("crud-admin").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Cookie jar holding the CLI's token between invocations
pub fn token_store() -> anyhow::Result<CookieFileStore> {
    Ok(CookieFileStore::new(&get_config_dir()?, &config().session))
}

pub fn auth_service() -> anyhow::Result<AuthService> {
    Ok(AuthService::new(Arc::new(token_store()?)))
}

/// Session read from the cookie jar; anonymous when missing or expired
pub fn load_session() -> anyhow::Result<Session> {
    Ok(auth_service()?.session()?)
}

pub fn api_client(session: Session) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::from_config(&config().api, session)?)
}

pub fn registry() -> anyhow::Result<ResourceRegistry> {
    Ok(ResourceRegistry::from_config(config())?)
}
