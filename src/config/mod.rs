pub mod resources;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::types::SortDirection;

pub use resources::{Column, ResourceDefinition, ResourceRegistry, SortOption};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub list: ListConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, every resource endpoint is resolved against it
    pub base_url: String,
    /// None keeps the transport default
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub default_page_size: u32,
    pub default_order_by: String,
    pub default_order_way: SortDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub resources_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("BACKEND_API_URI") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("ADMIN_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().ok();
        }

        // Session overrides
        if let Ok(v) = env::var("ADMIN_TOKEN_COOKIE") {
            if !v.trim().is_empty() {
                self.session.cookie_name = v;
            }
        }
        if let Ok(v) = env::var("ADMIN_TOKEN_TTL_MINUTES") {
            self.session.ttl_minutes = v.parse().unwrap_or(self.session.ttl_minutes);
        }
        if let Ok(v) = env::var("ADMIN_SECURE_COOKIE") {
            self.session.secure_cookie = v.parse().unwrap_or(self.session.secure_cookie);
        }

        // List overrides
        if let Ok(v) = env::var("ADMIN_DEFAULT_PAGE_SIZE") {
            self.list.default_page_size = v.parse().unwrap_or(self.list.default_page_size);
        }
        if let Ok(v) = env::var("ADMIN_DEFAULT_ORDER_BY") {
            self.list.default_order_by = v;
        }
        if let Ok(v) = env::var("ADMIN_DEFAULT_ORDER_WAY") {
            self.list.default_order_way = v.parse().unwrap_or(self.list.default_order_way);
        }

        // Server overrides
        if let Some(port) = env::var("ADMIN_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("ADMIN_RESOURCES_FILE") {
            self.server.resources_file = Some(PathBuf::from(v));
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                request_timeout_secs: None,
            },
            session: SessionConfig::default(),
            list: ListConfig::default(),
            server: ServerConfig {
                port: 3000,
                resources_file: None,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging-api.example.com/api".to_string(),
                request_timeout_secs: None,
            },
            session: SessionConfig {
                secure_cookie: true,
                ..SessionConfig::default()
            },
            list: ListConfig::default(),
            server: ServerConfig {
                port: 3000,
                resources_file: None,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com/api".to_string(),
                request_timeout_secs: None,
            },
            session: SessionConfig {
                secure_cookie: true,
                ..SessionConfig::default()
            },
            list: ListConfig::default(),
            server: ServerConfig {
                port: 3000,
                resources_file: None,
            },
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "jwt-mao-doce-key".to_string(),
            ttl_minutes: 30,
            secure_cookie: false,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_page_size: 30,
            default_order_by: "updated_at".to_string(),
            default_order_way: SortDirection::Desc,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
