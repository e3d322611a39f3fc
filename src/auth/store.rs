use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::AdminError;

/// A cookie as the admin keeps it: the token plus when it stops counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, ttl_minutes: i64) -> Self {
        let expires_at = (ttl_minutes > 0).then(|| Utc::now() + Duration::minutes(ttl_minutes));
        Self {
            name: name.into(),
            value: value.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Where the bearer token lives between requests.
///
/// Expired cookies read back as absent, the same way a browser drops them.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, AdminError>;
    fn set(&self, token: &str) -> Result<(), AdminError>;
    fn remove(&self) -> Result<(), AdminError>;
}

#[derive(Debug)]
pub struct MemoryTokenStore {
    cookie_name: String,
    ttl_minutes: i64,
    cookie: Mutex<Option<StoredCookie>>,
}

impl MemoryTokenStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            ttl_minutes: config.ttl_minutes,
            cookie: Mutex::new(None),
        }
    }

    /// Seeds the store with an already-issued cookie
    pub fn with_cookie(config: &SessionConfig, cookie: StoredCookie) -> Self {
        let store = Self::new(config);
        *store.lock() = Some(cookie);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredCookie>> {
        self.cookie.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, AdminError> {
        let cookie = self.lock();
        Ok(cookie
            .as_ref()
            .filter(|c| !c.is_expired(Utc::now()))
            .map(|c| c.value.clone()))
    }

    fn set(&self, token: &str) -> Result<(), AdminError> {
        *self.lock() = Some(StoredCookie::new(&self.cookie_name, token, self.ttl_minutes));
        Ok(())
    }

    fn remove(&self) -> Result<(), AdminError> {
        *self.lock() = None;
        Ok(())
    }
}

/// Cookie jar file used by the CLI, one JSON document per cookie name.
#[derive(Debug, Clone)]
pub struct CookieFileStore {
    path: PathBuf,
    cookie_name: String,
    ttl_minutes: i64,
}

impl CookieFileStore {
    pub fn new(dir: &Path, config: &SessionConfig) -> Self {
        Self {
            path: dir.join(format!("{}.cookie.json", config.cookie_name)),
            cookie_name: config.cookie_name.clone(),
            ttl_minutes: config.ttl_minutes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_cookie(&self) -> Result<Option<StoredCookie>, AdminError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AdminError::Config(format!("cannot read {}: {e}", self.path.display())))?;
        match serde_json::from_str::<StoredCookie>(&content) {
            Ok(cookie) => Ok(Some(cookie)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cookie file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }
}

impl TokenStore for CookieFileStore {
    fn get(&self) -> Result<Option<String>, AdminError> {
        Ok(self
            .read_cookie()?
            .filter(|c| c.name == self.cookie_name && !c.is_expired(Utc::now()))
            .map(|c| c.value))
    }

    fn set(&self, token: &str) -> Result<(), AdminError> {
        let cookie = StoredCookie::new(&self.cookie_name, token, self.ttl_minutes);
        let content = serde_json::to_string_pretty(&cookie)
            .map_err(|e| AdminError::Config(e.to_string()))?;
        fs::write(&self.path, content)
            .map_err(|e| AdminError::Config(format!("cannot write {}: {e}", self.path.display())))
    }

    fn remove(&self) -> Result<(), AdminError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| AdminError::Config(format!("cannot remove {}: {e}", self.path.display())))?;
        }
        Ok(())
    }
}

/// Reads one cookie out of the request's `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value issuing the token
pub fn set_cookie_header(config: &SessionConfig, token: &str) -> String {
    let mut header = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", config.cookie_name, token);
    if config.ttl_minutes > 0 {
        header.push_str(&format!("; Max-Age={}", config.ttl_minutes * 60));
    }
    if config.secure_cookie {
        header.push_str("; Secure");
    }
    header
}

/// `Set-Cookie` value deleting the token
pub fn clear_cookie_header(config: &SessionConfig) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", config.cookie_name)
}
