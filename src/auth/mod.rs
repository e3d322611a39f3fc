pub mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::AdminError;

pub use store::{
    clear_cookie_header, cookie_value, set_cookie_header, CookieFileStore, MemoryTokenStore, StoredCookie,
    TokenStore,
};

/// The caller's authentication state for one request or one CLI invocation.
///
/// Only presence of the token matters; its contents are never inspected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_token(token: Option<String>) -> Self {
        token.map(Self::new).unwrap_or_default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `Authorization` header value, when there is a token to send
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

/// Login/logout over a token store
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn TokenStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn is_authenticated(&self) -> Result<bool, AdminError> {
        Ok(self.store.get()?.is_some())
    }

    pub fn session(&self) -> Result<Session, AdminError> {
        Ok(Session::from_token(self.store.get()?))
    }

    pub fn login(&self, token: &str) -> Result<Session, AdminError> {
        self.store.set(token)?;
        Ok(Session::new(token))
    }

    pub fn logout(&self) -> Result<(), AdminError> {
        self.store.remove()
    }

    /// Exchanges credentials for a token and stores it
    pub async fn login_with_credentials(&self, api: &ApiClient, credentials: &Credentials) -> Result<Session, AdminError> {
        let token = request_token(api, credentials).await?;
        tracing::info!("Logged in as {}", credentials.email);
        self.login(&token)
    }
}

/// `POST /auth/login`, returning the issued access token
pub async fn request_token(api: &ApiClient, credentials: &Credentials) -> Result<String, AdminError> {
    let response: LoginResponse = api.post_json("auth/login", credentials).await?;
    response
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AdminError::auth("login response did not include an access token"))
}
