use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::api::format::ErrorEnvelope;
use crate::api::resource::ResourceClient;
use crate::auth::Session;
use crate::config::ApiConfig;
use crate::error::AdminError;

/// HTTP client bound to the backend base URL and to one session.
///
/// Every request carries `Authorization: Bearer <token>` when the session has a
/// token. Requests are single-shot: no retries, no deduplication.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, AdminError> {
        Self::with_http(reqwest::Client::new(), base_url, session)
    }

    pub fn from_config(config: &ApiConfig, session: Session) -> Result<Self, AdminError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| AdminError::Config(format!("cannot build HTTP client: {e}")))?;
        Self::with_http(http, &config.base_url, session)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, session: Session) -> Result<Self, AdminError> {
        // Url::join replaces the last segment unless the base ends with a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            http,
            base_url: Url::parse(&normalized)?,
            session,
        })
    }

    /// Same transport, different caller
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resource client factory
    pub fn resource(&self, endpoint: &str) -> ResourceClient {
        ResourceClient::new(self.clone(), endpoint)
    }

    pub fn url(&self, path: &str) -> Result<Url, AdminError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, AdminError> {
        let url = self.url(path)?;
        let mut builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(bearer) = self.session.bearer() {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }
        Ok(builder)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, AdminError> {
        let builder = self.request(Method::GET, path)?.query(query);
        self.send(builder, Method::GET, path).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, AdminError> {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send(builder, Method::POST, path).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, AdminError> {
        let builder = self.request(Method::PUT, path)?.json(body);
        self.send(builder, Method::PUT, path).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdminError> {
        let builder = self.request(Method::DELETE, path)?;
        self.send(builder, Method::DELETE, path).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, method: Method, path: &str) -> Result<T, AdminError> {
        tracing::debug!(%method, path, "backend request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, "backend unreachable: {}", e);
            AdminError::network(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AdminError::network(e.to_string()))?;

        if !status.is_success() {
            let err = error_from_status(status, &body, path);
            tracing::warn!(%method, path, status = status.as_u16(), "backend rejected request: {}", err);
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%method, path, "undecodable backend body: {}", e);
            AdminError::server(status.as_u16(), format!("invalid response body: {e}"))
        })
    }
}

/// Maps a non-success response onto the error taxonomy
pub fn error_from_status(status: StatusCode, body: &str, path: &str) -> AdminError {
    let envelope = ErrorEnvelope::parse(body);
    let message = envelope.message().map(str::to_string);

    match status {
        StatusCode::UNPROCESSABLE_ENTITY => AdminError::validation(
            message.unwrap_or_else(|| "The given data was invalid.".to_string()),
            envelope.field_errors(),
        ),
        StatusCode::NOT_FOUND => AdminError::not_found(message.unwrap_or_else(|| path.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AdminError::auth(message.unwrap_or_else(|| status.to_string()))
        }
        _ => AdminError::server(
            status.as_u16(),
            message.unwrap_or_else(|| status.canonical_reason().unwrap_or("unexpected status").to_string()),
        ),
    }
}
