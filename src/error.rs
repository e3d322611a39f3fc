// Admin error taxonomy shared by the client, the view-models and the admin host
use std::collections::BTreeMap;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;

/// Field name to the messages the backend returned for it
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Error)]
pub enum AdminError {
    /// Transport failure, the request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// 422 with field-keyed messages
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other 4xx/5xx, or a body that could not be decoded
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Missing token or rejected credentials
    #[error("Authentication required: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdminError {
    pub fn network(message: impl Into<String>) -> Self {
        AdminError::Network(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        AdminError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AdminError::NotFound(message.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        AdminError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        AdminError::Auth(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AdminError::Validation { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AdminError::Auth(_))
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AdminError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Status the admin host answers with
    pub fn status_code(&self) -> u16 {
        match self {
            AdminError::Network(_) => 502,
            AdminError::Validation { .. } => 422,
            AdminError::NotFound(_) => 404,
            AdminError::Server { status, .. } if (400..600).contains(status) => *status,
            AdminError::Server { .. } => 500,
            AdminError::Auth(_) => 401,
            AdminError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Network(_) => "NETWORK_ERROR",
            AdminError::Validation { .. } => "VALIDATION_ERROR",
            AdminError::NotFound(_) => "NOT_FOUND",
            AdminError::Server { .. } => "SERVER_ERROR",
            AdminError::Auth(_) => "UNAUTHORIZED",
            AdminError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code()
        });

        if let AdminError::Validation { field_errors, .. } = self {
            body["field_errors"] = json!(field_errors);
        }

        body
    }
}

impl From<url::ParseError> for AdminError {
    fn from(err: url::ParseError) -> Self {
        AdminError::Config(format!("invalid URL: {err}"))
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for AdminError {
    fn into_response(self) -> axum::response::Response {
        if let AdminError::Config(msg) | AdminError::Network(msg) = &self {
            tracing::error!("{}: {}", self.error_code(), msg);
        }
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_serializes_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), vec!["required".into()]);
        let err = AdminError::validation("The given data was invalid.", fields);

        assert_eq!(err.status_code(), 422);
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["name"][0], "required");
    }

    #[test]
    fn server_error_keeps_backend_status() {
        assert_eq!(AdminError::server(503, "down").status_code(), 503);
        assert_eq!(AdminError::server(200, "bad body").status_code(), 500);
    }

    #[test]
    fn auth_error_is_unauthorized() {
        let err = AdminError::auth("no token");
        assert!(err.is_auth());
        assert_eq!(err.status_code(), 401);
        assert!(err.field_errors().is_none());
    }
}
