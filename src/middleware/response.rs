use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::crud::Notice;
use crate::routing::Navigation;

/// View document envelope: `{success, data, notices, navigation?}`
#[derive(Debug)]
pub struct ViewResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub notices: Vec<Notice>,
    pub navigation: Option<Navigation>,
}

impl<T: Serialize> ViewResponse<T> {
    /// Create a successful view response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            notices: Vec::new(),
            navigation: None,
        }
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_notices(mut self, notices: Vec<Notice>) -> Self {
        self.notices = notices;
        self
    }

    /// Where the client should go next
    pub fn with_navigation(mut self, navigation: Option<Navigation>) -> Self {
        self.navigation = navigation;
        self
    }
}

impl<T: Serialize> IntoResponse for ViewResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize view document: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize view document"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": status.is_success(),
            "data": data_value,
            "notices": self.notices,
        });
        if let Some(navigation) = self.navigation {
            envelope["navigation"] = serde_json::to_value(navigation).unwrap_or(Value::Null);
        }

        (status, Json(envelope)).into_response()
    }
}
