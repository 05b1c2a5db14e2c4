//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Error returned by handlers; converted to a status code and a JSON body.
#[derive(Debug)]
pub enum ApiError {
    Database(dissoc_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<dissoc_core::Error> for ApiError {
    fn from(err: dissoc_core::Error) -> Self {
        match err {
            dissoc_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            dissoc_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Database(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Database(err) => {
                tracing::error!(
                    subsystem = "api",
                    component = "error",
                    error = %err,
                    "Request failed"
                );
                err.to_string()
            }
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "ok": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
