use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use boda_shared::auth::AuthError;
use boda_shared::error::StoreError;
use boda_shared::import::ImportError;
use boda_shared::whatsapp::WhatsappError;
use log::error;
use thiserror::Error;

/// Error returned by every handler. Renders as `{"message": ...}` with `status`.
#[derive(Error, Debug)]
#[error("{status}: {message}")]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }

    pub fn bad_request(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: String) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: String) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: String) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: String) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed with {}: {}", self.status, self.message);
        }
        (
            self.status,
            Json(serde_json::json!({ "message": self.message })),
        )
            .into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found(err.to_string()),
            StoreError::Conflict(_) => AppError::conflict(err.to_string()),
            StoreError::InvalidInput(_) => AppError::bad_request(err.to_string()),
            StoreError::Internal(_) => AppError::internal_server_error(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(_) => AppError::internal_server_error(err.to_string()),
            _ => AppError::unauthorized(err.to_string()),
        }
    }
}

impl From<WhatsappError> for AppError {
    fn from(err: WhatsappError) -> Self {
        AppError::bad_gateway(err.to_string())
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::bad_request(err.to_string())
    }
}
