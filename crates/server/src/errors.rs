use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::auth::AuthError;
use thiserror::Error;
use tracing::error;

/// Request-level failure, rendered as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Missing bearer token")]
    MissingToken,
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::MissingToken => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Auth(e) => match e {
                AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AuthError::DuplicateUsername => (StatusCode::BAD_REQUEST, "Username already taken".into()),
                // NotFound is folded into InvalidCredentials so lookups cannot reveal which usernames exist
                AuthError::InvalidCredentials | AuthError::NotFound => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
                }
                AuthError::TokenInvalid(_) => (StatusCode::UNAUTHORIZED, "Invalid token".into()),
                AuthError::Configuration(_) | AuthError::Hash(_) | AuthError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            let code = match &self { ApiError::Auth(e) => e.code(), ApiError::MissingToken => 0 };
            error!(error = %self, code, "request failed");
        }
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
