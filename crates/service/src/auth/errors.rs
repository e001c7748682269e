use models::errors::ModelError;
use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("Username already taken")]
    DuplicateUsername,
    #[error("user not found")]
    NotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid token: {0}")]
    TokenInvalid(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::DuplicateUsername => 1002,
            AuthError::NotFound => 1003,
            AuthError::InvalidCredentials => 1004,
            AuthError::TokenInvalid(_) => 1005,
            AuthError::Hash(_) => 1101,
            AuthError::Configuration(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// Failures caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::Validation(_)
                | AuthError::DuplicateUsername
                | AuthError::NotFound
                | AuthError::InvalidCredentials
                | AuthError::TokenInvalid(_)
        )
    }
}

impl From<ModelError> for AuthError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Conflict(_) => AuthError::DuplicateUsername,
            ModelError::Validation(msg) => AuthError::Validation(msg),
            ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}
