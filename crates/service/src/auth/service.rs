use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::domain::{NewUser, PublicUser, User};
use super::errors::AuthError;
use super::password;
use super::repository::UserRepository;
use super::token;

/// The capability set the HTTP layer depends on.
///
/// Implementations are selected at construction time and shared as
/// `Arc<dyn AuthService>`.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exact (case-sensitive) lookup. Absence is `Ok(None)`.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Hash the password and persist the user. Does not check for an existing
    /// username first; callers do that, and the store rejects collisions.
    async fn create_user(&self, input: NewUser) -> Result<PublicUser, AuthError>;

    fn compare_passwords(&self, input: &str, encrypted: &str) -> bool {
        password::verify_password(input, encrypted)
    }

    fn generate_jwt(&self, id: i32) -> Result<String, AuthError>;

    /// Resolve a token back to the user id it was issued for.
    fn validate_jwt(&self, token: &str) -> Result<i32, AuthError>;
}

/// Auth service configuration
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self { jwt_secret: Some(secret.into()) }
    }

    /// The signing secret; empty or whitespace-only counts as unset.
    fn secret(&self, action: &str) -> Result<&str, AuthError> {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AuthError::Configuration(format!("API secret not defined. Unable to {action} JWT.")))
    }

    pub fn is_configured(&self) -> bool {
        self.secret("use").is_ok()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `AuthService` backed by a persistent `UserRepository`.
pub struct StoreAuthService<R: UserRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: UserRepository> StoreAuthService<R> {
    /// Build the service.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, NewUser, StoreAuthService};
    /// use service::auth::repository::mock::MockUserRepository;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let svc = StoreAuthService::new(repo, AuthConfig::with_secret("secret"));
    /// let user = tokio_test::block_on(svc.create_user(NewUser::new("alice", "password123"))).unwrap();
    /// assert_eq!(user.username, "alice");
    /// let token = svc.generate_jwt(user.id).unwrap();
    /// assert_eq!(svc.validate_jwt(&token).unwrap(), user.id);
    /// ```
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        if !cfg.is_configured() {
            warn!("auth service built without a signing secret; token operations will fail");
        }
        Self { repo, cfg }
    }

    pub fn repository(&self) -> &Arc<R> { &self.repo }
}

#[async_trait]
impl<R: UserRepository> AuthService for StoreAuthService<R> {
    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let found = self.repo.find_by_username(username).await?;
        debug!(found = found.is_some(), "user lookup");
        Ok(found)
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    async fn create_user(&self, input: NewUser) -> Result<PublicUser, AuthError> {
        let hash = password::hash_password(&input.password)?;
        let user = self.repo.insert(&input.username, &hash).await?;
        info!(user_id = user.id, username = %user.username, "user_created");
        Ok(user.public())
    }

    fn generate_jwt(&self, id: i32) -> Result<String, AuthError> {
        let secret = self.cfg.secret("generate")?;
        token::issue(secret, id)
    }

    fn validate_jwt(&self, token: &str) -> Result<i32, AuthError> {
        let secret = self.cfg.secret("validate")?;
        let claims = token::verify(secret, token)?;
        Ok(claims.id)
    }
}
