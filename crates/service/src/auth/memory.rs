use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::domain::{NewUser, PublicUser, User};
use super::errors::AuthError;
use super::password;
use super::service::AuthService;

const TOKEN_PREFIX: &str = "mock-jwt-";

/// `AuthService` holding users in process memory, for tests that should not
/// need a database.
///
/// Ids are `len + 1` at insert time, so they restart after `clear_users`.
/// Tokens are the unsigned string `mock-jwt-{id}`.
///
/// # Examples
/// ```
/// use service::auth::{AuthService, InMemoryAuthService, NewUser};
/// let svc = InMemoryAuthService::new();
/// let user = tokio_test::block_on(svc.create_user(NewUser::new("newuser", "newpassword"))).unwrap();
/// assert_eq!(user.id, 1);
/// assert_eq!(svc.generate_jwt(1).unwrap(), "mock-jwt-1");
/// assert_eq!(svc.validate_jwt("garbage").unwrap(), 0);
/// ```
#[derive(Default)]
pub struct InMemoryAuthService {
    users: Mutex<Vec<User>>,
}

impl InMemoryAuthService {
    pub fn new() -> Self { Self::default() }

    /// Drop every stored user.
    pub fn clear_users(&self) {
        self.users().clear();
    }

    pub fn len(&self) -> usize { self.users().len() }

    pub fn is_empty(&self) -> bool { self.users().is_empty() }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users().iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, input: NewUser) -> Result<PublicUser, AuthError> {
        let hash = password::hash_password(&input.password)?;
        let mut users = self.users();
        let user = User { id: users.len() as i32 + 1, username: input.username, password: hash };
        users.push(user.clone());
        Ok(user.public())
    }

    fn generate_jwt(&self, id: i32) -> Result<String, AuthError> {
        Ok(format!("{TOKEN_PREFIX}{id}"))
    }

    /// Unparseable tokens resolve to 0 instead of failing.
    fn validate_jwt(&self, token: &str) -> Result<i32, AuthError> {
        Ok(token.split('-').nth(2).and_then(leading_int).unwrap_or(0))
    }
}

/// Leading integer of `s`: optional whitespace, optional sign, then digits.
/// Anything after the digits is ignored.
fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..].find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len() - sign_len);
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
