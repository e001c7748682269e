use async_trait::async_trait;

use super::domain::User;
use super::errors::AuthError;

/// Persistent user store used by `StoreAuthService`.
///
/// `insert` must report a username collision as `AuthError::DuplicateUsername`;
/// that is the guard sign-up relies on when two requests race.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AuthError>;
    /// Bulk delete, used to reset state between tests.
    async fn delete_all(&self) -> Result<u64, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    #[derive(Default)]
    struct State {
        users: Vec<User>,
        next_id: i32,
    }

    /// Behaves like a table with a unique index on `username`.
    #[derive(Default)]
    pub struct MockUserRepository {
        state: Mutex<State>,
        failing: bool,
        find_calls: AtomicUsize,
        insert_calls: AtomicUsize,
    }

    impl MockUserRepository {
        /// A store whose every call fails with `AuthError::Repository`.
        pub fn failing() -> Self {
            Self { failing: true, ..Default::default() }
        }

        pub fn find_calls(&self) -> usize { self.find_calls.load(Ordering::SeqCst) }
        pub fn insert_calls(&self) -> usize { self.insert_calls.load(Ordering::SeqCst) }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn check(&self) -> Result<(), AuthError> {
            if self.failing {
                return Err(AuthError::Repository("store unavailable".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.state().users.iter().find(|u| u.username == username).cloned())
        }

        async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let mut state = self.state();
            if state.users.iter().any(|u| u.username == username) {
                return Err(AuthError::DuplicateUsername);
            }
            state.next_id += 1;
            let user = User { id: state.next_id, username: username.to_string(), password: password_hash.to_string() };
            state.users.push(user.clone());
            Ok(user)
        }

        async fn delete_all(&self) -> Result<u64, AuthError> {
            self.check()?;
            let mut state = self.state();
            let n = state.users.len() as u64;
            state.users.clear();
            Ok(n)
        }
    }
}
