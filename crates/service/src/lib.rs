//! Service layer for username/password authentication.
//! - `auth::AuthService` is the boundary the HTTP layer talks to.
//! - Persistence goes through `auth::repository::UserRepository`; the SeaORM
//!   implementation lives in `auth::repo::seaorm`.

pub mod auth;
#[cfg(test)]
pub mod test_support;
