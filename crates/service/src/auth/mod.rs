//! Auth module: domain, repository, password/token primitives, the
//! `AuthService` capability set with its two implementations, and the
//! sign-up / sign-in flows built on top of it.

pub mod domain;
pub mod errors;
pub mod flow;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;

pub use domain::{AuthSession, NewUser, PublicUser, User};
pub use errors::AuthError;
pub use memory::InMemoryAuthService;
pub use service::{AuthConfig, AuthService, StoreAuthService};
