//! Sign-up and sign-in, composed from `AuthService` calls.
//!
//! Both return a token plus the public user projection.

use tracing::{debug, info, instrument};

use super::domain::{AuthSession, NewUser};
use super::errors::AuthError;
use super::service::AuthService;

fn validate(input: &NewUser) -> Result<(), AuthError> {
    if input.username.trim().is_empty() {
        return Err(AuthError::Validation("username required".into()));
    }
    if input.password.is_empty() {
        return Err(AuthError::Validation("password required".into()));
    }
    Ok(())
}

/// Register a new user and issue a token.
///
/// The lookup check is not atomic with the insert; a concurrent sign-up for
/// the same name is stopped by the store and reported as `DuplicateUsername`
/// as well.
#[instrument(skip(auth, input), fields(username = %input.username))]
pub async fn sign_up<A: AuthService + ?Sized>(auth: &A, input: NewUser) -> Result<AuthSession, AuthError> {
    validate(&input)?;
    if auth.find_user_by_username(&input.username).await?.is_some() {
        debug!("username already taken");
        return Err(AuthError::DuplicateUsername);
    }
    let user = auth.create_user(input).await?;
    let token = auth.generate_jwt(user.id)?;
    info!(user_id = user.id, "user_registered");
    Ok(AuthSession { token, user })
}

/// Check credentials and issue a token.
///
/// Unknown user and wrong password yield the same `InvalidCredentials`.
#[instrument(skip(auth, input), fields(username = %input.username))]
pub async fn sign_in<A: AuthService + ?Sized>(auth: &A, input: NewUser) -> Result<AuthSession, AuthError> {
    let Some(user) = auth.find_user_by_username(&input.username).await? else {
        debug!("unknown username");
        return Err(AuthError::InvalidCredentials);
    };
    if !auth.compare_passwords(&input.password, &user.password) {
        debug!(user_id = user.id, "password mismatch");
        return Err(AuthError::InvalidCredentials);
    }
    let token = auth.generate_jwt(user.id)?;
    info!(user_id = user.id, "user_signed_in");
    Ok(AuthSession { token, user: user.public() })
}
