//! Argon2id password hashing.

use argon2::{Argon2, PasswordHash, password_hash::{PasswordHasher, PasswordVerifier, SaltString}};
use rand::rngs::OsRng;

use super::errors::AuthError;

/// Hash `plain` with a fresh random salt; returns a PHC string.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check `plain` against a stored PHC hash. Unparseable hashes never match.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok()
}
