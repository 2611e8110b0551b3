//! Password hashing and verification on top of argon2 via `password-auth`.

use password_auth::{generate_hash, verify_password, VerifyError};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plain-text password for storage.
pub fn hash(password: &str) -> String {
    generate_hash(password)
}

/// Check a plain-text password against a stored hash.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    match verify_password(password, stored_hash) {
        Ok(()) => true,
        Err(VerifyError::PasswordInvalid) => false,
        Err(VerifyError::Parse(e)) => {
            // A hash we cannot parse means corrupted storage, not a bad password
            tracing::error!("Stored password hash failed to parse: {}", e);
            false
        }
    }
}
