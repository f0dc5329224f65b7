//! Password value object - Domain layer password handling.
//!
//! Encapsulates the strength policy and Argon2 hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::{MAX_FIELD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Hash used when verifying a password for an unknown account, so that a
/// missing user costs the same as a wrong password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$3fOqaArQ6i+GbBmCKSDXz4dP3lqo5t6WfNN0u7sCbU4";

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error if the password fails the strength policy.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if let Some(problem) = Self::strength_violation(plain_text) {
            return Err(AppError::validation("password", problem));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Placeholder used to equalise timing for unknown accounts.
    pub fn dummy() -> Self {
        Self::from_hash(DUMMY_HASH.to_string())
    }

    /// Check the strength policy, returning the violated rule if any.
    pub fn strength_violation(plain_text: &str) -> Option<String> {
        let length = plain_text.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Some(format!(
                "The password must be at least {} characters.",
                MIN_PASSWORD_LENGTH
            ));
        }
        if length as u64 > MAX_FIELD_LENGTH {
            return Some(format!(
                "The password may not be greater than {} characters.",
                MAX_FIELD_LENGTH
            ));
        }
        None
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
