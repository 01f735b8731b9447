//! Password verification
//!
//! The gate never compares plaintext passwords itself. It hands the submitted
//! password and the stored hash to a [`PasswordVerifier`].

use async_trait::async_trait;

use crate::Error;

/// Checks a plaintext password against a stored hash.
///
/// Implementations must be free of side effects.
#[async_trait]
pub trait PasswordVerifier: Send + Sync + 'static {
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, Error>;
}

/// Verifier for PHC-formatted hashes produced by [`hash_password`] (argon2).
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordVerifier;

#[async_trait]
impl PasswordVerifier for Argon2PasswordVerifier {
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, Error> {
        use password_auth::verify_password;
        Ok(verify_password(password, password_hash).is_ok())
    }
}

/// Hash a password using argon2
pub fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}
