//! Secret handling helpers for tokens and one-time codes
//!
//! Issued secrets are never stored in plaintext. Stores keep the SHA256 hash of
//! a secret and compare hashes in constant time via the `subtle` crate, so a
//! lookup or validation does not leak how much of a guess was correct.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Generate a 256-bit random token encoded as URL-safe base64 (43 characters).
pub fn generate_secure_token() -> Result<String, CryptoError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        bytes,
    ))
}

/// Generate a zero-padded numeric one-time code of `digits` length.
pub fn generate_numeric_code(digits: u32) -> Result<String, CryptoError> {
    let modulus = 10u64.pow(digits);
    let mut bytes = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    let value = u64::from_le_bytes(bytes) % modulus;
    Ok(format!("{value:0width$}", width = digits as usize))
}

/// Hex-encoded SHA256 hash of a secret, suitable as a lookup key.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a secret against a stored hash with constant-time comparison.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(computed_hash.as_bytes(), stored_hash.as_bytes())
}

pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
