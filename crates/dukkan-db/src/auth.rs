//! # Credential Hashing
//!
//! Operator passwords are stored as argon2id PHC strings
//! (`$argon2id$v=19$m=...$salt$hash`) with a fresh random salt per user.
//!
//! ```text
//! login(username, password)
//!      │
//!      ├── user found ──────► verify(password, stored_hash)
//!      │                              │
//!      └── user missing ────► verify(password, DUMMY_HASH)   ← same cost
//!                                     │
//!                          false on either path ──► InvalidCredentials
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::OnceLock;
use tracing::warn;

use crate::error::{DbError, DbResult};

/// Hashes a plaintext password with a random salt.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Hashing(e.to_string()))
}

/// Checks a plaintext password against a stored PHC string.
///
/// A malformed stored hash is treated as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Runs a full verification against a throwaway hash so that a login for an
/// unknown username costs the same as a wrong password.
pub fn verify_against_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| hash_password("dukkan-unknown-user").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}
