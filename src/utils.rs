use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand_core::OsRng;

use crate::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::bad_request(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::internal(format!("failed to hash password: {err}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|err| AppError::internal(format!("invalid password hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Check `password` against the account's hash, or against a throwaway hash
/// when there is no account, so both paths cost one argon2 verification.
pub fn verify_password_or_dummy(password: &str, password_hash: Option<&str>) -> Result<bool, AppError> {
    match password_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, dummy_hash()?)?;
            Ok(false)
        }
    }
}

fn dummy_hash() -> Result<&'static str, AppError> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }
    let hash = hash_password("no-such-account-placeholder")?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}
