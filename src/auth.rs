// Copyright 2023 Remi Bernotavicius

use crate::database::{Error, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Argon2, Params};
use rand::rngs::OsRng;
use rand::TryRngCore as _;
use std::sync::LazyLock;

/// Use insecure (fast) password hashing for dev/test databases
static INSECURE_HASHING: LazyLock<bool> =
    LazyLock::new(|| std::env::var("INSECURE_PASSWORD_HASHING").is_ok());

fn get_argon2() -> Argon2<'static> {
    if cfg!(test) || *INSECURE_HASHING {
        // Minimal params, NOT SECURE FOR PRODUCTION
        let params = Params::new(1024, 1, 1, None).unwrap_or_default();
        Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
    } else {
        Argon2::default()
    }
}

/// Hashes `password` with a fresh random salt into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt).map_err(|e| Error::PasswordHash(e.to_string()))?;

    let hash = get_argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Hash of a password nobody has, verified against when a login names no account.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no account has this password").ok());

/// Does the work of a failed [`verify_password`] for a login whose email is unknown. Always
/// `false`.
pub fn verify_missing_user(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        verify_password(password, hash);
    }
    false
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    get_argon2()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[test]
fn password_round_trip() {
    let hash = hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("Hunter2", &hash));
    assert!(!verify_password("hunter2 ", &hash));
}

#[test]
fn salts_differ() {
    let a = hash_password("same").unwrap();
    let b = hash_password("same").unwrap();
    assert_ne!(a, b);
    assert!(verify_password("same", &a));
    assert!(verify_password("same", &b));
}

#[test]
fn garbage_hash_never_verifies() {
    assert!(!verify_password("anything", "not a phc string"));
    assert!(!verify_password("", ""));
}

#[test]
fn missing_user_still_hashes() {
    let hash = DUMMY_HASH.as_deref().unwrap();
    assert!(PasswordHash::new(hash).is_ok());
    assert!(!verify_missing_user("no account has this password"));
    assert!(!verify_missing_user(""));
}
