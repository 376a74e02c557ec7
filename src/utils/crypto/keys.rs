//! API key generation and verification
//!
//! Raw keys are never stored: only their Argon2 hash plus the last eight
//! characters for display. Verification goes through Argon2's constant-time
//! comparison, so invalid keys of any similarity fail with indistinguishable
//! latency.

use crate::utils::error::{ApiError, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix identifying keys issued by this gateway
pub const API_KEY_PREFIX: &str = "sg";

/// Number of trailing characters kept for UI display
pub const KEY_SUFFIX_LEN: usize = 8;

/// Generate a secure API key
pub fn generate_api_key() -> String {
    let random_part: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect();

    format!("{}-{}", API_KEY_PREFIX, random_part)
}

/// Hash an API key for storage (PHC string format)
pub fn hash_api_key(raw_key: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(raw_key.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Key hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a presented key against a stored Argon2 hash
///
/// Any parse or verification error counts as a non-match.
pub fn verify_api_key(raw_key: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw_key.as_bytes(), &parsed)
        .is_ok()
}

/// Last characters of a key, safe to show in a UI
pub fn key_suffix(raw_key: &str) -> String {
    if raw_key.len() >= KEY_SUFFIX_LEN {
        raw_key[raw_key.len() - KEY_SUFFIX_LEN..].to_string()
    } else {
        raw_key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key_format() {
        let key = generate_api_key();
        assert!(key.starts_with("sg-"));
        assert_eq!(key.len(), 43); // "sg-" (3) + 40 random chars
    }

    #[test]
    fn test_generate_api_key_uniqueness() {
        let key1 = generate_api_key();
        let key2 = generate_api_key();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let key = generate_api_key();
        let hash = hash_api_key(&key).unwrap();

        assert_ne!(hash, key);
        assert!(verify_api_key(&key, &hash));
        assert!(!verify_api_key("sg-wrongwrongwrongwrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_api_key("sg-anything", "not-a-phc-string"));
    }

    #[test]
    fn test_key_suffix() {
        assert_eq!(key_suffix("sg-abcdefghij"), "cdefghij");
        assert_eq!(key_suffix("short"), "short");
    }

    #[test]
    fn test_similar_keys_do_not_match() {
        let key = generate_api_key();
        let hash = hash_api_key(&key).unwrap();

        // Off-by-one-character key must fail like any other
        let mut close = key.clone();
        close.pop();
        close.push('!');
        assert!(!verify_api_key(&close, &hash));
    }
}
