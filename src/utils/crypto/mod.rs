//! Cryptographic helpers for credential material

mod keys;

pub use keys::{generate_api_key, hash_api_key, key_suffix, verify_api_key, API_KEY_PREFIX};
