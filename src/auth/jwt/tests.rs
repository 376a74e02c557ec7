use super::*;
use crate::config::AuthConfig;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

fn verifier() -> TokenVerifier {
    let config = AuthConfig {
        jwt_secret: SECRET.to_string(),
        ..AuthConfig::default()
    };
    TokenVerifier::new(&config).unwrap()
}

fn hs256_token(sub: &str, email: &str, exp_offset_secs: i64) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        exp: Utc::now().timestamp() + exp_offset_secs,
        iat: Some(Utc::now().timestamp()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_valid_token_yields_claims() {
    let token = hs256_token("auth0|abc123", "user@example.com", 3_600);

    let claims = verifier().verify(&token).unwrap();
    assert_eq!(claims.sub, "auth0|abc123");
    assert_eq!(claims.email, "user@example.com");
}

#[test]
fn test_expired_token_rejected() {
    let token = hs256_token("auth0|abc123", "user@example.com", -3_600);
    assert!(verifier().verify(&token).is_err());
}

#[test]
fn test_wrong_secret_rejected() {
    let claims = Claims {
        sub: "auth0|abc123".to_string(),
        email: "user@example.com".to_string(),
        exp: Utc::now().timestamp() + 3_600,
        iat: None,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"a-completely-different-signing-secret!!"),
    )
    .unwrap();

    assert!(verifier().verify(&token).is_err());
}

#[test]
fn test_rs256_without_public_key_rejected() {
    // Header claims RS256 but no public key is configured; must fail before
    // any signature work
    let token = hs256_token("auth0|abc123", "user@example.com", 3_600);
    let forged = {
        let mut parts: Vec<&str> = token.split('.').collect();
        // {"alg":"RS256","typ":"JWT"} base64url-encoded
        let rs256_header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
        parts[0] = rs256_header;
        parts.join(".")
    };

    let err = verifier().verify(&forged).unwrap_err();
    assert!(err.to_string().contains("no public key"));
}

#[test]
fn test_missing_email_claim_rejected() {
    let token = hs256_token("auth0|abc123", "", 3_600);
    let err = verifier().verify(&token).unwrap_err();
    assert!(err.to_string().contains("email"));
}

#[test]
fn test_garbage_token_rejected() {
    assert!(verifier().verify("not-a-jwt").is_err());
    assert!(verifier().verify("").is_err());
}
