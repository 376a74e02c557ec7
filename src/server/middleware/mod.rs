//! HTTP middleware

pub mod access;
pub mod request_id;


pub use access::AccessMiddleware;
pub use request_id::RequestIdMiddleware;

use crate::core::models::Principal;
use actix_web::http::header::HeaderMap;
use actix_web::{HttpMessage, HttpRequest};

/// Routes that skip authentication and quota
pub(crate) fn is_public_route(path: &str) -> bool {
    matches!(path, "/" | "/health")
}

/// Bearer token from the Authorization header, if present
pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// API key from the configured header, if present
pub(crate) fn extract_api_key(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The authenticated principal stored by [`AccessMiddleware`]
pub fn request_principal(req: &HttpRequest) -> Result<Principal, actix_web::Error> {
    req.extensions()
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Missing request principal"))
}
