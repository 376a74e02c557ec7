//! Error types used throughout the gateway
//!
//! Authentication failures map to 401 with a `WWW-Authenticate` challenge,
//! authorization failures to 403, and throttling to 429 with the full
//! rate-limit header set so clients can read their quota state even when
//! denied.

use crate::core::quota::QuotaDecision;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, ApiError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors (no valid credential)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Authorization errors (valid credential, inactive or insufficient account)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Quota exceeded on at least one window
    #[error("Rate limit exceeded: {}", .0.detail())]
    RateLimited(Box<QuotaDecision>),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Counter store errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Token verification errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ApiError::Auth(_) | ApiError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Auth(_) | ApiError::Jwt(_) => "AUTH_ERROR",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::RateLimited(_) => "RATE_LIMITED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Redis(_) => "CACHE_ERROR",
            ApiError::Serialization(_) => "SERIALIZATION_ERROR",
            ApiError::Io(_) => "IO_ERROR",
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        };

        // Infrastructure details stay out of client-facing messages
        let message = match self {
            ApiError::Redis(_) => "Counter store operation failed".to_string(),
            other => other.to_string(),
        };

        let mut builder = HttpResponse::build(self.status_code());

        match self {
            ApiError::Auth(_) | ApiError::Jwt(_) => {
                builder.insert_header((
                    HeaderName::from_static("www-authenticate"),
                    HeaderValue::from_static("Bearer"),
                ));
            }
            ApiError::RateLimited(decision) => {
                for (name, value) in decision.header_pairs() {
                    builder.insert_header((name, value));
                }
                if let Some(retry_after) = decision.retry_after {
                    builder.insert_header((
                        HeaderName::from_static("retry-after"),
                        header_value(retry_after),
                    ));
                }
            }
            _ => {}
        }

        builder.json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        })
    }
}

/// Standard error response format
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}

pub(crate) fn header_value(n: i64) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

/// Helper constructors for common errors
impl ApiError {
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}
