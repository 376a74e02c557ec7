//! HTTP route modules

pub mod account;
pub mod health;
pub mod plans;

use actix_web::web;

/// Standard API response structure
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: serde::Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Register every route on the application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(health::index)
        .service(
            web::scope("/v1")
                .service(account::me)
                .service(account::create_key)
                .service(account::list_keys)
                .service(account::revoke_key)
                .service(account::usage)
                .service(plans::list_plans)
                .service(plans::subscribe)
                .service(plans::cancel_subscription)
                .service(plans::reactivate_subscription),
        );
}
