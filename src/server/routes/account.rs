//! Account endpoints: identity, API keys and usage history

use crate::core::models::PlanLimits;
use crate::server::middleware::request_principal;
use crate::server::routes::ApiResponse;
use crate::server::AppState;
use crate::utils::error::ApiError;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The caller's resolved identity and effective plan
#[get("/me")]
pub async fn me(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
    let principal = request_principal(&req)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(principal)))
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional per-key limits overriding the plan's
    #[serde(default)]
    pub limits: Option<PlanLimits>,
}

/// Mint a new API key. The raw key appears in this response only.
#[post("/keys")]
pub async fn create_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateKeyRequest>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    let created = state
        .api_keys
        .create_key(
            principal.user_id,
            &body.name,
            body.expires_at,
            body.limits,
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// The caller's keys; hashes are never serialized
#[get("/keys")]
pub async fn list_keys(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    let keys = state.api_keys.list_keys(principal.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(keys)))
}

#[delete("/keys/{id}")]
pub async fn revoke_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    state
        .api_keys
        .revoke_key(principal.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    #[serde(default = "default_usage_limit")]
    pub limit: usize,
}

fn default_usage_limit() -> usize {
    50
}

/// The caller's recent request history, newest first
#[get("/usage")]
pub async fn usage(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<UsageQuery>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    let limit = query.limit.min(500);
    let entries = state.usage_log.for_user(principal.user_id, limit);
    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}
