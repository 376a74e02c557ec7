//! Plan catalog and subscription endpoints

use crate::core::models::BillingCycle;
use crate::server::middleware::request_principal;
use crate::server::routes::ApiResponse;
use crate::server::AppState;
use crate::utils::error::ApiError;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

/// Plans available for subscription
#[get("/plans")]
pub async fn list_plans(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let plans = state.subscriptions.list_plans().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(plans)))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub plan: String,
    #[serde(default = "default_cycle")]
    pub billing_cycle: BillingCycle,
}

fn default_cycle() -> BillingCycle {
    BillingCycle::Monthly
}

#[post("/subscriptions")]
pub async fn subscribe(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    let sub = state
        .subscriptions
        .subscribe(principal.user_id, &body.plan, body.billing_cycle)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(sub)))
}

/// Cancel at period end; access continues until then
#[delete("/subscriptions/{id}")]
pub async fn cancel_subscription(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    let sub = state
        .subscriptions
        .cancel(principal.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(sub)))
}

#[post("/subscriptions/{id}/reactivate")]
pub async fn reactivate_subscription(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let principal = request_principal(&req).map_err(|_| ApiError::auth("Not authenticated"))?;

    let sub = state
        .subscriptions
        .reactivate(principal.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(sub)))
}
