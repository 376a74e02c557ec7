//! Authentication and quota middleware
//!
//! Runs the full admission pipeline in front of every protected route:
//! credential resolution, quota counting, response header injection and
//! usage recording. Handlers behind it can rely on a [`Principal`] being
//! present in the request extensions.

use super::{extract_api_key, extract_bearer, is_public_route};
use crate::core::models::{Principal, UsageLogEntry};
use crate::server::AppState;
use crate::utils::error::ApiError;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, HttpMessage, ResponseError};
use chrono::Utc;
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Instant;
use tracing::warn;

/// Admission middleware for Actix-web
pub struct AccessMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AccessMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AccessMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

/// Service implementation for the admission middleware
pub struct AccessMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AccessMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if is_public_route(req.path()) {
            return Box::pin(async move {
                service.call(req).await.map(|res| res.map_into_left_body())
            });
        }

        let started = Instant::now();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        let bearer = extract_bearer(req.headers());
        let peer_ip = req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string());
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let endpoint = req.path().to_string();
        let method = req.method().to_string();

        Box::pin(async move {
            let Some(state) = state else {
                return Err(
                    actix_web::error::ErrorInternalServerError("Application state missing")
                );
            };

            let api_key = extract_api_key(req.headers(), &state.config.auth.api_key_header);

            let meta = RequestMeta {
                endpoint,
                method,
                peer_ip,
                user_agent,
                request_id,
            };

            // Credential failures are rendered here so 401/403 carry the
            // standard error body and challenge header. They still produce
            // a usage entry, with no principal to attribute it to.
            let decision = match state
                .pipeline
                .authorize(bearer.as_deref(), api_key.as_deref(), meta.peer_ip.as_deref())
                .await
            {
                Ok(decision) => decision,
                Err(e) => {
                    let response = e.error_response();
                    record_usage(
                        &state,
                        None,
                        &meta,
                        response.status().as_u16(),
                        started,
                        false,
                        Some(e.to_string()),
                    );
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            if !decision.quota.allowed {
                let throttled = ApiError::RateLimited(Box::new(decision.quota));
                record_usage(
                    &state,
                    Some(&decision.principal),
                    &meta,
                    429,
                    started,
                    true,
                    Some(throttled.to_string()),
                );
                let response = throttled.error_response();
                return Ok(req.into_response(response).map_into_right_body());
            }

            let principal = decision.principal;
            let quota = decision.quota;
            req.extensions_mut().insert(principal.clone());
            req.extensions_mut().insert(quota.clone());

            let mut res = service.call(req).await?;

            for (name, value) in quota.header_pairs() {
                res.headers_mut().insert(name, value);
            }

            let status = res.status().as_u16();
            let error_message = if res.status().is_client_error() || res.status().is_server_error()
            {
                res.status().canonical_reason().map(|r| r.to_string())
            } else {
                None
            };
            record_usage(
                &state,
                Some(&principal),
                &meta,
                status,
                started,
                false,
                error_message,
            );

            // Lifetime counter, off the response path
            let directory = state.directory.clone();
            let user_id = principal.user_id;
            tokio::spawn(async move {
                if let Err(e) = directory.record_user_request(user_id).await {
                    warn!("Failed to bump usage count for user {}: {}", user_id, e);
                }
            });

            Ok(res.map_into_left_body())
        })
    }
}

struct RequestMeta {
    endpoint: String,
    method: String,
    peer_ip: Option<String>,
    user_agent: Option<String>,
    request_id: Option<String>,
}

fn record_usage(
    state: &web::Data<AppState>,
    principal: Option<&Principal>,
    meta: &RequestMeta,
    status_code: u16,
    started: Instant,
    rate_limited: bool,
    error_message: Option<String>,
) {
    state.usage.record(UsageLogEntry {
        user_id: principal.map(|p| p.user_id),
        api_key_id: principal.and_then(|p| p.credential_id),
        endpoint: meta.endpoint.clone(),
        method: meta.method.clone(),
        status_code,
        response_time_ms: started.elapsed().as_millis() as u64,
        ip_address: meta.peer_ip.clone(),
        user_agent: meta.user_agent.clone(),
        request_id: meta.request_id.clone(),
        plan_name: principal.map(|p| p.plan.name.clone()),
        rate_limited,
        error_message,
        created_at: Utc::now(),
    });
}
