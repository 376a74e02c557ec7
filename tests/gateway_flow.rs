//! End-to-end flow over the in-process stack: real middleware, routes and
//! quota counting, with the in-memory directory and counter store.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use statgate::server::builder::build_state_with;
use statgate::server::middleware::{AccessMiddleware, RequestIdMiddleware};
use statgate::server::{routes, AppState};
use statgate::storage::memory::MemoryDirectory;
use statgate::storage::Directory;
use statgate::Config;
use std::sync::Arc;

async fn state() -> AppState {
    let config = Config::default();
    build_state_with(config, Arc::new(MemoryDirectory::new()))
        .await
        .unwrap()
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure)
                .wrap(AccessMiddleware)
                .wrap(RequestIdMiddleware),
        )
        .await
    };
}

async fn issue_key(state: &AppState, subject: &str) -> String {
    let user = state
        .directory
        .get_or_create_user(subject, &format!("{}@example.com", subject))
        .await
        .unwrap();
    state
        .api_keys
        .create_key(user.id, "integration", None, None)
        .await
        .unwrap()
        .raw_key
}

#[actix_web::test]
async fn health_is_public() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    // No quota headers on public routes
    assert!(resp.headers().get("x-ratelimit-limit-minute").is_none());
}

#[actix_web::test]
async fn missing_credentials_get_a_challenge() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/v1/me").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get("www-authenticate").map(|v| v.as_bytes()),
        Some(&b"Bearer"[..])
    );
}

#[actix_web::test]
async fn rejected_request_still_lands_in_the_usage_log() {
    let state = state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", "sg-not-a-real-key"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The recorder drains off-path; give it a moment to settle
    for _ in 0..50 {
        if !state.usage_log.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let entries = state.usage_log.recent(10);
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.status_code, 401);
    assert_eq!(entry.endpoint, "/v1/me");
    assert!(entry.user_id.is_none());
    assert!(entry.api_key_id.is_none());
    assert!(entry.plan_name.is_none());
    assert!(!entry.rate_limited);
    assert!(entry.error_message.is_some());
}

#[actix_web::test]
async fn api_key_authenticates_and_reports_quota() {
    let state = state().await;
    let key = issue_key(&state, "auth0|alice").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", key.as_str()))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("x-request-id").is_some());

    // Free plan: 10/minute, this request consumed one
    let headers = resp.headers();
    assert_eq!(headers.get("x-ratelimit-limit-minute").unwrap(), "10");
    assert_eq!(headers.get("x-ratelimit-remaining-minute").unwrap(), "9");
    assert_eq!(headers.get("x-ratelimit-limit-hour").unwrap(), "100");
    assert_eq!(headers.get("x-ratelimit-limit-day").unwrap(), "1000");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["plan"]["name"], "free");
}

#[actix_web::test]
async fn revoked_key_is_rejected() {
    let state = state().await;
    let user = state
        .directory
        .get_or_create_user("auth0|bob", "bob@example.com")
        .await
        .unwrap();
    let created = state
        .api_keys
        .create_key(user.id, "doomed", None, None)
        .await
        .unwrap();
    state
        .api_keys
        .revoke_key(user.id, created.record.id)
        .await
        .unwrap();

    let app = app!(state);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", created.raw_key.as_str()))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn eleventh_request_in_a_minute_is_throttled() {
    let state = state().await;
    let key = issue_key(&state, "auth0|burst").await;
    let app = app!(state);

    for i in 1..=10 {
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/v1/me")
                .insert_header(("x-api-key", key.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK, "request {} should pass", i);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", key.as_str()))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let headers = resp.headers();
    assert_eq!(headers.get("x-ratelimit-remaining-minute").unwrap(), "0");
    // Hour and day accounting still present on the denial
    assert!(headers.get("x-ratelimit-remaining-hour").is_some());
    assert!(headers.get("x-ratelimit-remaining-day").is_some());

    let retry_after: i64 = headers
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[actix_web::test]
async fn key_lifecycle_over_http() {
    let state = state().await;
    let key = issue_key(&state, "auth0|carol").await;
    let app = app!(state);

    // Mint a second key over the API
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/keys")
            .insert_header(("x-api-key", key.as_str()))
            .set_json(serde_json::json!({ "name": "from-http" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let raw = body["data"]["raw_key"].as_str().unwrap().to_string();
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(raw.starts_with("sg-"));
    // The stored hash never leaves the server
    assert!(body["data"].get("key_hash").is_none());

    // The new key works immediately
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", raw.as_str()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Revoke it and watch it stop working
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/v1/keys/{}", id))
            .insert_header(("x-api-key", key.as_str()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", raw.as_str()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn subscription_upgrades_the_effective_plan() {
    let state = state().await;
    let key = issue_key(&state, "auth0|dave").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/subscriptions")
            .insert_header(("x-api-key", key.as_str()))
            .set_json(serde_json::json!({ "plan": "pro", "billing_cycle": "monthly" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The next request carries the pro plan's ceilings
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("x-api-key", key.as_str()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-ratelimit-limit-minute").unwrap(),
        "100"
    );
}
