//! Router-level tests that run without a database

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use helpers::offline_state;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sukull_backend::api;
use sukull_backend::config::AppConfig;
use sukull_backend::error::AppError;
use tower::ServiceExt;

async fn send(config: AppConfig, request: Request<Body>) -> (StatusCode, Value) {
    let app = api::router(offline_state(config));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_database_down() {
    let (status, body) = send(AppConfig::default(), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "down");
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_rules_are_public() {
    let (status, body) = send(AppConfig::default(), get("/api/streak/rules")).await;

    assert_eq!(status, StatusCode::OK);
    let rules = body.as_array().unwrap();
    assert!(!rules.is_empty());
    assert!(rules.iter().all(|r| r["requiredDays"].as_i64().unwrap() > 0));
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (status, body) = send(AppConfig::default(), get("/api/me")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_forged_token() {
    let claims = json!({
        "sub": "user-1",
        "exp": Utc::now().timestamp() + 3600,
    });
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-configured-secret"),
    )
    .unwrap();

    let request = Request::builder()
        .uri("/api/streak")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(AppConfig::default(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_rejected_without_configured_secret() {
    let (status, _) = send(
        AppConfig::default(),
        post_with_bearer("/api/cron/update-lesson-statuses", "anything"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_rejected_with_wrong_secret() {
    let mut config = AppConfig::default();
    config.auth.cron_secret = Some("cron-secret".to_string());

    let (status, _) = send(
        config,
        post_with_bearer("/api/cron/reset-streaks", "cron-secreT"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(AppConfig::default(), get("/api/bets")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_credit_grant_rejects_non_positive_amount() {
    let state = offline_state(AppConfig::default());

    for credits in [0, -3] {
        let result = state
            .credits
            .grant("user-1", credits, rust_decimal::Decimal::new(15000, 2), None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Credit amount must be positive"));
    }
}
