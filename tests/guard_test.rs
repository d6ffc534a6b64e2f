// ABOUTME: Integration tests for the access guard middleware
// ABOUTME: Covers every rejection code and the identity-attachment success path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{middleware, routing::get, Extension, Json, Router};
use chrono::Duration;
use signon::config::resolver_fn;
use signon::errors::ErrorBody;
use signon::guard::require_session;
use signon::models::{AppUser, GoogleProfile};
use signon::Signon;
use tower::ServiceExt;

mod common;
use common::{base_config, init_tracing};

fn test_signon() -> Signon {
    let config = base_config()
        .resolver(resolver_fn(|profile: GoogleProfile| async move {
            Ok(AppUser::new(profile.id, profile.email))
        }))
        .validate()
        .expect("test configuration must validate");
    Signon::new(config)
}

fn protected_app(signon: Signon) -> Router {
    async fn whoami(Extension(user): Extension<AppUser>) -> Json<AppUser> {
        Json(user)
    }

    Router::new()
        .route("/whoami", get(whoami))
        .layer(middleware::from_fn_with_state(signon, require_session))
}

async fn get_whoami(app: Router, auth_header: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().uri("/whoami");
    if let Some(value) = auth_header {
        request = request.header("authorization", value);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn error_code(body: &serde_json::Value) -> &str {
    body.get("error_code").and_then(|v| v.as_str()).unwrap()
}

#[tokio::test]
async fn test_missing_header_rejects_with_token_missing() {
    init_tracing();
    let (status, body) = get_whoami(protected_app(test_signon()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "token_missing");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_non_bearer_header_rejects_with_token_malformed() {
    init_tracing();
    let (status, body) = get_whoami(protected_app(test_signon()), Some("Basic xyz")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "token_malformed");
}

#[tokio::test]
async fn test_expired_token_rejects_with_token_expired() {
    init_tracing();
    let signon = test_signon();
    let user = AppUser::new("u-42", "ada@example.com");
    let expired = signon
        .tokens()
        .issue_with_lifetime(&user, Duration::seconds(-60))
        .unwrap();
    let (status, body) = get_whoami(
        protected_app(signon),
        Some(&format!("Bearer {expired}")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "token_expired");
}

#[tokio::test]
async fn test_tampered_token_rejects_with_token_invalid() {
    init_tracing();
    let signon = test_signon();
    let user = AppUser::new("u-42", "ada@example.com");
    let token = signon.tokens().issue(&user).unwrap();
    // Flip the signature segment.
    let tampered = format!("{}AAAA", token);
    let (status, body) = get_whoami(
        protected_app(signon),
        Some(&format!("Bearer {tampered}")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "token_invalid");
}

#[tokio::test]
async fn test_valid_token_attaches_signed_identity() {
    init_tracing();
    let signon = test_signon();
    let user = AppUser::new("u-42", "ada@example.com");
    let token = signon.tokens().issue(&user).unwrap();
    let (status, body) = get_whoami(
        protected_app(signon),
        Some(&format!("Bearer {token}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "u-42");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_rejection_body_is_uniform() {
    init_tracing();
    let (_, body) = get_whoami(protected_app(test_signon()), Some("Basic xyz")).await;
    let parsed: ErrorBody = serde_json::from_value(body).unwrap();
    assert!(!parsed.success);
    assert!(!parsed.message.is_empty());
}

#[tokio::test]
async fn test_empty_bearer_token_rejects_with_token_invalid() {
    init_tracing();
    // `Bearer ` is well-shaped but carries nothing; verification classifies it.
    let (status, body) = get_whoami(protected_app(test_signon()), Some("Bearer ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "token_invalid");
}

#[tokio::test]
async fn test_non_utf8_header_rejects_with_token_malformed() {
    init_tracing();
    let value = axum::http::HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap();
    let request = Request::builder()
        .uri("/whoami")
        .header("authorization", value)
        .body(Body::empty())
        .unwrap();
    let response = protected_app(test_signon()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "token_malformed");
}
