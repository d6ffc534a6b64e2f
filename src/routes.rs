// ABOUTME: Mounted HTTP surface: GET /login redirect and GET /callback handler
// ABOUTME: Thin axum glue delegating all flow logic to the Signon controller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Login and callback routes, mounted by the embedder at a path of its choosing:
//!
//! ```rust,no_run
//! use signon::{flow::Signon, routes};
//!
//! # fn build(signon: Signon) {
//! let app: axum::Router = axum::Router::new()
//!     .nest("/auth/google", routes::router(signon));
//! # }
//! ```

use crate::flow::Signon;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

/// Query parameters on the provider callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Single-use authorization code issued by Google
    pub code: Option<String>,
}

/// Build the login + callback router for a sign-in handle
pub fn router(signon: Signon) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .with_state(signon)
}

/// `GET /login`: 302 redirect to Google's authorization endpoint, or a 500
/// with an opaque body if the URL cannot be built
async fn login(State(signon): State<Signon>) -> Response {
    match signon.login_url() {
        Ok(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `GET /callback?code=`: drive the authentication flow to a response
async fn callback(State(signon): State<Signon>, Query(query): Query<CallbackQuery>) -> Response {
    signon.handle_callback(query.code.as_deref()).await
}
