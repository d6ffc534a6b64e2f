// ABOUTME: Access guard middleware verifying bearer session tokens per request
// ABOUTME: Attaches the decoded AppUser to request extensions or rejects with a classified 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Access Guard
//!
//! Stateless per-request check for protected routes. Mounted as axum
//! middleware; handlers behind it receive the decoded identity via
//! `Extension<AppUser>`:
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Extension, Router};
//! use signon::{flow::Signon, guard::require_session, models::AppUser};
//!
//! async fn whoami(Extension(user): Extension<AppUser>) -> String {
//!     user.email
//! }
//!
//! # fn build(signon: Signon) {
//! let protected: Router = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn_with_state(signon, require_session));
//! # }
//! ```

use crate::errors::{AuthError, AuthResult, CredentialCode};
use crate::flow::Signon;
use crate::models::AppUser;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Pull the bearer token out of an Authorization header value.
///
/// The header must be exactly two space-separated parts with the first
/// literally `Bearer`; anything else is a malformed credential.
fn bearer_token(header: &str) -> AuthResult<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        // An empty second part is still shaped like a bearer credential; it
        // goes on to verification and fails there as invalid.
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::credential(
            CredentialCode::TokenMalformed,
            "authorization header must be `Bearer <token>`",
        )),
    }
}

/// Verify the request's session token and attach the identity, or reject.
///
/// Every rejection is a 401 with the uniform
/// `{success: false, error_code, message}` body; the code is `token_missing`,
/// `token_malformed`, `token_expired`, or `token_invalid`.
///
/// # Errors
///
/// Returns [`AuthError::Credential`] when the header is absent or malformed,
/// or when verification fails.
pub async fn require_session(
    State(signon): State<Signon>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(value) = request.headers().get(header::AUTHORIZATION) else {
        return Err(AuthError::credential(
            CredentialCode::TokenMissing,
            "missing authorization header",
        ));
    };
    let header = value.to_str().map_err(|_| {
        AuthError::credential(
            CredentialCode::TokenMalformed,
            "authorization header is not valid UTF-8",
        )
    })?;

    let token = bearer_token(header)?;
    let user: AppUser = signon.tokens().verify(token)?;

    tracing::debug!(user_id = %user.id, "session verified");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
