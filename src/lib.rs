// ABOUTME: Main library entry point for the Google sign-in and session layer
// ABOUTME: Re-exports the configuration, flow controller, routes, and access guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # signon
//!
//! A drop-in "login with Google" layer for axum applications: build the Google
//! authorization redirect, exchange the authorization code, fetch the profile,
//! delegate user persistence to an embedder-supplied callback, issue an HS256
//! session token, and verify it on subsequent requests.
//!
//! ## Usage
//!
//! Configure once, validate once, then mount the routes and guard:
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Extension, Router};
//! use signon::config::{resolver_fn, ConfigBuilder};
//! use signon::flow::Signon;
//! use signon::models::AppUser;
//!
//! # fn main() -> Result<(), signon::errors::AuthError> {
//! let config = ConfigBuilder::from_env()
//!     .resolver(resolver_fn(|profile: signon::models::GoogleProfile| async move {
//!         // find-or-create against your own storage
//!         Ok(AppUser::new(profile.id, profile.email))
//!     }))
//!     .validate()?;
//!
//! let signon = Signon::new(config);
//!
//! let app: Router = Router::new()
//!     .route(
//!         "/me",
//!         get(|Extension(user): Extension<AppUser>| async move { user.email }),
//!     )
//!     .layer(middleware::from_fn_with_state(
//!         signon.clone(),
//!         signon::guard::require_session,
//!     ))
//!     .nest("/auth/google", signon::routes::router(signon));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error model
//!
//! Every failure crossing the crate boundary is a classified
//! [`errors::AuthError`] carrying a machine code: configuration faults are
//! fatal at [`config::ConfigBuilder::validate`]; provider, user-resolution,
//! and credential faults are contained per request and surface as
//! `{success: false, error_code, message}` with inner causes logged
//! server-side only.
//!
//! ## Security notes
//!
//! The authorization flow carries no anti-CSRF `state` parameter and no PKCE
//! verifier; `validate()` logs a warning to that effect. Tokens are stateless:
//! there is no revocation list, validity is signature plus expiry.

/// Configuration builder, validation, and the user-resolution seam
pub mod config;

/// Classified error taxonomy and the uniform JSON error body
pub mod errors;

/// Authentication flow controller
pub mod flow;

/// Access guard middleware for protected routes
pub mod guard;

/// Shared data models: Google profile, application user, claims
pub mod models;

/// Google OAuth2 provider client
pub mod provider;

/// Login and callback routes
pub mod routes;

/// Session token issuance and verification
pub mod token;

pub use config::{ConfigBuilder, SignonConfig, UserResolver};
pub use errors::{AuthError, AuthResult, CredentialCode, ErrorBody};
pub use flow::Signon;
pub use models::{AppUser, GoogleProfile};
