// ABOUTME: Authentication flow controller driving login and callback end to end
// ABOUTME: Exchange, profile fetch, user resolution, token issuance, hook-or-default responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Flow Controller
//!
//! [`Signon`] is the explicit, validated handle embedders construct once and
//! share: it owns the configuration, provider client, and token issuer. The
//! callback flow is strictly sequential per request: exchange the code, fetch
//! the profile, resolve the application user, issue a session token. The first
//! failure terminates the flow with a classified error; the embedder's hooks,
//! when configured, take over response production entirely.

use crate::config::SignonConfig;
use crate::errors::{AuthError, AuthResult, ErrorBody};
use crate::provider::GoogleClient;
use crate::token::SessionTokens;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::models::AppUser;

/// Default JSON body for a successful callback
#[derive(Debug, Serialize)]
struct SuccessBody<'a> {
    success: bool,
    token: &'a str,
    user: &'a AppUser,
}

struct Inner {
    config: SignonConfig,
    google: GoogleClient,
    tokens: SessionTokens,
}

/// Validated sign-in handle: flow controller plus everything the guard needs.
///
/// Cheap to clone; clones share the same configuration and HTTP client.
#[derive(Clone)]
pub struct Signon {
    inner: Arc<Inner>,
}

impl Signon {
    /// Build the sign-in layer from validated configuration
    #[must_use]
    pub fn new(config: SignonConfig) -> Self {
        let google = GoogleClient::new(&config, reqwest::Client::new());
        let tokens = SessionTokens::new(&config.secret, config.lifetime);
        Self {
            inner: Arc::new(Inner {
                config,
                google,
                tokens,
            }),
        }
    }

    /// Build the sign-in layer with a custom provider client. Used by tests to
    /// point the exchange and profile fetch at a mock provider.
    #[must_use]
    pub fn with_provider(config: SignonConfig, google: GoogleClient) -> Self {
        let tokens = SessionTokens::new(&config.secret, config.lifetime);
        Self {
            inner: Arc::new(Inner {
                config,
                google,
                tokens,
            }),
        }
    }

    /// Authorization URL for the login redirect
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the authorization endpoint cannot
    /// be parsed as a URL; impossible with the built-in Google endpoint.
    pub fn login_url(&self) -> AuthResult<String> {
        self.inner.google.authorization_url()
    }

    /// Token issuer/verifier, shared with the access guard
    #[must_use]
    pub fn tokens(&self) -> &SessionTokens {
        &self.inner.tokens
    }

    /// Drive the callback sequence for an authorization code.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the first failed step: `MissingCode`,
    /// a Provider error from exchange or profile fetch, a `UserResolution`
    /// error wrapping the callback's failure, or `Internal` from issuance.
    pub async fn authenticate(&self, code: Option<&str>) -> AuthResult<(AppUser, String)> {
        let code = code.ok_or(AuthError::MissingCode)?;

        let access_token = self.inner.google.exchange_code(code).await?;
        let profile = self.inner.google.fetch_profile(&access_token).await?;

        info!(google_id = %profile.id, "provider round-trip complete, resolving user");
        let user = self
            .inner
            .config
            .resolver
            .resolve(profile)
            .await
            .map_err(|source| AuthError::UserResolution { source })?;

        let token = self.inner.tokens.issue(&user)?;
        info!(user_id = %user.id, "authentication complete");
        Ok((user, token))
    }

    /// Run the callback flow and produce the HTTP response: the embedder's
    /// hook when configured, the default JSON shape otherwise.
    pub async fn handle_callback(&self, code: Option<&str>) -> Response {
        match self.authenticate(code).await {
            Ok((user, token)) => match &self.inner.config.on_success {
                Some(hook) => hook(&user, &token),
                None => (
                    StatusCode::OK,
                    Json(SuccessBody {
                        success: true,
                        token: &token,
                        user: &user,
                    }),
                )
                    .into_response(),
            },
            Err(err) => {
                // Full detail stays server-side; the hook is trusted with it.
                error!(
                    error_code = err.error_code(),
                    error = %err,
                    source = ?std::error::Error::source(&err),
                    "callback flow failed"
                );
                match &self.inner.config.on_error {
                    Some(hook) => hook(&err),
                    None => {
                        (err.http_status(), Json(ErrorBody::from(&err))).into_response()
                    }
                }
            }
        }
    }
}
