// ABOUTME: Google OAuth2 provider client for authorization URL, code exchange, and profile fetch
// ABOUTME: Classifies every transport and non-2xx failure as a Provider error with upstream context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Provider Client
//!
//! Three operations against Google: build the authorization redirect URL (pure),
//! exchange an authorization code for an access token, and fetch the userinfo
//! profile. No retries anywhere: an authorization code is single-use, so
//! retrying a failed exchange is guaranteed to fail again.

use crate::config::SignonConfig;
use crate::errors::{AuthError, AuthResult};
use crate::models::GoogleProfile;
use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Google authorization endpoint
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google userinfo endpoint
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Requested scopes: profile + email, space-joined in this fixed order
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Error body Google returns on failed exchanges
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// HTTP client for Google's OAuth2 and userinfo endpoints
pub struct GoogleClient {
    client_id: String,
    client_secret: String,
    callback_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    http: reqwest::Client,
}

impl GoogleClient {
    /// Create a client for the validated configuration
    #[must_use]
    pub fn new(config: &SignonConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            auth_url: GOOGLE_AUTH_URL.to_owned(),
            token_url: GOOGLE_TOKEN_URL.to_owned(),
            userinfo_url: GOOGLE_USERINFO_URL.to_owned(),
            http,
        }
    }

    /// Point the client at different endpoint URLs. Used by integration tests
    /// to stand in a local mock provider.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// Build the authorization redirect URL.
    ///
    /// Pure function of configuration: unchanged configuration yields
    /// byte-identical output. Carries no anti-CSRF `state` parameter and no
    /// PKCE challenge; see the crate docs for the security implications.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the configured authorization
    /// endpoint is not a valid URL. The built-in Google endpoint always
    /// parses; this can only fire for an override.
    pub fn authorization_url(&self) -> AuthResult<String> {
        let mut url = Url::parse(&self.auth_url).map_err(|e| {
            AuthError::Internal(anyhow::anyhow!(
                "authorization endpoint `{}` is not a valid URL: {e}",
                self.auth_url
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("client_id", &self.client_id)
            .append_pair("access_type", "offline")
            .append_pair("response_type", "code")
            .append_pair("prompt", "consent")
            .append_pair("scope", &SCOPES.join(" "));
        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] carrying the upstream status and
    /// Google's error string on any transport failure or non-2xx response.
    pub async fn exchange_code(&self, code: &str) -> AuthResult<String> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Provider {
                status: None,
                provider_error: None,
                message: format!("token endpoint request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.exchange_failure(status.as_u16(), &body));
        }

        let payload: TokenResponse =
            response.json().await.map_err(|e| AuthError::Provider {
                status: Some(status.as_u16()),
                provider_error: None,
                message: format!("token endpoint returned an unreadable payload: {e}"),
            })?;

        Ok(payload.access_token)
    }

    /// Classify a failed exchange and log the three most likely causes
    fn exchange_failure(&self, status: u16, body: &str) -> AuthError {
        let parsed: Option<ProviderErrorBody> = serde_json::from_str(body).ok();
        let provider_error = parsed.and_then(|b| match (b.error, b.error_description) {
            (Some(e), Some(d)) => Some(format!("{e}: {d}")),
            (Some(e), None) => Some(e),
            (None, Some(d)) => Some(d),
            (None, None) => None,
        });

        warn!(
            status,
            provider_error = provider_error.as_deref().unwrap_or("none"),
            "code exchange failed; the usual causes are a client id/secret mismatch, \
             a callback URL that differs from the one registered with Google, \
             or a reused/expired authorization code"
        );

        AuthError::Provider {
            status: Some(status),
            provider_error,
            message: format!("token endpoint returned status {status}"),
        }
    }

    /// Fetch the user's profile with a bearer access token.
    ///
    /// The response is mapped strictly to the four-field [`GoogleProfile`];
    /// extra fields are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] on transport failure, non-2xx status,
    /// or an unreadable payload.
    pub async fn fetch_profile(&self, access_token: &str) -> AuthResult<GoogleProfile> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider {
                status: None,
                provider_error: None,
                message: format!("userinfo request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "userinfo request rejected");
            return Err(AuthError::Provider {
                status: Some(status.as_u16()),
                provider_error: (!body.is_empty()).then_some(body),
                message: format!("userinfo endpoint returned status {status}"),
            });
        }

        response.json().await.map_err(|e| AuthError::Provider {
            status: Some(status.as_u16()),
            provider_error: None,
            message: format!("userinfo payload did not match the expected shape: {e}"),
        })
    }
}
