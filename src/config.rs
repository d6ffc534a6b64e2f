// ABOUTME: Configuration builder and validation for the Google sign-in layer
// ABOUTME: Overlay-merge options, env loading, ordered fatal checks, advisory diagnostics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Configuration
//!
//! Configuration is built once (partial overlays merge per section), validated
//! once, and immutable thereafter. There is no process-wide singleton: the
//! validated [`SignonConfig`] is handed to [`crate::flow::Signon`] at
//! construction and shared read-only from there.
//!
//! Validation separates fatal checks (missing credentials, missing resolver)
//! from advisory diagnostics (placeholder-looking values, short or known-weak
//! signing secrets, insecure callback URL in production). Advisory findings are
//! logged and never block startup.

use crate::errors::{AuthError, AuthResult};
use crate::models::{AppUser, GoogleProfile};
use async_trait::async_trait;
use axum::response::Response;
use chrono::Duration;
use std::env;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Boxed error type accepted from the embedder's user-resolution callback
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Default session token lifetime when none is configured
pub const DEFAULT_LIFETIME: &str = "7 days";

/// Signing secrets that must never appear outside local experiments
const KNOWN_WEAK_SECRETS: &[&str] = &[
    "secret",
    "changeme",
    "password",
    "jwt-secret",
    "dev-secret",
    "supersecret",
];

/// Embedder-supplied mapping from a Google profile to an application user.
///
/// The callback owns persistence entirely: this crate never stores the user,
/// it only passes the record through and signs its `id` and `email`.
#[async_trait]
pub trait UserResolver: Send + Sync {
    /// Resolve (find or create) the application user for a Google profile
    async fn resolve(&self, profile: GoogleProfile) -> Result<AppUser, BoxError>;
}

struct FnResolver<F>(F);

#[async_trait]
impl<F, Fut> UserResolver for FnResolver<F>
where
    F: Fn(GoogleProfile) -> Fut + Send + Sync,
    Fut: Future<Output = Result<AppUser, BoxError>> + Send,
{
    async fn resolve(&self, profile: GoogleProfile) -> Result<AppUser, BoxError> {
        (self.0)(profile).await
    }
}

/// Adapt an async closure into a [`UserResolver`]
pub fn resolver_fn<F, Fut>(f: F) -> impl UserResolver
where
    F: Fn(GoogleProfile) -> Fut + Send + Sync,
    Fut: Future<Output = Result<AppUser, BoxError>> + Send,
{
    FnResolver(f)
}

/// Hook invoked with (user, token) on successful authentication; takes over
/// response production entirely.
pub type SuccessHook = Box<dyn Fn(&AppUser, &str) -> Response + Send + Sync>;

/// Hook invoked with the classified error on any per-request failure; receives
/// the full error (including inner causes) and takes over response production.
pub type ErrorHook = Box<dyn Fn(&AuthError) -> Response + Send + Sync>;

/// Partial Google credential settings for overlay merging
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct GoogleOptions {
    /// OAuth client ID
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Callback URL registered with Google
    pub callback_url: Option<String>,
}

/// Partial session token settings for overlay merging
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TokenOptions {
    /// Signing secret for session tokens
    pub secret: Option<String>,
    /// Token lifetime as a human duration string, e.g. "7 days", "12h", "30m"
    pub lifetime: Option<String>,
}

/// Partial configuration: later overlays replace only the fields present,
/// section by section.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SignonOptions {
    /// Google credential section
    pub google: Option<GoogleOptions>,
    /// Session token section
    pub token: Option<TokenOptions>,
    /// Treat the deployment as production for advisory checks
    pub production: Option<bool>,
}

/// Accumulates configuration before validation
pub struct ConfigBuilder {
    client_id: String,
    client_secret: String,
    callback_url: String,
    secret: String,
    lifetime: String,
    production: bool,
    resolver: Option<Arc<dyn UserResolver>>,
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: String::new(),
            secret: String::new(),
            lifetime: DEFAULT_LIFETIME.to_owned(),
            production: false,
            resolver: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl ConfigBuilder {
    /// Start from empty configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the environment:
    /// `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_CALLBACK_URL`,
    /// `SESSION_SECRET`, `SESSION_LIFETIME`, and `APP_ENV` (production flag).
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().merge(SignonOptions {
            google: Some(GoogleOptions {
                client_id: env::var("GOOGLE_CLIENT_ID").ok(),
                client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
                callback_url: env::var("GOOGLE_CALLBACK_URL").ok(),
            }),
            token: Some(TokenOptions {
                secret: env::var("SESSION_SECRET").ok(),
                lifetime: env::var("SESSION_LIFETIME").ok(),
            }),
            production: Some(
                env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production")),
            ),
        })
    }

    /// Overlay partial options: fields present replace, fields absent keep the
    /// current value. No validation happens here.
    #[must_use]
    pub fn merge(mut self, options: SignonOptions) -> Self {
        if let Some(google) = options.google {
            if let Some(client_id) = google.client_id {
                self.client_id = client_id;
            }
            if let Some(client_secret) = google.client_secret {
                self.client_secret = client_secret;
            }
            if let Some(callback_url) = google.callback_url {
                self.callback_url = callback_url;
            }
        }
        if let Some(token) = options.token {
            if let Some(secret) = token.secret {
                self.secret = secret;
            }
            if let Some(lifetime) = token.lifetime {
                self.lifetime = lifetime;
            }
        }
        if let Some(production) = options.production {
            self.production = production;
        }
        self
    }

    /// Set the required user-resolution callback
    #[must_use]
    pub fn resolver(mut self, resolver: impl UserResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the optional success hook invoked with (user, token)
    #[must_use]
    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AppUser, &str) -> Response + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(hook));
        self
    }

    /// Set the optional error hook invoked with the classified error
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AuthError) -> Response + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// Fatal checks run in a fixed precedence order so the most diagnosable
    /// error surfaces first: when client id, client secret, and signing secret
    /// are all empty at once, a single combined error points at unloaded
    /// environment variables instead of a misleading single-field error.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] naming the first missing required field.
    pub fn validate(self) -> AuthResult<SignonConfig> {
        if self.client_id.is_empty() && self.client_secret.is_empty() && self.secret.is_empty() {
            return Err(AuthError::config(
                "configuration",
                "client id, client secret, and signing secret are all empty - \
                 were the environment variables ever loaded?",
            ));
        }
        if self.client_id.is_empty() {
            return Err(AuthError::config(
                "google.client_id",
                "set GOOGLE_CLIENT_ID or pass google.client_id",
            ));
        }
        if self.client_secret.is_empty() {
            return Err(AuthError::config(
                "google.client_secret",
                "set GOOGLE_CLIENT_SECRET or pass google.client_secret",
            ));
        }
        if self.callback_url.is_empty() {
            return Err(AuthError::config(
                "google.callback_url",
                "set GOOGLE_CALLBACK_URL or pass google.callback_url",
            ));
        }
        if self.secret.is_empty() {
            return Err(AuthError::config(
                "token.secret",
                "set SESSION_SECRET or pass token.secret",
            ));
        }
        let Some(resolver) = self.resolver.clone() else {
            return Err(AuthError::config(
                "resolver",
                "a user-resolution callback is required; pass one via ConfigBuilder::resolver",
            ));
        };
        let lifetime = parse_lifetime(&self.lifetime).map_err(|hint| {
            AuthError::config("token.lifetime", hint)
        })?;

        self.advisories();

        Ok(SignonConfig {
            client_id: self.client_id,
            client_secret: self.client_secret,
            callback_url: self.callback_url,
            secret: self.secret,
            lifetime,
            production: self.production,
            resolver,
            on_success: self.on_success,
            on_error: self.on_error,
        })
    }

    /// Non-fatal diagnostics: logged, never block startup
    fn advisories(&self) {
        for (field, value) in [
            ("google.client_id", &self.client_id),
            ("google.client_secret", &self.client_secret),
        ] {
            if looks_like_placeholder(value) {
                warn!("{field} looks like a placeholder value: check your credentials");
            }
        }
        if self.secret.len() < 32 {
            warn!(
                "token.secret is only {} characters; use at least 32 for a signing secret",
                self.secret.len()
            );
        }
        if KNOWN_WEAK_SECRETS.contains(&self.secret.to_lowercase().as_str()) {
            warn!("token.secret matches a known-weak value; rotate it before deploying");
        }
        if self.production && self.callback_url.starts_with("http://") {
            warn!(
                "google.callback_url uses plain http in production: {}",
                self.callback_url
            );
        }
        // Known protocol gap, flagged deliberately rather than replicated silently.
        warn!(
            "authorization flow carries no anti-CSRF state parameter or PKCE verifier; \
             do not treat the callback endpoint as CSRF-protected"
        );
    }
}

fn looks_like_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.contains("your-")
        || lower.contains("xxx")
        || lower.contains("changeme")
        || lower.starts_with('<')
}

/// Parse a human duration string like "7 days", "12h", "30 min", "45s".
///
/// Accepted units: seconds, minutes, hours, days, weeks (full names, common
/// abbreviations, singular or plural).
pub fn parse_lifetime(input: &str) -> Result<Duration, String> {
    let trimmed = input.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(digits_end);
    let count: i64 = number
        .parse()
        .map_err(|_| format!("invalid duration `{input}`: expected e.g. \"7 days\" or \"12h\""))?;
    if count <= 0 {
        return Err(format!("invalid duration `{input}`: must be positive"));
    }
    match unit.trim() {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(Duration::seconds(count)),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(Duration::minutes(count)),
        "h" | "hr" | "hrs" | "hour" | "hours" => Ok(Duration::hours(count)),
        "d" | "day" | "days" => Ok(Duration::days(count)),
        "w" | "week" | "weeks" => Ok(Duration::weeks(count)),
        other => Err(format!("invalid duration unit `{other}` in `{input}`")),
    }
}

/// Validated, immutable configuration shared by the flow controller and guard
pub struct SignonConfig {
    /// Google OAuth client ID
    pub client_id: String,
    /// Google OAuth client secret
    pub client_secret: String,
    /// Callback URL registered with Google
    pub callback_url: String,
    /// Session token signing secret
    pub secret: String,
    /// Session token lifetime
    pub lifetime: Duration,
    /// Production deployment flag (advisory checks only)
    pub production: bool,
    /// Embedder's user-resolution callback
    pub resolver: Arc<dyn UserResolver>,
    /// Optional success hook
    pub on_success: Option<SuccessHook>,
    /// Optional error hook
    pub on_error: Option<ErrorHook>,
}

impl std::fmt::Debug for SignonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignonConfig")
            .field("client_id", &self.client_id)
            .field("client_secret_len", &self.client_secret.len())
            .field("callback_url", &self.callback_url)
            .field("secret_len", &self.secret.len())
            .field("lifetime", &self.lifetime)
            .field("production", &self.production)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
