// ABOUTME: Classified error taxonomy for the sign-in flow and session guard
// ABOUTME: Maps every failure to a machine-readable code and a client-safe JSON body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Classified Errors
//!
//! Every failure that crosses the crate boundary is one [`AuthError`]. The four
//! kinds distinguish who is at fault: the embedder's configuration, the identity
//! provider, the embedder's user-resolution callback, or the presented session
//! credential. Each carries a machine code surfaced in the JSON error body; inner
//! causes and upstream response bodies are logged server-side and never serialized.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine codes for session-credential failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialCode {
    /// No Authorization header on the request
    #[serde(rename = "token_missing")]
    TokenMissing,
    /// Authorization header is not exactly `Bearer <token>`
    #[serde(rename = "token_malformed")]
    TokenMalformed,
    /// Signature checks out but the expiry has passed
    #[serde(rename = "token_expired")]
    TokenExpired,
    /// Bad signature, malformed structure, or not yet valid
    #[serde(rename = "token_invalid")]
    TokenInvalid,
}

impl CredentialCode {
    /// Machine-readable code string for this credential failure
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenMissing => "token_missing",
            Self::TokenMalformed => "token_malformed",
            Self::TokenExpired => "token_expired",
            Self::TokenInvalid => "token_invalid",
        }
    }
}

/// Unified error type for the sign-in flow, configuration, and guard
#[derive(Debug, Error)]
pub enum AuthError {
    /// Configuration is invalid or incomplete. Fatal: must prevent startup.
    #[error("configuration error in `{field}`: {hint}")]
    Config {
        /// Field path that failed validation (e.g. `google.client_id`)
        field: &'static str,
        /// Remediation hint for the developer
        hint: String,
    },

    /// The identity provider rejected or failed an HTTP exchange.
    #[error("provider request failed: {message}")]
    Provider {
        /// Upstream HTTP status, when a response was received
        status: Option<u16>,
        /// Provider's own error string/description, when present in the body
        provider_error: Option<String>,
        /// Transport or summary message (server-side only)
        message: String,
    },

    /// The embedder's user-resolution callback failed.
    #[error("user resolution failed")]
    UserResolution {
        /// Original callback failure, preserved for diagnostics only
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A presented session credential was missing, malformed, expired, or invalid.
    #[error("credential rejected ({code}): {message}", code = .code.as_str())]
    Credential {
        /// Classified credential failure code
        code: CredentialCode,
        /// Client-safe description
        message: String,
    },

    /// The provider callback arrived without a `code` query parameter.
    #[error("callback request is missing the `code` query parameter")]
    MissingCode,

    /// Anything that should not happen under validated configuration.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    /// Machine-readable code surfaced to clients for this error
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "invalid_config",
            Self::Provider { .. } => "oauth_failed",
            Self::UserResolution { .. } => "database_error",
            Self::Credential { code, .. } => code.as_str(),
            Self::MissingCode => "missing_code",
            Self::Internal(_) => "unknown_error",
        }
    }

    /// HTTP status for this error when it crosses the boundary
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::Credential { .. } => StatusCode::UNAUTHORIZED,
            Self::Config { .. }
            | Self::Provider { .. }
            | Self::UserResolution { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message: never an upstream body, stack trace, or driver error
    #[must_use]
    pub fn safe_message(&self) -> String {
        match self {
            Self::Config { field, hint } => format!("configuration error in `{field}`: {hint}"),
            Self::Provider { .. } => "authentication with the identity provider failed".into(),
            Self::UserResolution { .. } => "failed to resolve the application user".into(),
            Self::Credential { message, .. } => message.clone(),
            Self::MissingCode => "missing `code` query parameter".into(),
            Self::Internal(_) => "an internal error occurred".into(),
        }
    }

    /// Shorthand for a classified credential failure
    #[must_use]
    pub fn credential(code: CredentialCode, message: impl Into<String>) -> Self {
        Self::Credential {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a configuration failure with a remediation hint
    #[must_use]
    pub fn config(field: &'static str, hint: impl Into<String>) -> Self {
        Self::Config {
            field,
            hint: hint.into(),
        }
    }
}

/// Result type alias for convenience
pub type AuthResult<T> = Result<T, AuthError>;

/// Uniform JSON body for every rejection crossing the boundary
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error_code: String,
    pub message: String,
}

impl From<&AuthError> for ErrorBody {
    fn from(error: &AuthError) -> Self {
        Self {
            success: false,
            error_code: error.error_code().to_owned(),
            message: error.safe_message(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Full detail (including wrapped causes) stays server-side.
        tracing::error!(
            error_code = self.error_code(),
            error = %self,
            source = ?std::error::Error::source(&self),
            "request failed"
        );
        (self.http_status(), Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::MissingCode.error_code(), "missing_code");
        assert_eq!(
            AuthError::credential(CredentialCode::TokenExpired, "expired").error_code(),
            "token_expired"
        );
        let provider = AuthError::Provider {
            status: Some(400),
            provider_error: Some("invalid_grant".into()),
            message: "exchange failed".into(),
        };
        assert_eq!(provider.error_code(), "oauth_failed");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(AuthError::MissingCode.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::credential(CredentialCode::TokenMissing, "no header").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::config("google.client_id", "set GOOGLE_CLIENT_ID").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_provider_details_never_reach_the_error_body() {
        let error = AuthError::Provider {
            status: Some(401),
            provider_error: Some("invalid_client: secret mismatch for acme".into()),
            message: "token endpoint returned 401".into(),
        };
        let body = ErrorBody::from(&error);
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("oauth_failed"));
        assert!(!json.contains("secret mismatch"));
        assert!(!json.contains("401"));
    }

    #[test]
    fn test_user_resolution_cause_is_preserved_for_logs() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "db down");
        let error = AuthError::UserResolution {
            source: Box::new(inner),
        };
        assert_eq!(error.error_code(), "database_error");
        let source = std::error::Error::source(&error).unwrap();
        assert!(source.to_string().contains("db down"));
        assert!(!error.safe_message().contains("db down"));
    }
}
