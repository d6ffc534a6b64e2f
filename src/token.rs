// ABOUTME: Session token issuance and verification over HS256 JWTs
// ABOUTME: Signs minimal {sub, email} claims and classifies every verification failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Session Tokens
//!
//! A session credential is a compact HS256 JWT carrying only the application
//! user's id and email. Validity is solely a function of signature and expiry;
//! there is no server-side session table or revocation list.

use crate::errors::{AuthError, AuthResult, CredentialCode};
use crate::models::{AppUser, Claims};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

/// Issues and verifies session tokens for one signing secret and lifetime
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl SessionTokens {
    /// Create an issuer/verifier from a signing secret and default lifetime
    #[must_use]
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Sign a session token for a user with the configured lifetime.
    ///
    /// Only `id` and `email` are embedded; extension-map fields stay out of the
    /// claim set deliberately.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if JWT encoding fails, which cannot
    /// happen with an HS256 secret and serializable claims.
    pub fn issue(&self, user: &AppUser) -> AuthResult<String> {
        self.issue_with_lifetime(user, self.lifetime)
    }

    /// Sign a session token with an explicit lifetime overriding the default
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if JWT encoding fails.
    pub fn issue_with_lifetime(&self, user: &AppUser, lifetime: Duration) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.into()))
    }

    /// Verify a session token and recover the signed identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Credential`] with code `token_expired` when the
    /// signature is valid but the expiry has passed, and `token_invalid` for
    /// every other failure shape (bad signature, malformed structure, invalid
    /// base64/JSON, not yet valid). No failure is ever swallowed.
    pub fn verify(&self, token: &str) -> AuthResult<AppUser> {
        let mut validation = Validation::default();
        // Exact expiry semantics: the default 60s leeway would let a token
        // outlive its configured lifetime.
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| Self::classify(&e))?;

        Ok(AppUser::new(data.claims.sub, data.claims.email))
    }

    /// Map the JWT library's error taxonomy onto exactly two credential codes
    fn classify(error: &jsonwebtoken::errors::Error) -> AuthError {
        use jsonwebtoken::errors::ErrorKind;

        tracing::warn!("session token verification failed: {error:?}");
        match error.kind() {
            ErrorKind::ExpiredSignature => AuthError::credential(
                CredentialCode::TokenExpired,
                "session token has expired",
            ),
            // Bad signature, malformed structure, not-yet-valid, and any
            // unrecognized failure shape all classify as invalid.
            _ => AuthError::credential(
                CredentialCode::TokenInvalid,
                "session token is invalid",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> SessionTokens {
        SessionTokens::new("0123456789abcdef0123456789abcdef", Duration::days(7))
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let tokens = tokens();
        let user = AppUser::new("u-42", "ada@example.com");
        let signed = tokens.issue(&user).unwrap();
        let decoded = tokens.verify(&signed).unwrap();
        assert_eq!(decoded.id, "u-42");
        assert_eq!(decoded.email, "ada@example.com");
    }

    #[test]
    fn test_extension_fields_are_not_signed() {
        let tokens = tokens();
        let mut user = AppUser::new("u-42", "ada@example.com");
        user.extra
            .insert("role".into(), serde_json::Value::String("admin".into()));
        let signed = tokens.issue(&user).unwrap();
        let decoded = tokens.verify(&signed).unwrap();
        assert!(decoded.extra.is_empty());
    }

    #[test]
    fn test_expired_token_classifies_as_token_expired() {
        let tokens = tokens();
        let user = AppUser::new("u-42", "ada@example.com");
        let signed = tokens
            .issue_with_lifetime(&user, Duration::seconds(-30))
            .unwrap();
        let err = tokens.verify(&signed).unwrap_err();
        assert_eq!(err.error_code(), "token_expired");
    }

    #[test]
    fn test_wrong_secret_classifies_as_token_invalid() {
        let user = AppUser::new("u-42", "ada@example.com");
        let signed = SessionTokens::new("one-secret-one-secret-one-secret", Duration::days(1))
            .issue(&user)
            .unwrap();
        let err = tokens().verify(&signed).unwrap_err();
        assert_eq!(err.error_code(), "token_invalid");
    }

    #[test]
    fn test_garbage_token_classifies_as_token_invalid() {
        for garbage in ["", "not-a-jwt", "a.b", "a.b.c.d"] {
            let err = tokens().verify(garbage).unwrap_err();
            assert_eq!(err.error_code(), "token_invalid", "input: {garbage:?}");
        }
    }
}
