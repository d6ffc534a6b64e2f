// ABOUTME: Core data shapes shared across the sign-in flow
// ABOUTME: Google profile, application user record, and session claim set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Data models for the sign-in flow

use serde::{Deserialize, Serialize};

/// Profile returned by Google's userinfo endpoint, mapped strictly to four
/// fields. Extra response fields are dropped on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleProfile {
    /// Google account identifier
    pub id: String,
    /// Account email address
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Avatar URL
    #[serde(default)]
    pub picture: String,
}

/// Application user record produced by the embedder's user-resolution callback.
///
/// The contract is a fixed required core (`id`, `email`) plus an open extension
/// map for arbitrary embedder-defined attributes. Integer ids should be
/// stringified by the resolver. Only `id` and `email` are ever embedded in the
/// session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppUser {
    /// Unique application user identifier
    pub id: String,
    /// User email address
    pub email: String,
    /// Embedder-defined extra attributes, passed through but never signed
    #[serde(flatten, default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppUser {
    /// Create a user with just the required core fields
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// JWT claim set for a session credential. Deliberately minimal: arbitrary
/// extra user fields are not embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Application user identifier
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,
}
