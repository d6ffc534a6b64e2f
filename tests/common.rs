// ABOUTME: Shared helpers for integration tests
// ABOUTME: Tracing setup and a baseline validated configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(dead_code)]

use signon::config::{ConfigBuilder, GoogleOptions, SignonOptions, TokenOptions};

/// Initialize test tracing once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("signon=debug")
        .try_init();
}

/// Baseline builder with complete, well-formed credentials
pub fn base_config() -> ConfigBuilder {
    ConfigBuilder::new().merge(SignonOptions {
        google: Some(GoogleOptions {
            client_id: Some("client-123".into()),
            client_secret: Some("secret-456".into()),
            callback_url: Some("https://app.example.com/auth/callback".into()),
        }),
        token: Some(TokenOptions {
            secret: Some("0123456789abcdef0123456789abcdef".into()),
            lifetime: None,
        }),
        production: None,
    })
}
