// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! REST API server for the Warden access-control service.
//!
//! This crate provides the HTTP API server with JWT authentication,
//! session-backed refresh tokens, and rule-based authorization.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{AccessEngine, AuthContext, Claims, JwtConfig, TokenSigner};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
