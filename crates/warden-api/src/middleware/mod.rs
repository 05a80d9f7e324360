// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! This module provides the security middleware stack:
//!
//! - [`AuthMiddleware`]: resolves Bearer tokens into an authentication context
//! - [`RequireAccessLayer`]: enforces an access-rule check per route

mod access;
mod auth;

pub use access::{RequireAccessLayer, RequireAccessMiddleware};
pub use auth::{AuthLayer, AuthMiddleware};
