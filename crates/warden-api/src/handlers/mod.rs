// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! This module contains the handler implementations for all API endpoints:
//!
//! - [`health`]: Health check endpoints
//! - [`auth`]: Registration, login, refresh, logout, profile
//! - [`admin`]: Role, element, and access-rule management

mod admin;
mod auth;
mod health;

pub use admin::*;
pub use auth::*;
pub use health::*;
