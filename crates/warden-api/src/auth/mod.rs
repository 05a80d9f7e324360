// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - JWT token signing and validation
//! - The authentication context attached to requests
//! - The access-rule authorization engine

mod claims;
mod context;
mod engine;
mod jwt;

pub use claims::Claims;
pub use context::AuthContext;
pub use engine::AccessEngine;
pub use jwt::{JwtConfig, TokenSigner};
