// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Shared domain types for the Warden access-control service:
//!
//! - The persisted entities (users, roles, business elements, access rules,
//!   refresh sessions)
//! - The [`Action`] tags an endpoint can declare
//! - The resolved caller [`Identity`]
//!
//! This crate performs no I/O; persistence lives in `warden-store` and the
//! HTTP surface in `warden-api`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod action;
mod identity;
mod model;

pub use action::Action;
pub use identity::{Identity, RoleRef, ADMIN_ROLE};
pub use model::{AccessRule, BusinessElement, Role, Session, User};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
