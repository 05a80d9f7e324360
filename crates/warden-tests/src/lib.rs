// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Warden Integration Tests
//!
//! Integration tests for the Warden access-control service, exercising the
//! full router (middleware included) against an in-memory database.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `harness`: In-memory test application and HTTP helpers
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p warden-tests
//!
//! # Run a specific suite
//! cargo test -p warden-tests --test integration_api
//! cargo test -p warden-tests --test integration_store
//! ```

#![deny(unsafe_code)]

pub mod common;
