// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("Warden - authentication and role-based access control service");
    println!();
    println!("Version Information:");
    println!("  warden-bin:  {}", env!("CARGO_PKG_VERSION"));
    println!("  warden-core: {}", warden_core::VERSION);
    println!("  warden-api:  {}", warden_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target: {}", std::env::consts::ARCH);
    println!("  OS:     {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");
    println!();
    println!("For commercial licensing, contact: contact@sylvex.io");

    Ok(())
}
