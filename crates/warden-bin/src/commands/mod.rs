// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the API server
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `gen-secret`: Generate a JWT signing secret

mod run;
mod secret;
mod validate;
mod version;

pub use run::run;
pub use secret::gen_secret;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::GenSecret(args) => secret::gen_secret(&cli, args),
    }
}
