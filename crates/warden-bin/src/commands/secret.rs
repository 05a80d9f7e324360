// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-secret` command.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::cli::{Cli, GenSecretArgs};
use crate::error::{BinError, BinResult};

/// Minimum acceptable secret length in bytes.
const MIN_SECRET_BYTES: usize = 32;

/// Executes the `gen-secret` command to generate a JWT signing secret.
pub fn gen_secret(_cli: &Cli, args: GenSecretArgs) -> BinResult<()> {
    if args.length < MIN_SECRET_BYTES {
        return Err(BinError::Configuration(format!(
            "Secret length must be at least {} bytes",
            MIN_SECRET_BYTES
        )));
    }

    let mut bytes = vec![0u8; args.length];
    OsRng.fill_bytes(&mut bytes);

    println!("{}", URL_SAFE_NO_PAD.encode(&bytes));

    eprintln!();
    eprintln!("Store this secret securely. To use it:");
    eprintln!("  - Set jwt.secret in warden.toml, or");
    eprintln!("  - export WARDEN_JWT_SECRET=<secret>");

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_short_secret_rejected() {
        let cli = Cli::parse_from(["warden"]);
        let result = gen_secret(&cli, GenSecretArgs { length: 8 });
        assert!(result.is_err());
    }

    #[test]
    fn test_default_length_accepted() {
        let cli = Cli::parse_from(["warden"]);
        assert!(gen_secret(&cli, GenSecretArgs::default()).is_ok());
    }
}
