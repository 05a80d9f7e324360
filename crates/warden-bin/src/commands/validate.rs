// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use crate::cli::{Cli, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::settings;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = settings::load(config_path)?;

    let mut warnings: Vec<String> = Vec::new();

    if config.jwt.secret.is_empty() {
        warnings.push(
            "No JWT secret configured; set jwt.secret or WARDEN_JWT_SECRET".to_string(),
        );
    } else if config.jwt.secret.len() < 32 {
        warnings.push("JWT secret is shorter than recommended (32 bytes)".to_string());
    }
    if config.cors.allowed_origins.contains(&"*".to_string()) && config.cors.allow_credentials {
        warnings.push("CORS allows any origin with credentials".to_string());
    }

    println!("Configuration is valid: {}", config_path.display());
    println!();
    println!("Summary:");
    println!("  Listen:   {}", config.socket_addr());
    println!("  Database: {}", config.database_path);
    println!("  Issuer:   {}", config.jwt.issuer);
    println!("  Token TTL: {}s", config.jwt.ttl_secs);

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    if args.show_config {
        println!();
        println!("Parsed configuration:");
        // The serializer skips the JWT secret, so this is safe to print.
        println!(
            "{}",
            toml::to_string_pretty(&config)
                .unwrap_or_else(|_| "(serialization error)".to_string())
        );
    }

    Ok(())
}
