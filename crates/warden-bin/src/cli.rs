// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! This module provides the command-line interface for Warden using clap.
//! It supports multiple subcommands for different operations:
//!
//! - `run`: Start the API server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `gen-secret`: Generate a JWT signing secret

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Warden - authentication and role-based access control service
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = crate::VERSION,
    about = "Authentication and role-based access control service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "warden.toml",
        env = "WARDEN_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "WARDEN_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "WARDEN_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Warden CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the
    /// server. Useful for checking configuration before deployment.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Generate a JWT signing secret
    ///
    /// Generates a cryptographically secure random secret suitable for
    /// the `jwt.secret` configuration field.
    #[command(name = "gen-secret")]
    GenSecret(GenSecretArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listen port from the configuration file
    #[arg(short, long, env = "WARDEN_PORT")]
    pub port: Option<u16>,

    /// Override the database path from the configuration file
    #[arg(long, env = "WARDEN_DATABASE")]
    pub database: Option<String>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,
}

/// Arguments for the `gen-secret` command.
#[derive(Args, Debug, Clone)]
pub struct GenSecretArgs {
    /// Secret length in bytes before encoding
    // No short flag: -l belongs to the global --log-level.
    #[arg(long, default_value = "48")]
    pub length: usize,
}

impl Default for GenSecretArgs {
    fn default() -> Self {
        Self { length: 48 }
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["warden"]);
        assert!(cli.command.is_none());
        matches!(cli.effective_command(), Commands::Run(_));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["warden", "run", "--port", "9090"]);
        if let Some(Commands::Run(args)) = cli.command {
            assert_eq!(args.port, Some(9090));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["warden", "validate", "--show-config"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["warden", "-c", "/etc/warden/config.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/warden/config.toml"));
    }

    #[test]
    fn test_quiet_mode() {
        let cli = Cli::parse_from(["warden", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.effective_log_level(), "warn");
    }

    #[test]
    fn test_verbose_mode() {
        let cli = Cli::parse_from(["warden", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn test_gen_secret_command() {
        let cli = Cli::parse_from(["warden", "gen-secret", "--length", "64"]);
        if let Some(Commands::GenSecret(args)) = cli.command {
            assert_eq!(args.length, 64);
        } else {
            panic!("Expected GenSecret command");
        }
    }

    // -l stays bound to the global log level, even under gen-secret.
    #[test]
    fn test_short_l_is_log_level_everywhere() {
        let cli = Cli::parse_from(["warden", "gen-secret", "-l", "debug"]);
        assert_eq!(cli.log_level, "debug");
        if let Some(Commands::GenSecret(args)) = cli.command {
            assert_eq!(args.length, 48);
        } else {
            panic!("Expected GenSecret command");
        }
    }
}
