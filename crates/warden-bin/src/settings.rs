// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration file loading.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. The TOML configuration file
//! 3. `WARDEN_*` environment variables
//!
//! The JWT secret is never written back out by the config serializer, so
//! `WARDEN_JWT_SECRET` is the usual way to supply it in deployments.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use warden_api::ApiConfig;

// =============================================================================
// Loading
// =============================================================================

/// Loads the configuration from `path`, applying environment overrides.
///
/// A missing file is not an error: defaults are used so that a fresh
/// checkout can start with nothing but `WARDEN_JWT_SECRET` set.
pub fn load(path: &Path) -> Result<ApiConfig> {
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    } else {
        warn!(path = %path.display(), "Config file not found, using defaults");
        ApiConfig::default()
    };

    apply_env_overrides(&mut config)?;

    debug!(
        host = %config.host,
        port = config.port,
        database = %config.database_path,
        "Configuration loaded"
    );

    Ok(config)
}

/// Applies `WARDEN_*` environment variable overrides.
fn apply_env_overrides(config: &mut ApiConfig) -> Result<()> {
    if let Ok(host) = std::env::var("WARDEN_HOST") {
        config.host = host
            .parse()
            .with_context(|| format!("Invalid WARDEN_HOST: {}", host))?;
    }
    if let Ok(port) = std::env::var("WARDEN_PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("Invalid WARDEN_PORT: {}", port))?;
    }
    if let Ok(database) = std::env::var("WARDEN_DATABASE") {
        config.database_path = database;
    }
    if let Ok(secret) = std::env::var("WARDEN_JWT_SECRET") {
        config.jwt.secret = secret;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load(Path::new("/nonexistent/warden.toml")).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, "warden.db");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 9090
database_path = "/var/lib/warden/warden.db"

[jwt]
issuer = "warden-test"
ttl_secs = 600
"#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, "/var/lib/warden/warden.db");
        assert_eq!(config.jwt.issuer, "warden-test");
        assert_eq!(config.jwt.ttl_secs, 600);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        assert!(load(file.path()).is_err());
    }
}
