// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use warden_api::ApiServerBuilder;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::settings;
use crate::shutdown::ShutdownCoordinator;

/// Executes the `run` command to start the API server.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let mut config = settings::load(&cli.config)?;

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    info!(version = crate::VERSION, "Starting Warden");

    let server = ApiServerBuilder::new().config(config).build().await?;

    let coordinator = ShutdownCoordinator::new();
    let signal = coordinator.shutdown_signal();

    tokio::spawn(async move {
        coordinator.wait_for_shutdown().await;
    });

    server.run_with_shutdown(signal.wait()).await?;

    info!("Warden stopped");

    Ok(())
}
