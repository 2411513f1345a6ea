//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Lantern gateway server
//!
//! Loads the TOML configuration, applies command line overrides, and runs
//! the gateway until interrupted.
//!
//! ```text
//! lantern-server [--port N] [--ip ADDR] [--max-connections N] CONFIG
//! ```

mod cli;

use clap::Parser;
use cli::Cli;
use lantern_service::{GatewayConfig, GatewayServer, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    info!("Starting Lantern v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.apply(GatewayConfig::load(&cli.config)?);
    info!("Loaded configuration from {}", cli.config.display());

    let server = GatewayServer::bind(config).await?;
    server.start().await?;
    info!("Lantern listening on {}", server.bind_address());

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, shutting down");
    server.shutdown().await?;

    Ok(())
}
