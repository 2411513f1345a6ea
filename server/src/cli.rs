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

//! Command line arguments

use clap::Parser;
use lantern_service::GatewayConfig;
use std::net::IpAddr;
use std::path::PathBuf;

/// Lantern: WebSocket and Telnet gateway for MUD servers.
///
/// Settings come from a TOML configuration file; the flags below override
/// the matching `[general]` entries.
#[derive(Debug, Parser)]
#[command(name = "lantern-server", version, about)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "LANTERN_PORT")]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "LANTERN_IP")]
    pub ip: Option<IpAddr>,

    /// Maximum concurrent connections, 0 for no limit
    #[arg(short = 'c', long, env = "LANTERN_MAX_CONNECTIONS")]
    pub max_connections: Option<usize>,

    /// Path to the configuration file
    #[arg(env = "LANTERN_CONFIG", default_value = "lantern.toml")]
    pub config: PathBuf,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(ip) = self.ip {
            config = config.with_ip(ip);
        }
        match self.max_connections {
            Some(0) => config = config.with_max_connections(None),
            Some(max) => config = config.with_max_connections(Some(max)),
            None => {}
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_file() {
        let cli = Cli::try_parse_from([
            "lantern-server",
            "--port",
            "4000",
            "--ip",
            "127.0.0.1",
            "--max-connections",
            "25",
            "gateway.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("gateway.toml"));

        let config = cli.apply(GatewayConfig::new(8080));
        assert_eq!(config.listen_addr(), "127.0.0.1:4000".parse().unwrap());
        assert_eq!(config.general.connections, Some(25));
    }

    #[test]
    fn test_zero_removes_the_cap() {
        let cli = Cli::try_parse_from(["lantern-server", "-c", "0", "gateway.toml"]).unwrap();
        let config = cli.apply(GatewayConfig::new(8080).with_max_connections(Some(10)));
        assert_eq!(config.general.connections, None);
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let cli = Cli::try_parse_from(["lantern-server", "gateway.toml"]).unwrap();
        let file = GatewayConfig::new(4321).with_max_connections(Some(3));
        assert_eq!(cli.apply(file.clone()), file);
    }
}
