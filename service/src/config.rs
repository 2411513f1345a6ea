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

//! Gateway configuration
//!
//! The configuration is read once at startup and shared read-only between
//! connections. It is usually loaded from TOML:
//!
//! ```toml
//! [general]
//! port = 4000
//! default = "mud"
//! origins = ["http://example.com"]
//! blacklist = ["10.0.0.5"]
//!
//! [hosts.mud]
//! name = "My MUD"
//! host = "localhost"
//! port = 5000
//!
//! [users.alice]
//! password = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"
//! group = "staff"
//! ```
//!
//! Configurations can also be assembled in code:
//!
//! ```
//! use lantern_service::{GatewayConfig, Host, User};
//!
//! let config = GatewayConfig::new(4000)
//!     .with_host(Host::new("mud", "localhost", 5000).with_name("My MUD"))
//!     .with_user(User::from_password("alice", "test").with_group("staff"))
//!     .with_default_host("mud");
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete gateway configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// Listener settings and global policy
    #[serde(default)]
    pub general: GeneralConfig,
    /// Upstream servers, ordered by key
    #[serde(default)]
    pub hosts: BTreeMap<String, Host>,
    /// Accounts, by user name
    #[serde(default)]
    pub users: BTreeMap<String, User>,
}

/// Listener settings and global policy
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Address to bind to
    #[serde(default = "default_ip")]
    pub ip: IpAddr,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum simultaneous connections, unlimited when absent
    #[serde(default)]
    pub connections: Option<usize>,
    /// Key of the host a WebSocket client reaches when its path names nothing else
    #[serde(default, rename = "default")]
    pub default_host: Option<String>,
    /// Allowed WebSocket `Origin` values; empty allows every origin
    #[serde(default)]
    pub origins: Vec<String>,
    /// Peers that are dropped as soon as they connect
    #[serde(default)]
    pub blacklist: Vec<IpAddr>,
}

fn default_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
            connections: None,
            default_host: None,
            origins: Vec::new(),
            blacklist: Vec::new(),
        }
    }
}

/// An upstream server clients may be relayed to
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Host {
    /// Key the host is configured under
    #[serde(skip)]
    pub key: String,
    /// Name shown in the menu
    #[serde(default)]
    pub name: Option<String>,
    /// Target host name or address
    pub host: String,
    /// Target port
    pub port: u16,
    /// Users allowed to connect
    #[serde(default)]
    pub users: Option<Vec<String>>,
    /// Groups allowed to connect
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl Host {
    /// Create an unrestricted host
    pub fn new(key: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            key: key.into(),
            name: None,
            host: host.into(),
            port,
            users: None,
            groups: None,
        }
    }

    /// Set the menu name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the host to the given users
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = Some(users.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the host to the given groups
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Name shown in the menu; the key when no name is configured
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// True when the target is `localhost` or `127.0.0.1`
    pub fn is_loopback(&self) -> bool {
        crate::types::is_loopback_name(&self.host)
    }
}

/// A gateway account
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Name the user logs in with
    #[serde(skip)]
    pub name: String,
    /// Hex encoded SHA-1 of the password
    pub password: String,
    /// Group the user belongs to
    #[serde(default)]
    pub group: Option<String>,
}

impl User {
    /// Create a user from an already hashed password
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password_hash.into(),
            group: None,
        }
    }

    /// Create a user, hashing the plain text password
    pub fn from_password(name: impl Into<String>, password: &str) -> Self {
        Self::new(name, hash_password(password))
    }

    /// Put the user in a group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Check a plain text password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        self.password.eq_ignore_ascii_case(&hash_password(password))
    }
}

/// Hex encoded SHA-1 of `password`
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha1::digest(password.as_bytes()))
}

impl GatewayConfig {
    /// Create an empty configuration listening on `port`
    pub fn new(port: u16) -> Self {
        Self {
            general: GeneralConfig {
                port,
                ..GeneralConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: GatewayConfig = toml::from_str(text)?;
        for (key, host) in &mut config.hosts {
            host.key.clone_from(key);
        }
        for (name, user) in &mut config.users {
            user.name.clone_from(name);
        }
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            "Loaded {} hosts and {} users from {}",
            config.hosts.len(),
            config.users.len(),
            path.display()
        );
        Ok(config)
    }

    /// Set the bind address
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.general.ip = ip;
        self
    }

    /// Set the listening port
    pub fn with_port(mut self, port: u16) -> Self {
        self.general.port = port;
        self
    }

    /// Cap simultaneous connections; `None` removes the cap
    pub fn with_max_connections(mut self, max: Option<usize>) -> Self {
        self.general.connections = max;
        self
    }

    /// Set the default host key
    pub fn with_default_host(mut self, key: impl Into<String>) -> Self {
        self.general.default_host = Some(key.into());
        self
    }

    /// Allow WebSocket clients from `origin`
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.general.origins.push(origin.into());
        self
    }

    /// Drop every connection from `ip`
    pub fn with_blacklisted(mut self, ip: IpAddr) -> Self {
        self.general.blacklist.push(ip);
        self
    }

    /// Add or replace a host
    pub fn with_host(mut self, host: Host) -> Self {
        self.hosts.insert(host.key.clone(), host);
        self
    }

    /// Add or replace a user
    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.name.clone(), user);
        self
    }

    /// Address the listener binds to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.general.ip, self.general.port)
    }

    /// Check the configuration for inconsistencies
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.connections == Some(0) {
            return Err(ConfigError::Invalid(
                "general.connections must be at least 1".to_string(),
            ));
        }
        if let Some(key) = &self.general.default_host {
            if !self.hosts.contains_key(key) {
                return Err(ConfigError::Invalid(format!(
                    "default host {key:?} is not configured"
                )));
            }
        }
        for (key, host) in &self.hosts {
            if host.host.is_empty() {
                return Err(ConfigError::Invalid(format!("host {key:?} has no target")));
            }
            if host.port == 0 {
                return Err(ConfigError::Invalid(format!("host {key:?} has no port")));
            }
        }
        for (name, user) in &self.users {
            if user.password.len() != 40 || hex::decode(&user.password).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "user {name:?} password is not a hex SHA-1 digest"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [general]
        ip = "127.0.0.1"
        port = 4000
        connections = 50
        default = "mud"
        origins = ["http://example.com"]
        blacklist = ["10.0.0.5"]

        [hosts.mud]
        name = "My MUD"
        host = "localhost"
        port = 5000

        [hosts.staff]
        host = "staff.example"
        port = 23
        groups = ["staff"]

        [users.alice]
        password = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"
        group = "staff"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = GatewayConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:4000".parse().unwrap());
        assert_eq!(config.general.connections, Some(50));
        assert_eq!(config.general.default_host.as_deref(), Some("mud"));
        assert_eq!(config.general.blacklist, vec!["10.0.0.5".parse::<IpAddr>().unwrap()]);

        let mud = &config.hosts["mud"];
        assert_eq!(mud.key, "mud");
        assert_eq!(mud.display_name(), "My MUD");
        assert!(mud.is_loopback());
        let staff = &config.hosts["staff"];
        assert_eq!(staff.display_name(), "staff");
        assert_eq!(staff.groups.as_deref(), Some(&["staff".to_string()][..]));

        let alice = &config.users["alice"];
        assert_eq!(alice.name, "alice");
        assert!(alice.verify_password("test"));
        assert!(!alice.verify_password("Test"));
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_toml_str("").unwrap();
        assert_eq!(config.general.port, 8080);
        assert!(config.general.ip.is_unspecified());
        assert!(config.hosts.is_empty());
        assert!(config.general.origins.is_empty());
    }

    #[test]
    fn test_unknown_default_host() {
        let err = GatewayConfig::from_toml_str("[general]\ndefault = \"nowhere\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_password_hash() {
        let err =
            GatewayConfig::from_toml_str("[users.bob]\npassword = \"hunter2\"\n").unwrap_err();
        assert!(err.to_string().contains("bob"));
    }

    #[test]
    fn test_parse_error() {
        let err = GatewayConfig::from_toml_str("[general\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_builder() {
        let config = GatewayConfig::new(4000)
            .with_host(Host::new("mud", "localhost", 5000))
            .with_user(User::from_password("alice", "test"))
            .with_max_connections(Some(10))
            .with_origin("http://example.com");
        assert!(config.validate().is_ok());
        assert_eq!(config.users["alice"].password, hash_password("test"));
        assert_eq!(
            hash_password("test"),
            "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"
        );
    }

    #[test]
    fn test_example_file() {
        let config = GatewayConfig::from_toml_str(include_str!("../../lantern.example.toml"))
            .unwrap();
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.hosts.len(), 3);
        assert!(config.users["alice"].verify_password("wonderland"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GatewayConfig::load("/nonexistent/lantern.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
