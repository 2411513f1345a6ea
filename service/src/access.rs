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

//! Authentication and access control
//!
//! Hosts without `users` or `groups` lists are open to everyone, anonymous
//! clients included. A restricted host admits a user named in `users` or a
//! user whose group is named in `groups`.

use crate::config::{GatewayConfig, Host, User};
use std::net::IpAddr;

/// Outcome of resolving a WebSocket path to a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLookup<'a> {
    /// The path names a host the user may reach
    Found(&'a Host),
    /// The path names a host the user may not reach
    NotAuthorized,
    /// The path names nothing
    NotFound,
}

/// Look up `username` and check `password` against its stored hash
pub fn check_user<'a>(
    config: &'a GatewayConfig,
    username: &str,
    password: &str,
) -> Option<&'a User> {
    config
        .users
        .get(username)
        .filter(|user| user.verify_password(password))
}

/// Check whether `user` (or an anonymous client) may connect to `host`
pub fn is_auth_host(host: &Host, user: Option<&User>) -> bool {
    if host.users.is_none() && host.groups.is_none() {
        return true;
    }
    let Some(user) = user else {
        return false;
    };
    let named = host
        .users
        .as_ref()
        .is_some_and(|users| users.iter().any(|name| *name == user.name));
    let grouped = match (&host.groups, &user.group) {
        (Some(groups), Some(group)) => groups.iter().any(|name| name == group),
        _ => false,
    };
    named || grouped
}

/// Hosts `user` may connect to, in key order
pub fn authorized_hosts<'a>(
    config: &'a GatewayConfig,
    user: Option<&'a User>,
) -> impl Iterator<Item = &'a Host> + 'a {
    config
        .hosts
        .values()
        .filter(move |host| is_auth_host(host, user))
}

/// True when `user` may reach at least one host
pub fn can_reach_any(config: &GatewayConfig, user: Option<&User>) -> bool {
    authorized_hosts(config, user).next().is_some()
}

/// Check a WebSocket `Origin` against the allow-list
///
/// An empty allow-list admits every origin.
pub fn check_origin(config: &GatewayConfig, origin: &str) -> bool {
    let origins = &config.general.origins;
    origins.is_empty() || origins.iter().any(|allowed| allowed == origin)
}

/// Check a peer address against the blacklist
pub fn is_blacklisted(config: &GatewayConfig, ip: IpAddr) -> bool {
    config.general.blacklist.contains(&ip)
}

/// Resolve a WebSocket path to a host
///
/// The default host is the starting candidate. A host configured under
/// exactly `key` replaces it; otherwise `port_<N>` picks the first loopback
/// host listening on port `N`.
pub fn find_host<'a>(
    config: &'a GatewayConfig,
    key: &str,
    user: Option<&User>,
) -> HostLookup<'a> {
    let mut found = config
        .general
        .default_host
        .as_ref()
        .and_then(|default| config.hosts.get(default));

    if let Some(host) = config.hosts.get(key) {
        found = Some(host);
    } else if let Some(port) = key
        .strip_prefix("port_")
        .and_then(|port| port.parse::<u16>().ok())
    {
        if let Some(host) = config
            .hosts
            .values()
            .find(|host| host.port == port && host.is_loopback())
        {
            found = Some(host);
        }
    }

    match found {
        Some(host) if is_auth_host(host, user) => HostLookup::Found(host),
        Some(_) => HostLookup::NotAuthorized,
        None => HostLookup::NotFound,
    }
}

/// Ports announced in the Flash cross-domain policy
///
/// The listening port and the ports of every loopback host, deduplicated and
/// in ascending order.
pub fn policy_ports(config: &GatewayConfig) -> Vec<u16> {
    let mut ports: Vec<u16> = std::iter::once(config.general.port)
        .chain(
            config
                .hosts
                .values()
                .filter(|host| host.is_loopback())
                .map(|host| host.port),
        )
        .collect();
    ports.sort_unstable();
    ports.dedup();
    ports
}
