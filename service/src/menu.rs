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

//! Destination menu

use crate::access;
use crate::ansi::{self, RESET, fg};
use crate::config::{GatewayConfig, User};
use crate::handler::{Handler, Login};
use crate::session::{SessionContext, Transition};
use crate::types::Destination;
use std::fmt::Write;
use tracing::info;

/// Width the host listing is laid out for
const LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Login,
    Quit,
    Connect,
}

const COMMANDS: [(&str, Command); 3] = [
    ("login", Command::Login),
    ("quit", Command::Quit),
    ("connect", Command::Connect),
];

impl Command {
    /// Match `word` as a case-insensitive prefix of exactly one command
    fn parse(word: &str) -> Option<Command> {
        if word.is_empty() {
            return None;
        }
        let word = word.to_ascii_lowercase();
        let mut matches = COMMANDS.iter().filter(|(name, _)| name.starts_with(&word));
        match (matches.next(), matches.next()) {
            (Some((_, command)), None) => Some(*command),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    destination: Destination,
}

/// Rendered host listing for one identity
#[derive(Debug, Clone)]
struct Listing {
    identity: Option<String>,
    entries: Vec<Entry>,
    rendered: String,
}

impl Listing {
    fn build(config: &GatewayConfig, user: Option<&User>) -> Self {
        let entries: Vec<Entry> = access::authorized_hosts(config, user)
            .map(|host| Entry {
                name: host.display_name().to_string(),
                destination: Destination::new(host.host.as_str(), host.port),
            })
            .collect();

        let longest = entries
            .iter()
            .map(|entry| entry.name.chars().count())
            .max()
            .unwrap_or(0);
        let digits = entries.len().to_string().len();
        // "NN. name    "
        let columns = (LINE_WIDTH / (digits + 2 + longest + 4)).max(1);

        let mut rendered = String::new();
        for (index, entry) in entries.iter().enumerate() {
            let _ = write!(
                rendered,
                "{}{:0digits$}{}.{RESET} {:<longest$}    ",
                fg(126),
                index + 1,
                fg(8),
                entry.name
            );
            if (index + 1) % columns == 0 {
                rendered.push_str("\r\n");
            }
        }
        if !rendered.ends_with("\r\n") {
            rendered.push_str("\r\n");
        }

        Self {
            identity: user.map(|user| user.name.clone()),
            entries,
            rendered,
        }
    }
}

/// Numbered list of reachable hosts plus the `login`, `quit` and `connect` commands
#[derive(Debug, Clone, Default)]
pub struct Menu {
    banner_shown: bool,
    listing: Option<Listing>,
}

impl Menu {
    /// Create a menu that has not been shown yet
    pub fn new() -> Self {
        Self::default()
    }

    fn listing(&mut self, context: &SessionContext) -> &Listing {
        let identity = context.user().map(|user| user.name.as_str());
        let stale = self
            .listing
            .as_ref()
            .is_none_or(|listing| listing.identity.as_deref() != identity);
        if stale {
            self.listing = None;
        }
        self.listing
            .get_or_insert_with(|| Listing::build(context.config(), context.user()))
    }

    pub(crate) fn display(&mut self, context: &mut SessionContext) {
        if !self.banner_shown {
            let banner = context.banner();
            context.send_raw(&banner);
            let rendered = self.listing(context).rendered.clone();
            context.send(&rendered);
            self.banner_shown = true;
        }
        let choices = if context.user().is_some() {
            "C host port to connect to a custom host, "
        } else {
            "L to log in, "
        };
        context.send_raw(&format!(
            "{}Select a destination, {choices}or Q to quit{}:{RESET} ",
            fg(1),
            fg(8)
        ));
    }

    pub(crate) fn process(&mut self, input: &str, context: &mut SessionContext) -> Transition {
        let input = input.trim();
        if input.is_empty() {
            return Transition::Stay;
        }
        let mut tokens = input.split_whitespace();
        let first = tokens.next().unwrap_or_default();

        match Command::parse(first) {
            Some(Command::Login) => {
                let inputs = tokens.map(str::to_string).collect();
                Transition::ReplaceAndFeed(Handler::Login(Login::new()), inputs)
            }
            Some(Command::Quit) => Transition::Pop,
            Some(Command::Connect) => {
                if context.user().is_none() {
                    context.send(&ansi::error("You must log in to do so."));
                    return Transition::Stay;
                }
                let host = tokens.next();
                let port = tokens.next().and_then(|port| port.parse::<u16>().ok());
                match (host, port, tokens.next()) {
                    (Some(host), Some(port), None) if port != 0 => {
                        let destination = Destination::new(host, port);
                        info!("Custom destination {} chosen", destination);
                        choose(destination, context)
                    }
                    _ => {
                        context.send(&ansi::error("Usage: connect <host> <port>"));
                        Transition::Stay
                    }
                }
            }
            None => {
                let choice = input.parse::<usize>().ok();
                let entries = &self.listing(context).entries;
                let entry = choice
                    .and_then(|choice| choice.checked_sub(1))
                    .and_then(|index| entries.get(index))
                    .cloned();
                match entry {
                    Some(entry) => {
                        info!("Destination {} ({}) chosen", entry.name, entry.destination);
                        choose(entry.destination, context)
                    }
                    None => {
                        context.send(&ansi::error("Invalid choice."));
                        Transition::Stay
                    }
                }
            }
        }
    }
}

fn choose(destination: Destination, context: &mut SessionContext) -> Transition {
    context.arrange(destination);
    context.send_raw("\r\n");
    Transition::Pop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Host;
    use crate::metrics::ConnectionCounter;
    use std::sync::Arc;

    fn config() -> GatewayConfig {
        GatewayConfig::new(4000)
            .with_host(Host::new("alpha", "localhost", 5000).with_name("Alpha"))
            .with_host(Host::new("beta", "mud.example", 23).with_name("The Beta World"))
            .with_host(Host::new("gamma", "localhost", 6000).with_users(["alice"]))
            .with_user(User::from_password("alice", "wonderland"))
    }

    fn context(user: Option<&str>) -> SessionContext {
        let config = config();
        let user = user.and_then(|name| config.users.get(name).cloned());
        SessionContext::new(Arc::new(config), ConnectionCounter::new(), user)
    }

    fn text(context: &mut SessionContext) -> String {
        String::from_utf8_lossy(&context.take_output()).into_owned()
    }

    #[test]
    fn test_command_prefixes() {
        assert_eq!(Command::parse("l"), Some(Command::Login));
        assert_eq!(Command::parse("LOG"), Some(Command::Login));
        assert_eq!(Command::parse("Quit"), Some(Command::Quit));
        assert_eq!(Command::parse("con"), Some(Command::Connect));
        assert_eq!(Command::parse("logout"), None);
        assert_eq!(Command::parse("1"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_listing_layout() {
        let config = config();
        let listing = Listing::build(&config, None);
        assert_eq!(listing.entries.len(), 2);
        let expected = format!(
            "{c}1{d}.{RESET} Alpha             {c}2{d}.{RESET} The Beta World    \r\n",
            c = fg(126),
            d = fg(8)
        );
        assert_eq!(listing.rendered, expected);

        let alice = config.users.get("alice");
        assert_eq!(Listing::build(&config, alice).entries.len(), 3);
    }

    #[test]
    fn test_listing_wraps_at_eighty_columns() {
        let mut config = GatewayConfig::new(4000);
        for index in 0..12 {
            let key = format!("region-{index:02}");
            config = config.with_host(Host::new(key.as_str(), "localhost", 5000 + index));
        }
        let listing = Listing::build(&config, None);
        // Each entry is "NN. region-NN    ", 17 columns wide, four to a line.
        let lines: Vec<&str> = listing.rendered.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("01") && lines[0].contains("04"));
        assert!(!lines[0].contains("05"));
    }

    #[test]
    fn test_first_display_lists_hosts_once() {
        let mut context = context(None);
        let mut menu = Menu::new();
        menu.display(&mut context);
        let first = text(&mut context);
        assert!(first.contains("There is") || first.contains("There are"));
        assert!(first.contains("The Beta World"));
        assert!(first.ends_with("L to log in, or Q to quit\x1B[38;5;8m:\x1B[0m "));

        menu.display(&mut context);
        let second = text(&mut context);
        assert!(!second.contains("Alpha"));
        assert!(second.starts_with("\x1B[38;5;1mSelect a destination"));
    }

    #[test]
    fn test_selection_bounds() {
        let mut context = context(None);
        let mut menu = Menu::new();
        for bad in ["0", "3", "-1", "two", "1.5"] {
            assert!(matches!(menu.process(bad, &mut context), Transition::Stay), "{bad}");
            assert!(text(&mut context).contains("Invalid choice."));
        }
        assert!(matches!(menu.process(" 2 ", &mut context), Transition::Pop));
        assert_eq!(context.destination(), Some(&Destination::new("mud.example", 23)));
        assert_eq!(text(&mut context), "\r\n");
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut context = context(None);
        let mut menu = Menu::new();
        assert!(matches!(menu.process("   ", &mut context), Transition::Stay));
        assert!(context.take_output().is_empty());
    }

    #[test]
    fn test_connect_requires_login() {
        let mut anonymous = context(None);
        let mut menu = Menu::new();
        assert!(matches!(
            menu.process("connect mud.example 4000", &mut anonymous),
            Transition::Stay
        ));
        assert!(text(&mut anonymous).contains("You must log in to do so."));
        assert!(anonymous.destination().is_none());

        let mut alice = context(Some("alice"));
        assert!(matches!(menu.process("c mud.example 4000", &mut alice), Transition::Pop));
        assert_eq!(alice.destination(), Some(&Destination::new("mud.example", 4000)));
    }

    #[test]
    fn test_connect_usage() {
        let mut alice = context(Some("alice"));
        let mut menu = Menu::new();
        let usages = [
            "connect",
            "connect host",
            "connect host port",
            "connect host 0",
            "connect a 1 b",
        ];
        for bad in usages {
            assert!(matches!(menu.process(bad, &mut alice), Transition::Stay), "{bad}");
            assert!(text(&mut alice).contains("Usage: connect <host> <port>"));
        }
    }

    #[test]
    fn test_login_and_quit() {
        let mut context = context(None);
        let mut menu = Menu::new();
        match menu.process("LOGIN alice wonderland", &mut context) {
            Transition::ReplaceAndFeed(Handler::Login(_), inputs) => {
                assert_eq!(inputs, vec!["alice".to_string(), "wonderland".to_string()]);
            }
            other => panic!("unexpected transition {other:?}"),
        }
        assert!(matches!(menu.process("q", &mut context), Transition::Pop));
        assert!(context.destination().is_none());
    }

    #[test]
    fn test_listing_follows_identity() {
        let mut context = context(None);
        let mut menu = Menu::new();
        assert_eq!(menu.listing(&context).entries.len(), 2);
        let cached = menu.listing(&context) as *const Listing;
        assert!(std::ptr::eq(cached, menu.listing(&context)));
        let alice = context.config().users.get("alice").cloned();
        context.authenticate(alice.unwrap());
        assert_eq!(menu.listing(&context).entries.len(), 3);
        assert!(matches!(menu.process("3", &mut context), Transition::Pop));
        assert_eq!(context.destination(), Some(&Destination::new("localhost", 6000)));
    }
}
