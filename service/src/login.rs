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

//! Login prompt

use crate::access;
use crate::ansi;
use crate::handler::{Handler, Menu};
use crate::session::{SessionContext, Transition};
use lantern_telnetcodec::{TelnetFrame, TelnetOption};
use tracing::{info, warn};

const USERNAME_PUNCTUATION: &str = "-_!@#$%^&*(),.<>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LoginState {
    #[default]
    AwaitUsername,
    AwaitPassword,
}

/// Asks for a username, then a password with local echo turned off
#[derive(Debug, Clone, Default)]
pub struct Login {
    state: LoginState,
    username: String,
    banner_shown: bool,
}

impl Login {
    /// Create a login prompt waiting for a username
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn display(&mut self, context: &mut SessionContext) {
        if !self.banner_shown {
            let banner = context.banner();
            context.send_raw(&banner);
            self.banner_shown = true;
        }
        match self.state {
            LoginState::AwaitUsername => context.send_raw(&ansi::prompt("Username")),
            LoginState::AwaitPassword => {
                context.send_raw(&ansi::prompt("Password"));
                context.send_frame(&TelnetFrame::Will(TelnetOption::Echo));
            }
        }
    }

    pub(crate) fn process(&mut self, input: &str, context: &mut SessionContext) -> Transition {
        match self.state {
            LoginState::AwaitUsername => {
                if is_valid_username(input) {
                    self.username = input.to_string();
                    self.state = LoginState::AwaitPassword;
                } else if input.is_empty()
                    && access::can_reach_any(context.config(), context.user())
                {
                    return Transition::Replace(Handler::Menu(Menu::new()));
                } else {
                    context.send(&ansi::error("Invalid username."));
                }
                Transition::Stay
            }
            LoginState::AwaitPassword => {
                context.send_frame(&TelnetFrame::Wont(TelnetOption::Echo));
                if input.is_empty() {
                    self.reset();
                    return Transition::Stay;
                }
                let user = access::check_user(context.config(), &self.username, input).cloned();
                match user {
                    Some(user) => {
                        info!("User {} logged in", user.name);
                        context.send("");
                        context.authenticate(user);
                        Transition::Replace(Handler::Menu(Menu::new()))
                    }
                    None => {
                        warn!("Failed login for {:?}", self.username);
                        context.send(&ansi::error("Invalid username or password."));
                        self.reset();
                        Transition::Stay
                    }
                }
            }
        }
    }

    fn reset(&mut self) {
        self.username.clear();
        self.state = LoginState::AwaitUsername;
    }
}

fn is_valid_username(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || USERNAME_PUNCTUATION.contains(c))
}
