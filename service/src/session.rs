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

//! Interactive session driving the handler stack
//!
//! A session exists while a client is logging in or choosing a destination.
//! Decoded client input is fed in; output accumulates until the connection
//! takes it. The session finishes when its handler stack empties, either
//! because a destination was chosen or because the user quit.

use crate::access;
use crate::banner;
use crate::config::{GatewayConfig, User};
use crate::handler::{Handler, Login, Menu};
use crate::metrics::ConnectionCounter;
use crate::types::Destination;
use bytes::{Bytes, BytesMut};
use lantern_telnetcodec::{LineBuffer, TelnetFrame};
use std::sync::Arc;
use tracing::trace;

/// What the session should do after a handler processed input
#[derive(Debug)]
pub enum Transition {
    /// Keep the current handler
    Stay,
    /// Swap the current handler for another
    Replace(Handler),
    /// Swap the current handler and hand it the given inputs, one at a time
    ReplaceAndFeed(Handler, Vec<String>),
    /// Remove the current handler
    Pop,
}

/// State shared by the handlers of one session
#[derive(Debug)]
pub struct SessionContext {
    config: Arc<GatewayConfig>,
    counter: ConnectionCounter,
    user: Option<User>,
    destination: Option<Destination>,
    output: BytesMut,
}

impl SessionContext {
    /// Create a context for a client that may already be authenticated
    pub fn new(config: Arc<GatewayConfig>, counter: ConnectionCounter, user: Option<User>) -> Self {
        Self {
            config,
            counter,
            user,
            destination: None,
            output: BytesMut::new(),
        }
    }

    /// Gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Authenticated user, if any
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Record a successful login
    pub fn authenticate(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Choose where the connection goes once the session ends
    pub fn arrange(&mut self, destination: Destination) {
        self.destination = Some(destination);
    }

    /// Destination chosen so far
    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// Banner reflecting the current connection count
    pub fn banner(&self) -> String {
        banner::render(self.counter.current())
    }

    /// Queue a line of text
    pub fn send(&mut self, text: &str) {
        self.output.extend_from_slice(text.as_bytes());
        self.output.extend_from_slice(b"\r\n");
    }

    /// Queue text without a line ending
    pub fn send_raw(&mut self, text: &str) {
        self.output.extend_from_slice(text.as_bytes());
    }

    /// Queue a Telnet command
    pub fn send_frame(&mut self, frame: &TelnetFrame) {
        frame.write_to(&mut self.output);
    }

    pub(crate) fn take_output(&mut self) -> Bytes {
        self.output.split().freeze()
    }
}

/// What remains of a finished session
#[derive(Debug)]
pub struct SessionOutcome {
    /// Where to relay the client, if anywhere
    pub destination: Option<Destination>,
    /// Authenticated user, if any
    pub user: Option<User>,
    /// Input received after the line that ended the session
    pub leftover: Bytes,
}

/// A stack of input handlers with line assembly
#[derive(Debug)]
pub struct Session {
    handlers: Vec<Handler>,
    lines: LineBuffer,
    context: SessionContext,
}

impl Session {
    /// Start a session and render its first prompt
    ///
    /// The session opens on the menu when the client can reach at least one
    /// host as it stands, and on the login prompt otherwise.
    pub fn new(context: SessionContext) -> Self {
        let first = if access::can_reach_any(context.config(), context.user()) {
            Handler::Menu(Menu::new())
        } else {
            Handler::Login(Login::new())
        };
        let mut session = Self {
            handlers: vec![first],
            lines: LineBuffer::new(),
            context,
        };
        session.display();
        session
    }

    /// Feed decoded client input
    ///
    /// Line mode handlers receive one line at a time. Input left over once
    /// the session finishes is kept for [`Session::finish`].
    pub fn feed(&mut self, data: &[u8]) {
        if self.is_finished() {
            self.lines.extend(data);
            return;
        }
        let linemode = self.handlers.last().is_some_and(Handler::linemode);
        if !linemode {
            self.process(&String::from_utf8_lossy(data));
            return;
        }
        self.lines.extend(data);
        while !self.is_finished() {
            let Some(line) = self.lines.next_line() else {
                break;
            };
            self.process(&line);
        }
    }

    /// True once the handler stack is empty
    pub fn is_finished(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Output queued since the last call
    pub fn take_output(&mut self) -> Bytes {
        self.context.take_output()
    }

    /// Authenticated user, if any
    pub fn user(&self) -> Option<&User> {
        self.context.user()
    }

    /// Destination chosen so far
    pub fn destination(&self) -> Option<&Destination> {
        self.context.destination()
    }

    /// Tear the session down
    pub fn finish(mut self) -> SessionOutcome {
        SessionOutcome {
            leftover: self.lines.take(),
            destination: self.context.destination.take(),
            user: self.context.user.take(),
        }
    }

    fn process(&mut self, input: &str) {
        let Some(handler) = self.handlers.last_mut() else {
            return;
        };
        let transition = handler.process(input, &mut self.context);
        self.apply(transition);
        self.display();
    }

    fn apply(&mut self, transition: Transition) {
        trace!("Applying {:?}", transition);
        match transition {
            Transition::Stay => {}
            Transition::Replace(handler) => {
                self.handlers.pop();
                self.handlers.push(handler);
            }
            Transition::ReplaceAndFeed(handler, inputs) => {
                self.handlers.pop();
                self.handlers.push(handler);
                for input in inputs {
                    let Some(handler) = self.handlers.last_mut() else {
                        break;
                    };
                    let transition = handler.process(&input, &mut self.context);
                    self.apply(transition);
                }
            }
            Transition::Pop => {
                self.handlers.pop();
            }
        }
    }

    fn display(&mut self) {
        if let Some(handler) = self.handlers.last_mut() {
            handler.display(&mut self.context);
        }
    }
}
