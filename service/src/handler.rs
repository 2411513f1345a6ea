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

//! Input handlers for interactive sessions
//!
//! Handlers form a stack inside a [`Session`](crate::Session); only the top
//! one sees input. Each handler renders its own prompt in `display` and turns
//! one unit of input into a [`Transition`] in `process`.

use crate::session::{SessionContext, Transition};

pub use crate::login::Login;
pub use crate::menu::Menu;

/// One of the interactive input handlers
#[derive(Debug, Clone)]
pub enum Handler {
    /// Username and password prompts
    Login(Login),
    /// Destination menu
    Menu(Menu),
}

impl Handler {
    /// Whether input reaches this handler one line at a time
    ///
    /// A handler that is not in line mode receives each decoded chunk whole.
    pub fn linemode(&self) -> bool {
        match self {
            Handler::Login(_) | Handler::Menu(_) => true,
        }
    }

    /// Render the prompt, with the banner the first time
    pub fn display(&mut self, context: &mut SessionContext) {
        match self {
            Handler::Login(login) => login.display(context),
            Handler::Menu(menu) => menu.display(context),
        }
    }

    /// Handle one unit of input
    pub fn process(&mut self, input: &str, context: &mut SessionContext) -> Transition {
        match self {
            Handler::Login(login) => login.process(input, context),
            Handler::Menu(menu) => menu.process(input, context),
        }
    }
}

impl From<Login> for Handler {
    fn from(login: Login) -> Self {
        Handler::Login(login)
    }
}

impl From<Menu> for Handler {
    fn from(menu: Menu) -> Self {
        Handler::Menu(menu)
    }
}
