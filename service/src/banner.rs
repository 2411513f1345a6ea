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

//! Welcome banner shown before the login and menu prompts

use crate::ansi::{CLEAR, RESET, fg};

/// Render the banner for a gateway with `connections` live connections
pub fn render(connections: usize) -> String {
    let mut out = format!(
        "{CLEAR}{}Lantern {}({}v{}{}){RESET} WebSocket and Telnet gateway\r\n\r\n",
        fg(9),
        fg(8),
        fg(7),
        env!("CARGO_PKG_VERSION"),
        fg(8),
    );
    out.push_str(&fg(88));
    out.push_str("    Old worlds through new windows: pick a door and step inside.");
    out.push_str(RESET);
    out.push_str("\r\n\r\n");
    if connections == 1 {
        out.push_str(&format!("  There is currently {}1{RESET} user connected.", fg(9)));
    } else {
        out.push_str(&format!(
            "  There are currently {}{connections}{RESET} users connected.",
            fg(9)
        ));
    }
    out.push_str("\r\n\r\n");
    out
}
