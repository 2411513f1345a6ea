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

//! ANSI 256-colour escapes used in gateway output

/// Clear the screen and home the cursor
pub const CLEAR: &str = "\x1B[H\x1B[J";
/// Reset all attributes
pub const RESET: &str = "\x1B[0m";

/// Set the foreground to palette entry `code`
pub fn fg(code: u8) -> String {
    format!("\x1B[38;5;{code}m")
}

/// A prompt label followed by a dim colon
pub fn prompt(label: &str) -> String {
    format!("{}{label}{}:{RESET} ", fg(1), fg(8))
}

/// A red error line
pub fn error(message: &str) -> String {
    format!("{}{message}{RESET}", fg(9))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt() {
        assert_eq!(prompt("Username"), "\x1B[38;5;1mUsername\x1B[38;5;8m:\x1B[0m ");
        assert_eq!(error("Nope."), "\x1B[38;5;9mNope.\x1B[0m");
    }
}
