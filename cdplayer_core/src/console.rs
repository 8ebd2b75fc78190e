// SPDX-License-Identifier: GPL-3.0
// console.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// This module contains the `cdplayer` console command.
pub mod cd_command;

/// This trait provides an implementation-opaque way of printing command output to
/// whatever console the engine has.
pub trait ConsoleOutput {

    /// Implementations must display one line of text.
    fn print(&mut self, line: &str);
}

/// Collecting output into a vector of lines, mostly useful for tests and for
/// callers that want to post-process what a command said.
impl ConsoleOutput for Vec<String> {

    fn print(&mut self, line: &str) {
        self.push(line.to_string());
    }
}
