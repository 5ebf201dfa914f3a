//! Terminal bell as the audible start cue

use std::io::Write;

use stagger_core::AlertCapability;

/// Rings the terminal bell. Ready only when stdout is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    ready: bool,
}

impl TerminalBell {
    pub fn detect() -> Self {
        use std::io::IsTerminal;
        Self {
            ready: std::io::stdout().is_terminal(),
        }
    }
}

impl AlertCapability for TerminalBell {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn attempt_play(&self) -> bool {
        let mut stdout = std::io::stdout();
        stdout.write_all(b"\x07").is_ok() && stdout.flush().is_ok()
    }
}
