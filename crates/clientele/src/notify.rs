//! Terminal notifier: success messages on stderr, optionally colored.
//!
//! Error notifications are only logged here. The failing command returns
//! a `CliError` whose diagnostic carries the same code and message.

use std::io::Write;

use owo_colors::OwoColorize;

use clientele_core::{Level, Notification, Notifier};

#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
    quiet: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }

    fn line(&self, n: &Notification) -> String {
        if self.color {
            format!("{} {} {}", "✓".green(), n.title.bold(), n.description)
        } else {
            format!("✓ {} {}", n.title, n.description)
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            Level::Success if !self.quiet => {
                let _ = writeln!(std::io::stderr().lock(), "{}", self.line(&n));
            }
            _ => tracing::debug!(level = %n.level, title = %n.title, "{}", n.description),
        }
    }
}
