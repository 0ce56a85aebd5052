//! Terminal output helpers. Degrades gracefully when stderr is not a TTY.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};

pub static CROSS: Emoji<'_, '_> = Emoji("✖ ", "!! ");

/// Print a red error message to stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", style(CROSS).red(), style(msg).red().bold());
}

/// Create and start a spinner with the given message. Hidden automatically
/// when stderr is piped.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
