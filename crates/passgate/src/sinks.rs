//! External output sinks: clipboard, keystroke injection, fuzzy picker,
//! desktop notifications, plumbing, and the save-to-file sink.
//!
//! These are thin blocking subprocess calls on the caller's thread; each
//! runs to completion or the whole invocation aborts.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use passgate_core::error::Error;
use tracing::debug;

/// Fixed inter-keystroke delay for the typing sink, in milliseconds. Slow
/// enough for rate-sensitive input fields.
pub const TYPE_KEY_DELAY_MS: u32 = 100;

const NOTIFY_TIMEOUT_MS: u32 = 5000;

/// Spawn a command with `input` piped to stdin and wait for it.
fn pipe_to(command: &mut Command, input: &str) -> std::io::Result<Output> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(input.as_bytes())?;
    }
    child.wait_with_output()
}

fn check_status(tool: &str, output: &Output) -> Result<(), Error> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::Io(std::io::Error::other(format!(
        "{tool} failed: {}",
        stderr.trim()
    ))))
}

fn spawn_error(tool: &str, e: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("failed to run {tool}: {e} (is it installed?)"),
    ))
}

/// Put a value on both X selections, so it pastes via middle-click and via
/// ctrl-v alike.
pub fn clipboard_set(value: &str) -> Result<(), Error> {
    for selection in ["primary", "clipboard"] {
        let output = pipe_to(
            Command::new("xclip").args(["-in", "-selection", selection]),
            value,
        )
        .map_err(|e| spawn_error("xclip", e))?;
        check_status("xclip", &output)?;
    }
    debug!("value copied to primary and clipboard selections");
    Ok(())
}

/// Type a value into the focused window, one keystroke per
/// [`TYPE_KEY_DELAY_MS`].
pub fn type_keystrokes(value: &str) -> Result<(), Error> {
    let output = Command::new("xdotool")
        .args(["type", "--delay", &TYPE_KEY_DELAY_MS.to_string()])
        .arg(value)
        .output()
        .map_err(|e| spawn_error("xdotool", e))?;
    check_status("xdotool", &output)
}

/// Raise a desktop notification.
pub fn notify(summary: &str, body: &str) -> Result<(), Error> {
    let output = Command::new("notify-send")
        .args(["--app-name", "passgate"])
        .args(["--expire-time", &NOTIFY_TIMEOUT_MS.to_string()])
        .arg(format!("[passgate] {summary}"))
        .arg(body)
        .output()
        .map_err(|e| spawn_error("notify-send", e))?;
    check_status("notify-send", &output)
}

/// Hand a value to the session plumber for URL/content dispatch.
pub fn plumb_string(value: &str) -> Result<(), Error> {
    let output = Command::new("gdbus")
        .args([
            "call",
            "--session",
            "--dest",
            "org.irq0.cathica",
            "--object-path",
            "/org/irq0/cathica/Plumb",
            "--method",
            "org.irq0.cathica.Plumb.string",
        ])
        .arg(value)
        .output()
        .map_err(|e| spawn_error("gdbus", e))?;
    check_status("gdbus", &output)
}

/// Let the user pick an entry title interactively: titles go to the picker
/// on stdin, the selection comes back on stdout, surrounding whitespace
/// trimmed. An aborted picker yields an empty selection, which then fails
/// resolution like any other unknown term.
pub fn pick_entry(titles: &[String]) -> Result<String, Error> {
    let input = titles.join("\n");
    let output = pipe_to(
        Command::new("rofi").args(["-dmenu", "-i", "-sort", "-p", "Service: "]),
        &input,
    )
    .map_err(|e| spawn_error("rofi", e))?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Directory the save-to-file sink writes into.
pub fn save_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_else(|| ".".into());
    PathBuf::from(home).join("tmp")
}

/// Write a secret to `<dir>/<filename>`, plaintext, user-only.
pub fn write_secret_file(dir: &Path, filename: &str, value: &str) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, value)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(path)
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Current time as an ISO-8601 string at second precision, for saved-secret
/// filenames.
pub fn iso8601_now() -> String {
    iso8601_seconds(SystemTime::now())
}

fn iso8601_seconds(t: SystemTime) -> String {
    let total_secs = t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let days = total_secs / 86400;
    let rem = total_secs % 86400;
    let hours = rem / 3600;
    let minutes = (rem % 3600) / 60;
    let seconds = rem % 60;
    let (year, month, day) = days_to_ymd(days);
    format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}")
}

/// Convert days since Unix epoch to (year, month, day).
fn days_to_ymd(days: u64) -> (u64, u64, u64) {
    // Algorithm from http://howardhinnant.github.io/date_algorithms.html
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
