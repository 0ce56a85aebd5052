//! Routes a resolved credential to exactly one output sink.

use clap::ValueEnum;
use passgate_core::entry::CredentialRecord;
use passgate_core::error::Error;

use crate::{reveal, sinks};

/// Where the credential goes. Exactly one per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    Clipboard,
    Type,
    Print,
    #[default]
    Gui,
}

/// Layout for the `print` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PrintFormat {
    /// The full record as one JSON object.
    Json,
    /// `login:password`.
    #[default]
    Plain,
    /// The bare secret.
    Password,
}

/// Render the credential for the `print` sink.
pub fn render_print(record: &CredentialRecord, format: PrintFormat) -> String {
    match format {
        PrintFormat::Json => record.to_json().to_string(),
        PrintFormat::Password => record.password().to_string(),
        PrintFormat::Plain => format!("{}:{}", record.login(), record.password()),
    }
}

pub fn dispatch(
    record: &CredentialRecord,
    mode: OutputMode,
    format: PrintFormat,
) -> Result<(), Error> {
    match mode {
        OutputMode::Clipboard => sinks::clipboard_set(record.password()),
        OutputMode::Type => sinks::type_keystrokes(record.password()),
        OutputMode::Print => {
            println!("{}", render_print(record, format));
            Ok(())
        }
        OutputMode::Gui => reveal::show(record),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CredentialRecord {
        CredentialRecord::from_pairs([("login", "alice"), ("password", "s3cr3t")])
    }

    #[test]
    fn plain_is_login_colon_password() {
        assert_eq!(render_print(&record(), PrintFormat::Plain), "alice:s3cr3t");
    }

    #[test]
    fn password_is_the_bare_secret() {
        assert_eq!(render_print(&record(), PrintFormat::Password), "s3cr3t");
    }

    #[test]
    fn json_is_parseable_and_complete() {
        let out = render_print(&record(), PrintFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["login"], "alice");
        assert_eq!(parsed["password"], "s3cr3t");
    }

    #[test]
    fn default_mode_is_gui_and_default_format_is_plain() {
        assert_eq!(OutputMode::default(), OutputMode::Gui);
        assert_eq!(PrintFormat::default(), PrintFormat::Plain);
    }
}
