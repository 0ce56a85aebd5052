//! Simple password manager interface: resolves one vault entry and routes
//! its credential to the clipboard, keystroke injection, stdout, or the
//! interactive reveal panel.

use std::path::PathBuf;

use clap::Parser;
use passgate_core::associate::AssociationStore;
use passgate_core::entry::CredentialRecord;
use passgate_core::error::Error;
use passgate_core::resolver;
use passgate_core::socket::socket_path;

mod dispatch;
mod proxy;
mod reveal;
mod session;
mod sinks;
mod ui;

use dispatch::{OutputMode, PrintFormat};
use proxy::ProxyConnection;
use session::VaultSession;

#[derive(Debug, Parser)]
#[command(name = "passgate", version, about = "Simple password manager interface")]
struct Cli {
    /// Entry title or URL; picked interactively when omitted.
    key: Option<String>,

    /// Copy the password to the clipboard (primary and clipboard selections).
    #[arg(long, group = "mode")]
    clipboard: bool,

    /// Type the password into the focused window.
    #[arg(long = "type", group = "mode")]
    type_keys: bool,

    /// Print the credential to stdout.
    #[arg(long, group = "mode")]
    print: bool,

    /// Open the interactive reveal panel (default).
    #[arg(long, group = "mode")]
    gui: bool,

    /// Output format for --print.
    #[arg(long, value_enum, default_value = "plain")]
    format: PrintFormat,

    /// Override the vault proxy socket path (otherwise PASSGATE_SOCK /
    /// XDG_RUNTIME_DIR).
    #[arg(long)]
    socket: Option<PathBuf>,
}

impl Cli {
    fn mode(&self) -> OutputMode {
        if self.clipboard {
            OutputMode::Clipboard
        } else if self.type_keys {
            OutputMode::Type
        } else if self.print {
            OutputMode::Print
        } else {
            OutputMode::Gui
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        ui::error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let sock = cli.socket.clone().unwrap_or_else(socket_path);

    let pb = ui::spinner("connecting to vault proxy");
    let connection = match ProxyConnection::connect(&sock).await {
        Ok(connection) => {
            pb.finish_and_clear();
            connection
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    // Pairing may pop up an interactive vault dialog, so no spinner past
    // this point until the directory fetch.
    let mut session = VaultSession::new(connection);
    session.establish(&AssociationStore::new()).await?;
    session.verify().await?;

    let entries = session.list_entries().await?;

    let key = match cli.key.clone() {
        Some(key) => key,
        None => {
            let titles: Vec<String> = entries.iter().map(|e| e.title.clone()).collect();
            sinks::pick_entry(&titles)?
        }
    };

    let index = resolver::resolve(&key, &entries)?;
    let record: CredentialRecord = session.lookup(index).await?;

    dispatch::dispatch(&record, cli.mode(), cli.format)
}
