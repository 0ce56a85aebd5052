//! Persistent vault association.
//!
//! Pairing with the vault proxy is interactive (the vault asks the user to
//! confirm and name the new client). The resulting name/key-pair identity is
//! written once to `associate.json` and loaded on every later run so the
//! pairing dialog never reappears.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const ASSOCIATE_FILENAME: &str = "associate.json";

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "PASSGATE_CONFIG_DIR";

/// This client's long-lived identity with the vault proxy.
///
/// Immutable once saved; the vault recognizes the key pair by `name` on
/// `test-associate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub name: String,
    pub public_key: Vec<u8>,
}

/// On-disk envelope. The key travels base64-encoded so the file stays
/// text-safe JSON.
#[derive(Serialize, Deserialize)]
struct Envelope {
    name: String,
    public_key: String,
}

/// Resolve the per-user configuration directory.
///
/// `PASSGATE_CONFIG_DIR` wins, then `$XDG_CONFIG_HOME/passgate` when the XDG
/// dir is absolute, then `~/.config/passgate`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        let dir_path = Path::new(&dir);
        if dir_path.is_absolute() {
            return dir_path.join("passgate");
        }
    }

    let home = std::env::var_os("HOME").unwrap_or_else(|| ".".into());
    PathBuf::from(home).join(".config").join("passgate")
}

/// Loads and saves the single association record.
///
/// Single-user, single-session usage: the file is read once at startup and
/// written at most once per process lifetime.
pub struct AssociationStore {
    path: PathBuf,
}

impl AssociationStore {
    pub fn new() -> Self {
        Self {
            path: config_dir().join(ASSOCIATE_FILENAME),
        }
    }

    /// Store rooted at an explicit file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved association. A missing file is the normal first-run
    /// state and returns `Ok(None)`; a present-but-malformed file is an
    /// error, never silently ignored.
    pub fn load(&self) -> Result<Option<Association>, Error> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        let envelope: Envelope = serde_json::from_str(&raw).map_err(|e| Error::Decode {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let public_key = BASE64
            .decode(envelope.public_key.as_bytes())
            .map_err(|e| Error::Decode {
                path: self.path.clone(),
                reason: format!("invalid public_key: {e}"),
            })?;

        Ok(Some(Association {
            name: envelope.name,
            public_key,
        }))
    }

    /// Write the association, creating the parent directory (mode 0700) when
    /// missing. The write goes to a sibling temp file and is renamed into
    /// place so normal termination never leaves a partial file.
    pub fn save(&self, association: &Association) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_0700(parent)?;
        }

        let envelope = Envelope {
            name: association.name.clone(),
            public_key: BASE64.encode(&association.public_key),
        };
        let encoded = serde_json::to_vec(&envelope).map_err(std::io::Error::other)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &encoded)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Default for AssociationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a directory with mode 0700 if it does not already exist.
fn create_dir_0700(path: &Path) -> Result<(), Error> {
    if path.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
