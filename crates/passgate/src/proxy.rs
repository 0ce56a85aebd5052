//! Vault proxy connection.
//!
//! The proxy speaks JSON messages with an `"action"` discriminator over a
//! Unix stream socket, framed native-messaging style: a 4-byte little-endian
//! length prefix per message. Encryption of the underlying browser protocol
//! is the proxy's business; this client only drives the four actions the
//! pipeline needs.

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use passgate_core::MAX_FRAME_LENGTH;
use passgate_core::associate::Association;
use passgate_core::entry::{CredentialRecord, EntryIndex};
use passgate_core::error::Error;
use passgate_core::socket::verify_socket_safety;
use tokio::net::UnixStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The four vault operations the session lifecycle is built on. A trait seam
/// so the lifecycle is testable without a running vault.
pub trait VaultProxy {
    /// Interactive pairing. The vault prompts the user to confirm and name
    /// the new client; blocks until they do.
    async fn associate(&mut self) -> Result<Association, Error>;

    /// Load a previously saved association into the connection context.
    fn load_association(&mut self, association: Association);

    /// Confirm the loaded association is still accepted.
    async fn test_associate(&mut self) -> Result<(), Error>;

    /// Fetch the full entry directory, vault order preserved.
    async fn list_entries(&mut self) -> Result<Vec<EntryIndex>, Error>;

    /// Fetch the decrypted logins for one entry by stable identifier.
    async fn get_logins(&mut self, uuid: &str) -> Result<Vec<CredentialRecord>, Error>;
}

pub struct ProxyConnection {
    framed: Framed<UnixStream, LengthDelimitedCodec>,
    association: Option<Association>,
}

impl ProxyConnection {
    pub async fn connect(path: &Path) -> Result<Self, Error> {
        verify_socket_safety(path).map_err(|e| Error::Connection {
            path: path.to_path_buf(),
            source: e,
        })?;

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, UnixStream::connect(path))
            .await
            .map_err(|_| Error::Connection {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out"),
            })?
            .map_err(|e| Error::Connection {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    e.kind(),
                    format!("{e} (is the vault proxy running?)"),
                ),
            })?;

        let codec = LengthDelimitedCodec::builder()
            .length_field_length(4)
            .little_endian()
            .max_frame_length(MAX_FRAME_LENGTH)
            .new_codec();

        Ok(Self {
            framed: Framed::new(stream, codec),
            association: None,
        })
    }

    /// Send one action message and read the reply frame.
    async fn exchange(&mut self, request: serde_json::Value) -> Result<serde_json::Value, Error> {
        let action = request
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        debug!(action, "sending request to vault proxy");

        let out = serde_json::to_vec(&request).map_err(std::io::Error::other)?;
        self.framed.send(Bytes::from(out)).await?;

        let Some(frame) = self.framed.next().await else {
            return Err(Error::Protocol(format!(
                "vault proxy closed the connection during {action}"
            )));
        };
        let frame = frame?;

        serde_json::from_slice(&frame)
            .map_err(|e| Error::Protocol(format!("unparseable {action} response: {e}")))
    }
}

/// Pull the error message out of a proxy reply, if it is one.
fn response_error(response: &serde_json::Value) -> Option<String> {
    let message = response.get("error")?.as_str()?;
    let code = response
        .get("errorCode")
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    if code.is_empty() {
        Some(message.to_string())
    } else {
        Some(format!("{message} (code {code})"))
    }
}

/// The proxy reports success as the string `"true"`.
fn is_success(response: &serde_json::Value) -> bool {
    response.get("success").and_then(|v| v.as_str()) == Some("true")
}

impl VaultProxy for ProxyConnection {
    async fn associate(&mut self) -> Result<Association, Error> {
        let response = self
            .exchange(serde_json::json!({ "action": "associate" }))
            .await?;

        if response_error(&response).is_some() || !is_success(&response) {
            // Pairing declined or the vault is locked; either way, no identity.
            return Err(Error::Association);
        }

        let name = response
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Protocol("associate response is missing id".into()))?;
        let key = response
            .get("publicKey")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Protocol("associate response is missing publicKey".into()))?;
        let public_key = BASE64
            .decode(key.as_bytes())
            .map_err(|e| Error::Protocol(format!("associate publicKey is not base64: {e}")))?;

        Ok(Association {
            name: name.to_string(),
            public_key,
        })
    }

    fn load_association(&mut self, association: Association) {
        self.association = Some(association);
    }

    async fn test_associate(&mut self) -> Result<(), Error> {
        let Some(association) = &self.association else {
            return Err(Error::Association);
        };

        let request = serde_json::json!({
            "action": "test-associate",
            "id": association.name,
            "key": BASE64.encode(&association.public_key),
        });
        let response = self.exchange(request).await?;

        if response_error(&response).is_some() || !is_success(&response) {
            return Err(Error::Association);
        }
        Ok(())
    }

    async fn list_entries(&mut self) -> Result<Vec<EntryIndex>, Error> {
        let response = self
            .exchange(serde_json::json!({ "action": "get-database-entries" }))
            .await?;

        if let Some(message) = response_error(&response) {
            return Err(Error::Protocol(format!(
                "get-database-entries failed: {message}"
            )));
        }

        let entries = response
            .get("entries")
            .cloned()
            .ok_or_else(|| Error::Protocol("entry listing is missing entries".into()))?;
        serde_json::from_value(entries)
            .map_err(|e| Error::Protocol(format!("malformed entry listing: {e}")))
    }

    async fn get_logins(&mut self, uuid: &str) -> Result<Vec<CredentialRecord>, Error> {
        let request = serde_json::json!({
            "action": "get-logins",
            "url": format!("keepassxc://by-uuid/{uuid}"),
        });
        let response = self.exchange(request).await?;

        // The vault answers a stale or unknown identifier with an error.
        if response_error(&response).is_some() {
            return Err(Error::NotFound(uuid.to_string()));
        }

        let entries = response
            .get("entries")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::Protocol("get-logins response is missing entries".into()))?;
        entries.iter().map(CredentialRecord::from_value).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
