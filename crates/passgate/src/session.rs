//! Session-association lifecycle on top of a [`VaultProxy`].
//!
//! Establishing is idempotent across runs: once an association is on disk it
//! is loaded and reused forever; interactive pairing happens at most once.
//! A rejected association fails closed; deciding to re-pair (by deleting the
//! file) is left to the user.

use passgate_core::associate::AssociationStore;
use passgate_core::entry::{CredentialRecord, EntryIndex};
use passgate_core::error::Error;
use tracing::{debug, info};

use crate::proxy::VaultProxy;

pub struct VaultSession<P: VaultProxy> {
    proxy: P,
}

impl<P: VaultProxy> VaultSession<P> {
    pub fn new(proxy: P) -> Self {
        Self { proxy }
    }

    /// Load the saved association, or pair interactively and persist the
    /// result. Never re-pairs when a saved association exists.
    pub async fn establish(&mut self, store: &AssociationStore) -> Result<(), Error> {
        match store.load()? {
            Some(association) => {
                debug!(name = %association.name, "loaded saved association");
                self.proxy.load_association(association);
            }
            None => {
                let association = self.proxy.associate().await?;
                store.save(&association)?;
                info!(
                    name = %association.name,
                    path = %store.path().display(),
                    "paired with vault, association saved"
                );
                self.proxy.load_association(association);
            }
        }
        Ok(())
    }

    /// Confirm the association is still accepted by the vault. Rejection is
    /// fatal; no automatic re-pairing.
    pub async fn verify(&mut self) -> Result<(), Error> {
        self.proxy.test_associate().await
    }

    pub async fn list_entries(&mut self) -> Result<Vec<EntryIndex>, Error> {
        self.proxy.list_entries().await
    }

    /// Fetch the full credential for one index record. The first login wins
    /// when the vault returns several; non-empty index title/url override
    /// the fetched fields.
    pub async fn lookup(&mut self, index: &EntryIndex) -> Result<CredentialRecord, Error> {
        let logins = self.proxy.get_logins(&index.uuid).await?;
        let mut record = logins
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(index.uuid.clone()))?;
        record.apply_index(index);
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
