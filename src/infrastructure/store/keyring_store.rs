//! Portable backend over the `keyring` crate (Secret Service, Credential Manager)
//!
//! The native stores behind `keyring` cannot enumerate, so an index entry
//! (`<service_prefix>` / `index`) holds a JSON map `domain -> username`. The
//! index is only a cache: every read checks each row against its real entry
//! and persists the pruned map when rows have gone stale.

use std::collections::BTreeMap;

use keyring::Entry;
use tracing::{debug, warn};

use crate::domain::service_name;
use crate::infrastructure::store::move_account;
use crate::infrastructure::traits::{CredentialStore, StoreError, StoreResult, StoredAccount};

const INDEX_USER: &str = "index";

type Index = BTreeMap<String, String>;

/// Credential store backed by the platform keyring.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    prefix: String,
}

fn map_err(e: keyring::Error) -> StoreError {
    match e {
        keyring::Error::NoEntry => StoreError::NotFound,
        other => StoreError::Backend(other.to_string()),
    }
}

impl KeyringStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn entry(&self, domain: &str, username: &str) -> StoreResult<Entry> {
        Entry::new(&service_name(&self.prefix, domain), username).map_err(map_err)
    }

    fn index_entry(&self) -> StoreResult<Entry> {
        Entry::new(&self.prefix, INDEX_USER).map_err(map_err)
    }

    fn read_index(&self) -> StoreResult<Index> {
        match self.index_entry()?.get_password() {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| StoreError::Backend(format!("corrupt credential index: {e}"))),
            Err(keyring::Error::NoEntry) => Ok(Index::new()),
            Err(e) => Err(map_err(e)),
        }
    }

    fn write_index(&self, index: &Index) -> StoreResult<()> {
        let entry = self.index_entry()?;
        if index.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(map_err(e)),
            };
        }
        let json = serde_json::to_string(index)
            .map_err(|e| StoreError::Backend(format!("serialize credential index: {e}")))?;
        entry.set_password(&json).map_err(map_err)
    }

    fn entry_exists(&self, domain: &str, username: &str) -> StoreResult<bool> {
        match self.entry(domain, username)?.get_password() {
            Ok(_) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(map_err(e)),
        }
    }

    /// Load the index, dropping rows whose entry no longer exists.
    fn reconciled_index(&self) -> StoreResult<Index> {
        let index = self.read_index()?;
        let (verified, pruned) = reconcile(index, |d, u| self.entry_exists(d, u))?;
        if pruned {
            self.write_index(&verified)?;
        }
        Ok(verified)
    }
}

/// Keep the index rows whose entry still exists.
///
/// Returns the verified index and whether any row was dropped. An error from
/// `exists` aborts without dropping anything.
fn reconcile(
    index: Index,
    exists: impl Fn(&str, &str) -> StoreResult<bool>,
) -> StoreResult<(Index, bool)> {
    let total = index.len();
    let mut verified = Index::new();
    for (domain, username) in index {
        if exists(&domain, &username)? {
            verified.insert(domain, username);
        } else {
            warn!("dropping stale index row for {}", domain);
        }
    }
    let pruned = verified.len() != total;
    Ok((verified, pruned))
}

impl CredentialStore for KeyringStore {
    fn accounts(&self) -> StoreResult<Vec<StoredAccount>> {
        let index = self.reconciled_index()?;
        debug!("keyring: {} accounts under {}", index.len(), self.prefix);
        Ok(index
            .into_iter()
            .map(|(domain, username)| StoredAccount { domain, username })
            .collect())
    }

    fn accounts_for(&self, domain: &str) -> StoreResult<Vec<String>> {
        let mut index = self.read_index()?;
        let Some(username) = index.get(domain).cloned() else {
            return Ok(Vec::new());
        };
        if self.entry_exists(domain, &username)? {
            return Ok(vec![username]);
        }
        warn!("dropping stale index row for {}", domain);
        index.remove(domain);
        self.write_index(&index)?;
        Ok(Vec::new())
    }

    fn password(&self, domain: &str, username: &str) -> StoreResult<String> {
        self.entry(domain, username)?.get_password().map_err(map_err)
    }

    fn add(&self, domain: &str, username: &str, password: &str) -> StoreResult<()> {
        if self.entry_exists(domain, username)? {
            return Err(StoreError::Duplicate);
        }
        debug!("keyring: add {}", service_name(&self.prefix, domain));
        self.entry(domain, username)?
            .set_password(password)
            .map_err(map_err)?;

        let mut index = self.read_index()?;
        index.insert(domain.to_string(), username.to_string());
        self.write_index(&index)
    }

    fn update(
        &self,
        domain: &str,
        old_username: &str,
        new_username: &str,
        password: &str,
    ) -> StoreResult<()> {
        if !self.entry_exists(domain, old_username)? {
            return Err(StoreError::NotFound);
        }
        debug!("keyring: update {}", service_name(&self.prefix, domain));
        move_account(
            old_username,
            new_username,
            |username| {
                self.entry(domain, username)?
                    .set_password(password)
                    .map_err(map_err)
            },
            |username| {
                self.entry(domain, username)?
                    .delete_credential()
                    .map_err(map_err)
            },
        )?;

        let mut index = self.read_index()?;
        index.insert(domain.to_string(), new_username.to_string());
        self.write_index(&index)
    }

    fn delete(&self, domain: &str, username: &str) -> StoreResult<()> {
        debug!("keyring: delete {}", service_name(&self.prefix, domain));
        self.entry(domain, username)?
            .delete_credential()
            .map_err(map_err)?;

        let mut index = self.read_index()?;
        if index.remove(domain).is_some() {
            self.write_index(&index)?;
        }
        Ok(())
    }
}
