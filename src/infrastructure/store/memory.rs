//! In-process credential store

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::infrastructure::traits::{CredentialStore, StoreError, StoreResult, StoredAccount};

/// Credential store backed by a `BTreeMap`, keyed by `(domain, username)`.
///
/// Used by tests and anywhere the platform store must not be touched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<(String, String), String>>,
    failure: Mutex<Option<String>>,
    hidden: Mutex<BTreeSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with `(domain, username, password)` triples.
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.lock();
            for (domain, username, password) in items {
                map.insert((domain.to_string(), username.to_string()), password.to_string());
            }
        }
        store
    }

    /// Make every subsequent call fail with a backend error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Leave a domain's items in place but omit them from `accounts` and
    /// `accounts_for`, as a store does when another writer races a lookup.
    pub fn hide_from_queries(&self, domain: impl Into<String>) {
        self.hidden
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(domain.into());
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), String>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> StoreResult<()> {
        match &*self.failure.lock().unwrap_or_else(|e| e.into_inner()) {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn is_hidden(&self, domain: &str) -> bool {
        self.hidden
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(domain)
    }

    fn key(domain: &str, username: &str) -> (String, String) {
        (domain.to_string(), username.to_string())
    }
}

impl CredentialStore for MemoryStore {
    fn accounts(&self) -> StoreResult<Vec<StoredAccount>> {
        self.check()?;
        Ok(self
            .lock()
            .keys()
            .filter(|(domain, _)| !self.is_hidden(domain))
            .map(|(domain, username)| StoredAccount {
                domain: domain.clone(),
                username: username.clone(),
            })
            .collect())
    }

    fn accounts_for(&self, domain: &str) -> StoreResult<Vec<String>> {
        self.check()?;
        Ok(self
            .lock()
            .keys()
            .filter(|(d, _)| d == domain && !self.is_hidden(d))
            .map(|(_, username)| username.clone())
            .collect())
    }

    fn password(&self, domain: &str, username: &str) -> StoreResult<String> {
        self.check()?;
        self.lock()
            .get(&Self::key(domain, username))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn add(&self, domain: &str, username: &str, password: &str) -> StoreResult<()> {
        self.check()?;
        let mut items = self.lock();
        let key = Self::key(domain, username);
        if items.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        items.insert(key, password.to_string());
        Ok(())
    }

    fn update(
        &self,
        domain: &str,
        old_username: &str,
        new_username: &str,
        password: &str,
    ) -> StoreResult<()> {
        self.check()?;
        let mut items = self.lock();
        items
            .remove(&Self::key(domain, old_username))
            .ok_or(StoreError::NotFound)?;
        items.insert(Self::key(domain, new_username), password.to_string());
        Ok(())
    }

    fn delete(&self, domain: &str, username: &str) -> StoreResult<()> {
        self.check()?;
        self.lock()
            .remove(&Self::key(domain, username))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_existing_item_when_adding_again_then_duplicate() {
        let store = MemoryStore::with_items([("a.com", "me", "pw")]);
        assert_eq!(store.add("a.com", "me", "other"), Err(StoreError::Duplicate));
        assert_eq!(store.password("a.com", "me").unwrap(), "pw");
    }

    #[test]
    fn given_rename_when_updating_then_old_key_is_gone() {
        let store = MemoryStore::with_items([("a.com", "old", "pw")]);

        store.update("a.com", "old", "new", "pw2").unwrap();

        assert_eq!(store.accounts_for("a.com").unwrap(), vec!["new".to_string()]);
        assert_eq!(store.password("a.com", "new").unwrap(), "pw2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn given_failure_injected_when_listing_then_backend_error() {
        let store = MemoryStore::new();
        store.fail_with("keychain locked");
        assert_eq!(
            store.accounts(),
            Err(StoreError::Backend("keychain locked".into()))
        );
    }
}
