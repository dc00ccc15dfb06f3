//! macOS Keychain backend
//!
//! Every credential is a generic-password item: service
//! `<service_prefix>.<domain>`, account = username. Enumeration goes straight
//! to the Keychain, so there is no side index to drift out of sync.

use std::collections::HashMap;

use security_framework::base::Error as SecError;
use security_framework::item::{ItemClass, ItemSearchOptions, Limit};
use security_framework::passwords::{
    delete_generic_password, get_generic_password, set_generic_password,
};
use tracing::{debug, trace};

use crate::domain::{domain_from_service, service_name};
use crate::infrastructure::store::move_account;
use crate::infrastructure::traits::{CredentialStore, StoreError, StoreResult, StoredAccount};

const ERR_SEC_ITEM_NOT_FOUND: i32 = -25300;
const ERR_SEC_DUPLICATE_ITEM: i32 = -25299;

const ATTR_SERVICE: &str = "svce";
const ATTR_ACCOUNT: &str = "acct";

/// Credential store using the user's login Keychain.
#[derive(Debug, Clone)]
pub struct KeychainStore {
    prefix: String,
}

impl KeychainStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn service(&self, domain: &str) -> String {
        service_name(&self.prefix, domain)
    }

    /// Attribute-only search; never reads a secret, so no ACL prompt.
    fn search(
        &self,
        service: Option<&str>,
        account: Option<&str>,
    ) -> StoreResult<Vec<HashMap<String, String>>> {
        let mut options = ItemSearchOptions::new();
        options
            .class(ItemClass::generic_password())
            .load_attributes(true)
            .limit(Limit::All);
        if let Some(service) = service {
            options.service(service);
        }
        if let Some(account) = account {
            options.account(account);
        }
        match options.search() {
            Ok(results) => {
                trace!("keychain search returned {} items", results.len());
                Ok(results.iter().filter_map(|r| r.simplify_dict()).collect())
            }
            Err(e) if e.code() == ERR_SEC_ITEM_NOT_FOUND => Ok(Vec::new()),
            Err(e) => Err(map_err(e)),
        }
    }

    fn exists(&self, domain: &str, username: &str) -> StoreResult<bool> {
        Ok(!self
            .search(Some(&self.service(domain)), Some(username))?
            .is_empty())
    }
}

fn map_err(e: SecError) -> StoreError {
    match e.code() {
        ERR_SEC_ITEM_NOT_FOUND => StoreError::NotFound,
        ERR_SEC_DUPLICATE_ITEM => StoreError::Duplicate,
        _ => StoreError::Backend(e.to_string()),
    }
}

impl CredentialStore for KeychainStore {
    fn accounts(&self) -> StoreResult<Vec<StoredAccount>> {
        let mut accounts: Vec<StoredAccount> = self
            .search(None, None)?
            .into_iter()
            .filter_map(|attrs| {
                let service = attrs.get(ATTR_SERVICE)?;
                let domain = domain_from_service(&self.prefix, service)?;
                Some(StoredAccount {
                    domain: domain.to_string(),
                    username: attrs.get(ATTR_ACCOUNT).cloned().unwrap_or_default(),
                })
            })
            .collect();
        accounts.sort();
        accounts.dedup();
        debug!("keychain: {} accounts under {}", accounts.len(), self.prefix);
        Ok(accounts)
    }

    fn accounts_for(&self, domain: &str) -> StoreResult<Vec<String>> {
        let mut usernames: Vec<String> = self
            .search(Some(&self.service(domain)), None)?
            .into_iter()
            .map(|mut attrs| attrs.remove(ATTR_ACCOUNT).unwrap_or_default())
            .collect();
        usernames.sort();
        usernames.dedup();
        Ok(usernames)
    }

    fn password(&self, domain: &str, username: &str) -> StoreResult<String> {
        let bytes = get_generic_password(&self.service(domain), username).map_err(map_err)?;
        String::from_utf8(bytes)
            .map_err(|_| StoreError::Backend(format!("password for {} is not valid UTF-8", domain)))
    }

    fn add(&self, domain: &str, username: &str, password: &str) -> StoreResult<()> {
        // set_generic_password silently updates, so check existence first to keep add semantics.
        if self.exists(domain, username)? {
            return Err(StoreError::Duplicate);
        }
        debug!("keychain: add {}", self.service(domain));
        set_generic_password(&self.service(domain), username, password.as_bytes()).map_err(map_err)
    }

    fn update(
        &self,
        domain: &str,
        old_username: &str,
        new_username: &str,
        password: &str,
    ) -> StoreResult<()> {
        let service = self.service(domain);
        if !self.exists(domain, old_username)? {
            return Err(StoreError::NotFound);
        }
        debug!("keychain: update {} ({} -> {})", service, old_username, new_username);
        move_account(
            old_username,
            new_username,
            |username| {
                set_generic_password(&service, username, password.as_bytes()).map_err(map_err)
            },
            |username| delete_generic_password(&service, username).map_err(map_err),
        )
    }

    fn delete(&self, domain: &str, username: &str) -> StoreResult<()> {
        debug!("keychain: delete {}", self.service(domain));
        delete_generic_password(&self.service(domain), username).map_err(map_err)
    }
}
