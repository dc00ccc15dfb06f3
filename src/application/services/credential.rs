//! Credential adapter over the platform secret store
//!
//! Translates the store's native add/query/update/delete calls into the
//! four verbs the CLI needs, keyed by domain. A domain maps to at most one
//! credential: when the store holds several accounts under one domain the
//! first one wins.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, StoreResultExt};
use crate::domain::{validate_domain, validate_password, validate_username, Credential};
use crate::infrastructure::traits::CredentialStore;
use crate::infrastructure::StoreError;

/// What `set` did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Created,
    Updated,
}

/// Credential management service.
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
}

impl CredentialService {
    /// Create a new credential service.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// All credentials under the namespace, without passwords.
    #[instrument(skip(self))]
    pub fn list(&self) -> ApplicationResult<Vec<Credential>> {
        let accounts = self
            .store
            .accounts()
            .map_err(|source| ApplicationError::Store {
                context: "list credentials".to_string(),
                source,
            })?;
        debug!("list: {} accounts", accounts.len());
        Ok(accounts
            .into_iter()
            .map(|a| Credential::new(a.domain, a.username))
            .collect())
    }

    /// Look up the account for a domain without reading its secret.
    pub fn find(&self, domain: &str) -> ApplicationResult<Option<Credential>> {
        validate_domain(domain)?;
        let usernames = self
            .store
            .accounts_for(domain)
            .with_domain_context("look up credentials", domain)?;
        if usernames.len() > 1 {
            debug!(
                "find: {} accounts for {}, using the first",
                usernames.len(),
                domain
            );
        }
        Ok(usernames
            .into_iter()
            .next()
            .map(|username| Credential::new(domain, username)))
    }

    /// Fetch the credential for a domain, including its password.
    ///
    /// # Errors
    /// [`ApplicationError::NotFound`] when nothing is stored for `domain`.
    #[instrument(skip(self))]
    pub fn get(&self, domain: &str) -> ApplicationResult<Credential> {
        let found = self.require(domain)?;
        let password = self
            .store
            .password(domain, &found.username)
            .with_domain_context("read password", domain)?;
        Ok(Credential {
            password: Some(password),
            ..found
        })
    }

    /// Insert or update the credential for a domain.
    ///
    /// The password must already be collected; an empty one is rejected.
    /// Updating rewrites username and password together.
    #[instrument(skip(self, password))]
    pub fn set(
        &self,
        domain: &str,
        username: &str,
        password: &str,
    ) -> ApplicationResult<SetOutcome> {
        validate_domain(domain)?;
        validate_username(username)?;
        validate_password(password)?;

        match self.find(domain)? {
            Some(existing) => {
                debug!("set: updating {} ({})", domain, existing.username);
                self.store
                    .update(domain, &existing.username, username, password)
                    .with_domain_context("update credentials", domain)?;
                Ok(SetOutcome::Updated)
            }
            None => match self.store.add(domain, username, password) {
                Ok(()) => {
                    debug!("set: created {}", domain);
                    Ok(SetOutcome::Created)
                }
                Err(StoreError::Duplicate) => {
                    debug!("set: {} appeared concurrently, updating", domain);
                    self.store
                        .update(domain, username, username, password)
                        .with_domain_context("update credentials", domain)?;
                    Ok(SetOutcome::Updated)
                }
                Err(e) => Err::<SetOutcome, _>(e).with_domain_context("save credentials", domain),
            },
        }
    }

    /// Replace username and password of an existing credential.
    ///
    /// # Errors
    /// [`ApplicationError::NotFound`] when nothing is stored for `domain`.
    #[instrument(skip(self, password))]
    pub fn modify(&self, domain: &str, username: &str, password: &str) -> ApplicationResult<()> {
        validate_domain(domain)?;
        validate_username(username)?;
        validate_password(password)?;
        let existing = self.require(domain)?;
        self.store
            .update(domain, &existing.username, username, password)
            .with_domain_context("update credentials", domain)
    }

    /// Delete the credential for a domain, returning what was removed.
    #[instrument(skip(self))]
    pub fn remove(&self, domain: &str) -> ApplicationResult<Credential> {
        let existing = self.require(domain)?;
        self.store
            .delete(domain, &existing.username)
            .with_domain_context("remove credentials", domain)?;
        debug!("remove: deleted {}", domain);
        Ok(existing)
    }

    fn require(&self, domain: &str) -> ApplicationResult<Credential> {
        self.find(domain)?
            .ok_or_else(|| ApplicationError::NotFound {
                domain: domain.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::store::MemoryStore;

    fn service_with(store: Arc<MemoryStore>) -> CredentialService {
        CredentialService::new(store)
    }

    #[test]
    fn given_two_accounts_under_domain_when_getting_then_first_match_wins() {
        let store = Arc::new(MemoryStore::with_items([
            ("a.com", "alice", "pw-a"),
            ("a.com", "bob", "pw-b"),
        ]));
        let service = service_with(store);

        let cred = service.get("a.com").unwrap();

        assert_eq!(cred.username, "alice");
        assert_eq!(cred.password.as_deref(), Some("pw-a"));
    }

    #[test]
    fn given_invalid_domain_when_setting_then_store_untouched() {
        let store = Arc::new(MemoryStore::new());
        store.fail_with("must not be called");
        let service = service_with(Arc::clone(&store));

        let err = service.set("bad domain", "me", "pw").unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::DomainWhitespace(_))
        ));
    }

    #[test]
    fn given_add_reports_duplicate_when_setting_then_updates_instead() {
        // Arrange
        let store = Arc::new(MemoryStore::with_items([("a.com", "alice", "old")]));
        store.hide_from_queries("a.com");
        let service = service_with(Arc::clone(&store));

        // Act
        let outcome = service.set("a.com", "alice", "new").unwrap();

        // Assert
        assert_eq!(outcome, SetOutcome::Updated);
        assert_eq!(store.password("a.com", "alice").unwrap(), "new");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn given_store_failure_when_listing_then_store_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail_with("keychain locked");
        let service = service_with(store);

        let err = service.list().unwrap_err();

        assert!(err.to_string().contains("keychain locked"));
        assert!(matches!(err, ApplicationError::Store { .. }));
    }
}
