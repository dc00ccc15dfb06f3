//! Error conversion helpers for store calls
//!
//! Provides extension traits for cleaner error handling with domain context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::{StoreError, StoreResult};

/// Extension trait for converting `StoreResult` to `ApplicationResult` with context.
pub trait StoreResultExt<T> {
    /// Add domain context to a store error.
    ///
    /// `NotFound` becomes [`ApplicationError::NotFound`] so the user gets the
    /// remediation hint; everything else is wrapped as a store failure.
    ///
    /// # Example
    /// ```ignore
    /// store.delete(domain, &username)
    ///     .with_domain_context("remove credentials", domain)?;
    /// ```
    fn with_domain_context(self, action: &str, domain: &str) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn with_domain_context(self, action: &str, domain: &str) -> ApplicationResult<T> {
        self.map_err(|e| match e {
            StoreError::NotFound => ApplicationError::NotFound {
                domain: domain.to_string(),
            },
            other => ApplicationError::Store {
                context: format!("{} for {}", action, domain),
                source: other,
            },
        })
    }
}
