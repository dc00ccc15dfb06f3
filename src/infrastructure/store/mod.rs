//! Credential store backends

#[cfg(target_os = "macos")]
mod keychain;
#[cfg(not(target_os = "macos"))]
mod keyring_store;
mod memory;

#[cfg(target_os = "macos")]
pub use keychain::KeychainStore;
#[cfg(not(target_os = "macos"))]
pub use keyring_store::KeyringStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use tracing::warn;

use crate::infrastructure::traits::{CredentialStore, StoreResult};

/// The platform's native store, namespaced by `service_prefix`.
pub fn platform_store(service_prefix: &str) -> Arc<dyn CredentialStore> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(KeychainStore::new(service_prefix))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(KeyringStore::new(service_prefix))
    }
}

/// Rewrite an item under `new_username`, then delete the `old_username` item.
///
/// When the delete fails the freshly written item is removed again, so a
/// domain never ends up with both accounts.
pub(crate) fn move_account(
    old_username: &str,
    new_username: &str,
    write: impl Fn(&str) -> StoreResult<()>,
    delete: impl Fn(&str) -> StoreResult<()>,
) -> StoreResult<()> {
    write(new_username)?;
    if old_username == new_username {
        return Ok(());
    }
    if let Err(e) = delete(old_username) {
        if let Err(rollback) = delete(new_username) {
            warn!("could not roll back account {}: {}", new_username, rollback);
        }
        return Err(e);
    }
    Ok(())
}
