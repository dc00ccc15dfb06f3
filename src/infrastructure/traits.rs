//! I/O boundary traits for testability
//!
//! These traits abstract the secret store and the terminal, allowing services
//! and commands to be tested with in-memory implementations.

use std::io::{self, BufRead, IsTerminal};

use thiserror::Error;

/// Errors reported by a credential store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("item not found in credential store")]
    NotFound,

    #[error("item already exists in credential store")]
    Duplicate,

    #[error("credential store failure: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A `(domain, username)` pair as enumerated from the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoredAccount {
    pub domain: String,
    pub username: String,
}

/// Platform secret store abstraction.
///
/// One method per native call. Implementations namespace every domain with
/// their service prefix; callers only ever see bare domains.
pub trait CredentialStore: Send + Sync {
    /// Enumerate all accounts under the namespace.
    fn accounts(&self) -> StoreResult<Vec<StoredAccount>>;

    /// Usernames stored for one domain, in store order.
    fn accounts_for(&self, domain: &str) -> StoreResult<Vec<String>>;

    /// Read the secret for an account.
    fn password(&self, domain: &str, username: &str) -> StoreResult<String>;

    /// Insert a new item. Fails with [`StoreError::Duplicate`] if it exists.
    fn add(&self, domain: &str, username: &str, password: &str) -> StoreResult<()>;

    /// Rewrite an existing item, possibly under a new username.
    fn update(
        &self,
        domain: &str,
        old_username: &str,
        new_username: &str,
        password: &str,
    ) -> StoreResult<()>;

    /// Delete an item. Fails with [`StoreError::NotFound`] if absent.
    fn delete(&self, domain: &str, username: &str) -> StoreResult<()>;
}

/// Interactive prompt abstraction.
pub trait Prompter: Send + Sync {
    /// Ask for a line of visible text.
    fn input(&self, prompt: &str) -> io::Result<String>;

    /// Ask for a secret without echo.
    fn password(&self, prompt: &str) -> io::Result<String>;

    /// Ask a yes/no question; default is no.
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Standard input abstraction for piped data.
pub trait InputSource: Send + Sync {
    /// True when stdin is a pipe or file rather than a terminal.
    fn is_piped(&self) -> bool;

    /// Read one line, without the trailing newline. `None` at EOF.
    fn read_line(&self) -> io::Result<Option<String>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Terminal prompter using dialoguer.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> io::Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(dialoguer_err)
    }

    fn password(&self, prompt: &str) -> io::Result<String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .with_confirmation("Repeat password", "Passwords do not match")
            .allow_empty_password(true)
            .interact()
            .map_err(dialoguer_err)
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(dialoguer_err)
    }
}

fn dialoguer_err(e: dialoguer::Error) -> io::Error {
    io::Error::other(e)
}

/// Process stdin.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn is_piped(&self) -> bool {
        !io::stdin().is_terminal()
    }

    fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
