//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CredentialStore)
//! but are themselves concrete structs, not traits.

mod credential;

pub use credential::{CredentialService, SetOutcome};
