//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::CredentialService;
use crate::config::Settings;
use crate::infrastructure::store::platform_store;
use crate::infrastructure::traits::{
    CredentialStore, InputSource, Prompter, StdinInput, TerminalPrompter,
};

/// Container holding all application services and I/O boundaries.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Interactive prompts
    pub prompter: Arc<dyn Prompter>,

    /// Piped standard input
    pub input: Arc<dyn InputSource>,

    /// Credential adapter over the secret store
    pub credentials: CredentialService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let store = platform_store(&settings.service_prefix);
        Self::with_deps(
            settings,
            store,
            Arc::new(TerminalPrompter),
            Arc::new(StdinInput),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn CredentialStore>,
        prompter: Arc<dyn Prompter>,
        input: Arc<dyn InputSource>,
    ) -> Self {
        let settings = Arc::new(settings);
        let credentials = CredentialService::new(store);

        Self {
            settings,
            prompter,
            input,
            credentials,
        }
    }
}
