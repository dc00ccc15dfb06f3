//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>` if given, else `$XDG_CONFIG_HOME/passkc/passkc.toml`
//! 3. Environment variables: `PASSKC_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, OutputFormat, SortKey};

/// Default namespace for store service identifiers.
pub const DEFAULT_SERVICE_PREFIX: &str = "com.passkc";

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub service_prefix: Option<String>,
    pub output: Option<OutputFormat>,
    pub sort: Option<SortKey>,
    pub confirm_remove: Option<bool>,
    pub default_domain: Option<String>,
}

/// Unified configuration for passkc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Namespace prepended to domains in the secret store
    pub service_prefix: String,
    /// Output format when `-o` is not given
    pub output: OutputFormat,
    /// Sort order for `show` when `--sort` is not given
    pub sort: SortKey,
    /// Ask before removing credentials
    pub confirm_remove: bool,
    /// Fallback domain for get/set/remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_domain: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_prefix: DEFAULT_SERVICE_PREFIX.to_string(),
            output: OutputFormat::default(),
            sort: SortKey::default(),
            confirm_remove: true,
            default_domain: None,
        }
    }
}

/// Get the XDG config directory for passkc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "passkc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("passkc.toml"))
}

/// Resolve the config file to use: the explicit path (expanded) or the global one.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(PathBuf::from(expand_env_vars(&path.to_string_lossy()))),
        None => global_config_path(),
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            service_prefix: overlay
                .service_prefix
                .clone()
                .unwrap_or_else(|| self.service_prefix.clone()),
            output: overlay.output.unwrap_or(self.output),
            sort: overlay.sort.unwrap_or(self.sort),
            confirm_remove: overlay.confirm_remove.unwrap_or(self.confirm_remove),
            default_domain: overlay
                .default_domain
                .clone()
                .or_else(|| self.default_domain.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_path` - Explicit config file (`--config`); must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `config_path`, or the global config file when it exists
    /// 3. Environment variables: `PASSKC_*` prefix
    pub fn load(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::from_file(config_path)?;
        current = Self::apply_env_overrides(current)?;
        Ok(current)
    }

    /// Load defaults plus config file only (no environment overrides).
    pub fn from_file(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let current = Self::default();

        match (config_path, resolve_config_path(config_path)) {
            (Some(_), Some(path)) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                debug!("loading config from {}", path.display());
                Ok(current.merge_with(&load_raw_settings(&path)?))
            }
            (None, Some(path)) if path.exists() => {
                debug!("loading global config from {}", path.display());
                Ok(current.merge_with(&load_raw_settings(&path)?))
            }
            _ => Ok(current),
        }
    }

    /// Apply PASSKC_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PASSKC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("service_prefix") {
            settings.service_prefix = val;
        }
        if let Ok(val) = config.get_string("output") {
            settings.output = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("PASSKC_OUTPUT: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("sort") {
            settings.sort = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("PASSKC_SORT: {e}"),
            })?;
        }
        if let Ok(val) = config.get_bool("confirm_remove") {
            settings.confirm_remove = val;
        }
        if let Ok(val) = config.get_string("default_domain") {
            if !val.trim().is_empty() {
                settings.default_domain = Some(val);
            }
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# passkc configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/passkc/passkc.toml (or --config <file>)
#   Env:  PASSKC_* environment variables (explicit overrides)

# Namespace for keychain items: entries are stored as <service_prefix>.<domain>
# service_prefix = "com.passkc"

# Default output format: text, json or csv
# output = "text"

# Default sort order for `passkc show`: domain or username
# sort = "domain"

# Ask for confirmation before `passkc remove`
# confirm_remove = true

# Domain used when none is given (also: PASSKC_DEFAULT_DOMAIN)
# default_domain = "github.com"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
