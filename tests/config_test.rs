//! Tests for layered settings loading

use std::fs;

use tempfile::TempDir;

use passkc::application::ApplicationError;
use passkc::config::{resolve_config_path, Settings, DEFAULT_SERVICE_PREFIX};
use passkc::domain::{OutputFormat, SortKey};

#[test]
fn given_config_file_when_loading_then_values_override_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("passkc.toml");
    fs::write(
        &path,
        r#"
output = "csv"
sort = "username"
confirm_remove = false
default_domain = "github.com"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::from_file(Some(&path)).unwrap();

    // Assert
    assert_eq!(settings.output, OutputFormat::Csv);
    assert_eq!(settings.sort, SortKey::Username);
    assert!(!settings.confirm_remove);
    assert_eq!(settings.default_domain.as_deref(), Some("github.com"));
    assert_eq!(settings.service_prefix, DEFAULT_SERVICE_PREFIX);
}

#[test]
fn given_missing_explicit_config_when_loading_then_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");

    let err = Settings::from_file(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("config file not found"));
}

#[test]
fn given_unknown_output_value_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("passkc.toml");
    fs::write(&path, "output = \"yaml\"\n").unwrap();

    let err = Settings::from_file(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_written_template_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("passkc.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::from_file(Some(&path)).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_explicit_path_when_resolving_then_returned_as_is() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");

    assert_eq!(resolve_config_path(Some(&path)), Some(path));
}

#[test]
fn given_passkc_env_vars_when_loading_then_override_file_and_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("passkc.toml");
    fs::write(&path, "output = \"csv\"\n").unwrap();
    let vars = [
        ("PASSKC_OUTPUT", "json"),
        ("PASSKC_SORT", "username"),
        ("PASSKC_CONFIRM_REMOVE", "false"),
        ("PASSKC_SERVICE_PREFIX", "org.example"),
    ];
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    // Act
    let result = Settings::load(Some(&path));
    for (key, _) in vars {
        std::env::remove_var(key);
    }
    let settings = result.unwrap();

    // Assert
    assert_eq!(settings.output, OutputFormat::Json);
    assert_eq!(settings.sort, SortKey::Username);
    assert!(!settings.confirm_remove);
    assert_eq!(settings.service_prefix, "org.example");
}
