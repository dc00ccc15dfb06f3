//! Domain entities: core data structures

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A stored login for one domain.
///
/// `password` is `None` when the credential comes from a listing: enumeration
/// never reads secrets.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub domain: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Credential {
    /// Credential without a secret (listing entry).
    pub fn new(domain: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password: None,
        }
    }

    /// Credential carrying its secret.
    pub fn with_password(
        domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Case-insensitive substring match on domain or username.
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        self.domain.to_lowercase().contains(&pattern)
            || self.username.to_lowercase().contains(&pattern)
    }
}

// Never print secrets, not even in debug logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(DomainError::UnknownOutputFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        };
        f.write_str(name)
    }
}

/// Field used to order `show` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Domain,
    Username,
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "username" => Ok(Self::Username),
            other => Err(DomainError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Domain => "domain",
            Self::Username => "username",
        };
        f.write_str(name)
    }
}

impl SortKey {
    /// Compare two credentials by this key, breaking ties with the other field.
    pub fn compare(&self, a: &Credential, b: &Credential) -> Ordering {
        match self {
            Self::Domain => a
                .domain
                .cmp(&b.domain)
                .then_with(|| a.username.cmp(&b.username)),
            Self::Username => a
                .username
                .cmp(&b.username)
                .then_with(|| a.domain.cmp(&b.domain)),
        }
    }
}

/// Filter by optional pattern, then sort.
pub fn select_credentials(
    credentials: Vec<Credential>,
    pattern: Option<&str>,
    sort: SortKey,
) -> Vec<Credential> {
    use itertools::Itertools;

    credentials
        .into_iter()
        .filter(|c| match pattern {
            Some(p) if !p.is_empty() => c.matches(p),
            _ => true,
        })
        .sorted_by(|a, b| sort.compare(a, b))
        .collect()
}

/// Namespaced store identifier for a domain, e.g. `com.passkc.github.com`.
pub fn service_name(prefix: &str, domain: &str) -> String {
    format!("{}.{}", prefix, domain)
}

/// Inverse of [`service_name`]: the domain part of a namespaced identifier.
pub fn domain_from_service<'a>(prefix: &str, service: &'a str) -> Option<&'a str> {
    service
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|domain| !domain.is_empty())
}

/// One credential line from an import file or piped stdin.
#[derive(Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub domain: String,
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for ImportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRecord")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ImportRecord {
    /// Parse `domain username [password]`.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments. Fields beyond the
    /// third are ignored.
    pub fn parse(line: &str) -> Result<Option<Self>, DomainError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let mut fields = trimmed.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(domain), Some(username)) => Ok(Some(Self {
                domain: domain.to_string(),
                username: username.to_string(),
                password: fields.next().map(str::to_string),
            })),
            _ => Err(DomainError::InvalidImportLine(trimmed.to_string())),
        }
    }
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Credential> {
        vec![
            Credential::new("google.com", "testuser"),
            Credential::new("github.com", "anotheruser"),
            Credential::new("GitLab.com", "Third"),
        ]
    }

    #[test]
    fn given_pattern_when_selecting_then_matches_case_insensitively() {
        let result = select_credentials(sample(), Some("GIT"), SortKey::Domain);

        let domains: Vec<_> = result.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, vec!["GitLab.com", "github.com"]);
    }

    #[test]
    fn given_pattern_matching_username_when_selecting_then_includes_entry() {
        let result = select_credentials(sample(), Some("third"), SortKey::Domain);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].domain, "GitLab.com");
    }

    #[test]
    fn given_username_sort_when_selecting_then_orders_by_username() {
        let result = select_credentials(sample(), None, SortKey::Username);

        let users: Vec<_> = result.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(users, vec!["Third", "anotheruser", "testuser"]);
    }

    #[test]
    fn given_empty_pattern_when_selecting_then_keeps_everything() {
        let result = select_credentials(sample(), Some(""), SortKey::Domain);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_service_name_roundtrip() {
        let service = service_name("com.passkc", "github.com");
        assert_eq!(service, "com.passkc.github.com");
        assert_eq!(domain_from_service("com.passkc", &service), Some("github.com"));
        assert_eq!(domain_from_service("com.passkc", "com.passkcx.a"), None);
        assert_eq!(domain_from_service("com.passkc", "com.passkc."), None);
        assert_eq!(domain_from_service("com.passkc", "org.other.github.com"), None);
    }

    #[test]
    fn test_import_record_parse() {
        let record = ImportRecord::parse("  github.com  user1   pass123 ")
            .unwrap()
            .unwrap();
        assert_eq!(record.domain, "github.com");
        assert_eq!(record.username, "user1");
        assert_eq!(record.password.as_deref(), Some("pass123"));

        let record = ImportRecord::parse("google.com user2").unwrap().unwrap();
        assert_eq!(record.password, None);

        assert!(ImportRecord::parse("").unwrap().is_none());
        assert!(ImportRecord::parse("   # comment").unwrap().is_none());
        assert!(matches!(
            ImportRecord::parse("lonely.com"),
            Err(DomainError::InvalidImportLine(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let cred = Credential::with_password("a.com", "me", "hunter2");
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!("username".parse::<SortKey>().unwrap(), SortKey::Username);
        assert!("age".parse::<SortKey>().is_err());
    }
}
