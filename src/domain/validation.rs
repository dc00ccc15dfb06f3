//! Input validation, applied before any store call

use crate::domain::DomainError;

pub fn validate_domain(domain: &str) -> Result<(), DomainError> {
    if domain.trim().is_empty() {
        return Err(DomainError::EmptyDomain);
    }
    if domain.chars().any(char::is_whitespace) {
        return Err(DomainError::DomainWhitespace(domain.to_string()));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::EmptyUsername);
    }
    Ok(())
}

/// Passwords are never defaulted: an empty one means the prompt was skipped.
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.is_empty() {
        return Err(DomainError::EmptyPassword);
    }
    Ok(())
}
