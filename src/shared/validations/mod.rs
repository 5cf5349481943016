//! Field-level validation helpers shared by the application services.

use crate::shared::errors::DomainError;

/// Trim `value` and ensure it is non-empty and at most `max_len` characters.
pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank input becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Minimal structural e-mail check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::Validation(format!("Invalid email address: {}", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", "  Rex ", 50).unwrap(), "Rex");
        assert!(require_text("name", "   ", 50).is_err());
        assert!(require_text("name", &"x".repeat(51), 50).is_err());
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" Lab ".into())), Some("Lab".into()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("ana@vetcare.com").is_ok());
        assert!(validate_email("ana.vetcare.com").is_err());
        assert!(validate_email("@vetcare.com").is_err());
        assert!(validate_email("ana@vetcare").is_err());
        assert!(validate_email("ana@@vetcare.com").is_err());
        assert!(validate_email("ana maria@vetcare.com").is_err());
    }
}
