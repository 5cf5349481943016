use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Account locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Database error: {0}")]
    Database(String),

    /// Server-side fault outside storage (hashing, token signing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let e = DomainError::not_found("Pet", 42);
        assert_eq!(e.to_string(), "Not found: Pet with id=42");
    }

    #[test]
    fn account_locked_message_carries_deadline() {
        let until = DateTime::parse_from_rfc3339("2026-01-05T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let e = DomainError::AccountLocked { until };
        assert_eq!(e.to_string(), "Account locked until 2026-01-05 10:30:00 UTC");
    }
}
