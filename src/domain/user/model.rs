//! User domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Admin,
    Veterinarian,
    Receptionist,
    Assistant,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Veterinarian,
        UserRole::Receptionist,
        UserRole::Assistant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Veterinarian => "veterinarian",
            Self::Receptionist => "receptionist",
            Self::Assistant => "assistant",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Receptionist
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Invalid role: {}", s)))
    }
}

/// Clinic staff account
#[derive(Clone, Debug)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the account is locked at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    pub fn is_veterinarian(&self) -> bool {
        self.role == UserRole::Veterinarian
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            username: "lmartinez".into(),
            email: "lucia@vetcare.com".into(),
            password_hash: "hash".into(),
            role: UserRole::Veterinarian,
            first_name: "Lucia".into(),
            last_name: "Martinez".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login: None,
            failed_login_attempts: 0,
            locked_until: None,
        }
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Veterinarian".parse::<UserRole>().unwrap(), UserRole::Veterinarian);
        assert_eq!(" admin ".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("janitor".parse::<UserRole>().is_err());
    }

    #[test]
    fn default_role_is_receptionist() {
        assert_eq!(UserRole::default(), UserRole::Receptionist);
    }

    #[test]
    fn lock_expires() {
        let mut user = sample_user();
        let now = Utc::now();
        assert!(!user.is_locked(now));

        user.locked_until = Some(now + Duration::minutes(5));
        assert!(user.is_locked(now));
        assert!(!user.is_locked(now + Duration::minutes(6)));
    }

    #[test]
    fn full_name_joins_names() {
        assert_eq!(sample_user().full_name(), "Lucia Martinez");
    }
}
