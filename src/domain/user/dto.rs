use chrono::{DateTime, Utc};

use super::UserRole;

/// Input for registering a staff account (plain-text password)
#[derive(Debug, Clone)]
pub struct RegisterUserDto {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub first_name: String,
    pub last_name: String,
}

/// Row-level insert handed to the repository (password already hashed)
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Outcome of a failed login, as persisted
#[derive(Debug, Clone, Copy)]
pub struct LoginFailure {
    pub attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}
