//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::User;

/// Staff account as returned by the API; never carries the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// admin, veterinarian, receptionist, assistant
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            full_name: u.full_name(),
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role.as_str().to_string(),
            first_name: u.first_name,
            last_name: u.last_name,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
            last_login: u.last_login,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email format"), length(max = 100))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
    /// Defaults to receptionist
    pub role: Option<String>,
    #[validate(length(min = 1, max = 50, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "last name is required"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub role: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Include deactivated accounts
    #[serde(default)]
    pub include_inactive: bool,
    /// Only this role (admin, veterinarian, receptionist, assistant)
    pub role: Option<String>,
}
