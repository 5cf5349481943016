use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserDto, LoginFailure, UpdateUserDto, User, UserRole};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_all(&self, active_only: bool) -> DomainResult<Vec<User>>;
    async fn find_by_role(&self, role: UserRole, active_only: bool) -> DomainResult<Vec<User>>;
    async fn count(&self) -> DomainResult<u64>;

    async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    async fn update_password(&self, id: i32, password_hash: &str) -> DomainResult<()>;
    async fn set_active(&self, id: i32, active: bool) -> DomainResult<bool>;

    /// Reset the failure counter, clear any lock and stamp `last_login`.
    async fn record_login_success(&self, id: i32, at: DateTime<Utc>) -> DomainResult<()>;
    /// Persist the failure counter and optional lock computed by the caller.
    async fn record_login_failure(&self, id: i32, failure: LoginFailure) -> DomainResult<()>;
}
