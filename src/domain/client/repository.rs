use async_trait::async_trait;

use super::{Client, CreateClientDto, UpdateClientDto};
use crate::domain::DomainResult;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, dto: CreateClientDto) -> DomainResult<Client>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Client>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Client>>;
    async fn find_by_identification_number(&self, number: &str) -> DomainResult<Option<Client>>;
    async fn find_all(&self) -> DomainResult<Vec<Client>>;
    /// Match on first name, last name, email, phone or identification number
    async fn search(&self, query: &str) -> DomainResult<Vec<Client>>;
    async fn count(&self) -> DomainResult<u64>;

    /// Returns `(all_pets, active_pets)` for the client
    async fn count_pets(&self, id: i32) -> DomainResult<(u64, u64)>;

    async fn update(&self, id: i32, dto: UpdateClientDto) -> DomainResult<Option<Client>>;

    /// Delete the client together with its pets and their appointments,
    /// in that order, inside one transaction. Returns whether a client row
    /// was removed.
    async fn delete(&self, id: i32) -> DomainResult<bool>;
}
