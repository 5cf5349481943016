use async_trait::async_trait;

use super::{CreatePetDto, Pet, UpdatePetDto};
use crate::domain::DomainResult;

#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn create(&self, dto: CreatePetDto) -> DomainResult<Pet>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Pet>>;
    async fn find_all(&self, active_only: bool) -> DomainResult<Vec<Pet>>;
    async fn find_by_client(&self, client_id: i32, active_only: bool) -> DomainResult<Vec<Pet>>;
    async fn find_by_microchip(&self, microchip_number: &str) -> DomainResult<Option<Pet>>;
    /// Active pets whose name, breed or microchip number contains `query`
    async fn search(&self, query: &str) -> DomainResult<Vec<Pet>>;

    async fn update(&self, id: i32, dto: UpdatePetDto) -> DomainResult<Option<Pet>>;
    async fn set_active(&self, id: i32, active: bool) -> DomainResult<bool>;

    /// Delete the pet and its appointments inside one transaction.
    async fn delete(&self, id: i32) -> DomainResult<bool>;
}
