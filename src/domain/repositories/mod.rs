//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: builds the per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use std::sync::Arc;

use super::appointment::AppointmentRepository;
use super::client::ClientRepository;
use super::pet::PetRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Factory for the per-aggregate repositories.
///
/// Every call builds a new repository over the provider's storage; the
/// container calls each method exactly once and shares the result:
///
/// ```ignore
/// let pets = provider.pet_repository();
/// let rex = pets.find_by_id(1).await?;
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn user_repository(&self) -> Arc<dyn UserRepository>;
    fn client_repository(&self) -> Arc<dyn ClientRepository>;
    fn pet_repository(&self) -> Arc<dyn PetRepository>;
    fn appointment_repository(&self) -> Arc<dyn AppointmentRepository>;
}
