//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + the `RepositoryProvider` that builds them.

pub mod appointment_repository;
pub mod client_repository;
pub mod pet_repository;
pub mod repository_provider;
pub mod user_repository;

pub use appointment_repository::SeaOrmAppointmentRepository;
pub use client_repository::SeaOrmClientRepository;
pub use pet_repository::SeaOrmPetRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use user_repository::SeaOrmUserRepository;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Map a write error, turning unique-constraint violations into `Conflict`.
pub(crate) fn write_err(e: sea_orm::DbErr, conflict: &str) -> DomainError {
    let msg = e.to_string();
    if msg.contains("UNIQUE") || msg.contains("duplicate") {
        DomainError::Conflict(conflict.to_string())
    } else {
        db_err(e)
    }
}
