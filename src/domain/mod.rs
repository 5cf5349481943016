pub mod appointment;
pub mod client;
pub mod pet;
pub mod repositories;
pub mod user;

// Re-export commonly used types
pub use appointment::{
    Appointment, AppointmentRepository, AppointmentStatus, AppointmentType, CreateAppointmentDto,
    UpdateAppointmentDto,
};
pub use client::{Client, ClientRepository, ClientSummary, CreateClientDto, UpdateClientDto};
pub use pet::{CreatePetDto, Pet, PetGender, PetRepository, PetSpecies, PetSummary, UpdatePetDto};
pub use repositories::{DomainResult, RepositoryProvider};
pub use user::{
    CreateUserDto, LoginFailure, RegisterUserDto, UpdateUserDto, User, UserRepository, UserRole,
};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
