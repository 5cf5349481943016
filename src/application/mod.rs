//! Application layer: use-case services and the composition root

pub mod container;
pub mod services;

pub use container::{
    Container, ContainerError, ContainerHealth, RepositoryHandle, RepositoryKind, ServiceHandle,
    ServiceKind,
};
pub use services::{
    AppointmentService, AuthResult, AuthService, AuthSettings, ClientService, PetService,
};
