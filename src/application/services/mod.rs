//! Application services

mod appointment;
mod auth;
mod client;
mod pet;

pub use appointment::{
    AppointmentService, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
pub use auth::{AuthResult, AuthService, AuthSettings};
pub use client::ClientService;
pub use pet::PetService;
