//! Database entities module

pub mod appointment;
pub mod client;
pub mod pet;
pub mod user;

pub use appointment::Entity as Appointment;
pub use client::Entity as Client;
pub use pet::Entity as Pet;
pub use user::Entity as User;
