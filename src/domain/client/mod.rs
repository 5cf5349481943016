//! Client aggregate

pub mod model;
pub mod repository;

mod dto;

pub use dto::{CreateClientDto, UpdateClientDto};
pub use model::{Client, ClientSummary};
pub use repository::ClientRepository;
