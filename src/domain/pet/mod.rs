//! Pet aggregate

pub mod model;
pub mod repository;

mod dto;

pub use dto::{CreatePetDto, UpdatePetDto};
pub use model::{Pet, PetGender, PetSpecies, PetSummary};
pub use repository::PetRepository;
