use chrono::NaiveDate;

use super::{PetGender, PetSpecies};

#[derive(Debug, Clone, Default)]
pub struct CreatePetDto {
    pub name: String,
    pub species: PetSpecies,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: PetGender,
    pub color: Option<String>,
    pub weight: Option<f64>,
    pub microchip_number: Option<String>,
    pub client_id: i32,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdatePetDto {
    pub name: Option<String>,
    pub species: Option<PetSpecies>,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<PetGender>,
    pub color: Option<String>,
    pub weight: Option<f64>,
    pub microchip_number: Option<String>,
    pub is_active: Option<bool>,
}
