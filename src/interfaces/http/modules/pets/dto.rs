//! Pet DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Pet, PetSummary};
use crate::interfaces::http::modules::appointments::AppointmentDto;
use crate::interfaces::http::modules::clients::ClientDto;

pub const UNKNOWN_OWNER: &str = "Unknown owner";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PetDto {
    pub id: i32,
    pub name: String,
    /// dog, cat, bird, rabbit, hamster, other
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// male, female, unknown
    pub gender: String,
    pub color: Option<String>,
    /// Kilograms
    pub weight: Option<f64>,
    pub microchip_number: Option<String>,
    pub client_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Pet> for PetDto {
    fn from(p: Pet) -> Self {
        Self {
            id: p.id,
            name: p.name,
            species: p.species.as_str().to_string(),
            breed: p.breed,
            birth_date: p.birth_date,
            gender: p.gender.as_str().to_string(),
            color: p.color,
            weight: p.weight,
            microchip_number: p.microchip_number,
            client_id: p.client_id,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Listing row: the pet plus its owner's name
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PetListItemDto {
    #[serde(flatten)]
    pub pet: PetDto,
    pub owner_name: String,
    pub age_years: Option<u32>,
}

impl From<PetSummary> for PetListItemDto {
    fn from(s: PetSummary) -> Self {
        Self {
            owner_name: owner_name(&s),
            age_years: s.age_years,
            pet: PetDto::from(s.pet),
        }
    }
}

/// Detail view: pet, owner, age and latest appointments
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PetDetailDto {
    pub pet: PetDto,
    pub owner: Option<ClientDto>,
    pub age_years: Option<u32>,
    /// Newest first, at most five
    pub recent_appointments: Vec<AppointmentDto>,
}

/// Autocomplete entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PetSearchResult {
    pub id: i32,
    pub name: String,
    /// Capitalized species, e.g. `Dog`
    pub species: String,
    pub owner: String,
    /// `Rex (Dog) - Ana Garcia`
    pub display: String,
}

impl From<PetSummary> for PetSearchResult {
    fn from(s: PetSummary) -> Self {
        let owner = owner_name(&s);
        let species = s.pet.species.label();
        Self {
            display: format!("{} ({}) - {}", s.pet.name, species, owner),
            id: s.pet.id,
            name: s.pet.name,
            species,
            owner,
        }
    }
}

fn owner_name(summary: &PetSummary) -> String {
    summary
        .owner
        .as_ref()
        .map(|c| c.full_name())
        .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePetRequest {
    #[validate(length(min = 1, max = 50, message = "name is required"))]
    pub name: String,
    /// Defaults to `other`
    pub species: Option<String>,
    #[validate(length(max = 50))]
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Defaults to `unknown`
    pub gender: Option<String>,
    #[validate(length(max = 30))]
    pub color: Option<String>,
    pub weight: Option<f64>,
    #[validate(length(max = 50))]
    pub microchip_number: Option<String>,
    pub client_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePetRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub species: Option<String>,
    #[validate(length(max = 50))]
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    #[validate(length(max = 30))]
    pub color: Option<String>,
    pub weight: Option<f64>,
    #[validate(length(max = 50))]
    pub microchip_number: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPetsParams {
    /// Ranked search over active pets; overrides `show_inactive`
    pub search: Option<String>,
    #[serde(default)]
    pub show_inactive: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PetSearchParams {
    /// At least two characters
    #[serde(default)]
    pub q: String,
}
