//! Client DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Client, ClientSummary, CreateClientDto, UpdateClientDto};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub identification_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientDto {
    fn from(c: Client) -> Self {
        Self {
            full_name: c.full_name(),
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            identification_number: c.identification_number,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Client with pet counts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientDetailDto {
    #[serde(flatten)]
    pub client: ClientDto,
    pub pet_count: u64,
    pub active_pet_count: u64,
}

impl From<ClientSummary> for ClientDetailDto {
    fn from(s: ClientSummary) -> Self {
        Self {
            client: ClientDto::from(s.client),
            pet_count: s.pet_count,
            active_pet_count: s.active_pet_count,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 50, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email format"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 20))]
    pub identification_number: Option<String>,
}

impl From<CreateClientRequest> for CreateClientDto {
    fn from(r: CreateClientRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            identification_number: r.identification_number,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(email(message = "invalid email format"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 20))]
    pub identification_number: Option<String>,
}

impl From<UpdateClientRequest> for UpdateClientDto {
    fn from(r: UpdateClientRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            identification_number: r.identification_number,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListClientsParams {
    /// Match on name, email, phone or identification number
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClientPetsParams {
    /// Include deactivated pets
    #[serde(default)]
    pub show_inactive: bool,
}
