//! Pet registry: validation, ownership checks and search ranking

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::domain::{
    Client, ClientRepository, CreatePetDto, DomainError, DomainResult, Pet, PetRepository,
    PetSummary, UpdatePetDto,
};
use crate::shared::validations::{optional_text, require_text};

const MAX_WEIGHT_KG: f64 = 500.0;

pub struct PetService {
    repo: Arc<dyn PetRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl PetService {
    pub fn new(repo: Arc<dyn PetRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { repo, clients }
    }

    /// Register a pet for an existing client. Nothing is written when the
    /// owner does not exist.
    pub async fn create_pet(&self, dto: CreatePetDto) -> DomainResult<Pet> {
        let name = require_text("Name", &dto.name, 50)?;
        validate_weight(dto.weight)?;
        validate_birth_date(dto.birth_date)?;
        let microchip_number = optional_text(dto.microchip_number);

        self.require_client(dto.client_id).await?;
        self.ensure_microchip_free(None, microchip_number.as_deref())
            .await?;

        let pet = self
            .repo
            .create(CreatePetDto {
                name,
                breed: optional_text(dto.breed),
                color: optional_text(dto.color),
                microchip_number,
                ..dto
            })
            .await?;

        info!(pet_id = pet.id, client_id = pet.client_id, species = %pet.species, "Pet registered");
        Ok(pet)
    }

    pub async fn get_pet_by_id(&self, id: i32) -> DomainResult<Option<Pet>> {
        self.repo.find_by_id(id).await
    }

    pub async fn get_all_pets(&self, active_only: bool) -> DomainResult<Vec<Pet>> {
        self.repo.find_all(active_only).await
    }

    /// Pets paired with their owners, for listings
    pub async fn get_pets_with_owners(&self, active_only: bool) -> DomainResult<Vec<PetSummary>> {
        let pets = self.repo.find_all(active_only).await?;
        self.attach_owners(pets).await
    }

    pub async fn get_pets_by_client(&self, client_id: i32, active_only: bool) -> DomainResult<Vec<Pet>> {
        self.require_client(client_id).await?;
        self.repo.find_by_client(client_id, active_only).await
    }

    pub async fn update_pet(&self, id: i32, dto: UpdatePetDto) -> DomainResult<Pet> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("Pet", id));
        }

        let name = dto
            .name
            .map(|v| require_text("Name", &v, 50))
            .transpose()?;
        validate_weight(dto.weight)?;
        validate_birth_date(dto.birth_date)?;
        let microchip_number = optional_text(dto.microchip_number);
        self.ensure_microchip_free(Some(id), microchip_number.as_deref())
            .await?;

        self.repo
            .update(
                id,
                UpdatePetDto {
                    name,
                    breed: optional_text(dto.breed),
                    color: optional_text(dto.color),
                    microchip_number,
                    ..dto
                },
            )
            .await?
            .ok_or_else(|| DomainError::not_found("Pet", id))
    }

    /// Soft delete: the pet stays on record but leaves listings and search
    pub async fn deactivate_pet(&self, id: i32) -> DomainResult<()> {
        self.set_active(id, false).await
    }

    pub async fn activate_pet(&self, id: i32) -> DomainResult<()> {
        self.set_active(id, true).await
    }

    /// Hard delete, removing the pet's appointments as well
    pub async fn delete_pet(&self, id: i32) -> DomainResult<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found("Pet", id));
        }
        info!(pet_id = id, "Pet deleted");
        Ok(())
    }

    pub async fn get_pet_summary(&self, id: i32) -> DomainResult<PetSummary> {
        let pet = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Pet", id))?;
        let owner = self.clients.find_by_id(pet.client_id).await?;
        let age_years = pet.age_in_years(Utc::now().date_naive());

        Ok(PetSummary {
            pet,
            owner,
            age_years,
        })
    }

    /// Active pets matching `query`, best matches first: exact name, then
    /// name prefix, then any other match. Ties are ordered by name.
    pub async fn search_pets(&self, query: &str) -> DomainResult<Vec<Pet>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut pets = self.repo.search(query).await?;
        let needle = query.to_lowercase();
        pets.sort_by(|a, b| {
            match_rank(&a.name, &needle)
                .cmp(&match_rank(&b.name, &needle))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(pets)
    }

    /// Ranked search with owners attached, capped at `limit`
    pub async fn search_pets_with_owners(
        &self,
        query: &str,
        limit: usize,
    ) -> DomainResult<Vec<PetSummary>> {
        let mut pets = self.search_pets(query).await?;
        pets.truncate(limit);
        self.attach_owners(pets).await
    }

    async fn attach_owners(&self, pets: Vec<Pet>) -> DomainResult<Vec<PetSummary>> {
        let owners: HashMap<i32, Client> = self
            .clients
            .find_all()
            .await?
            .into_iter()
            .map(|client| (client.id, client))
            .collect();
        let today = Utc::now().date_naive();

        Ok(pets
            .into_iter()
            .map(|pet| PetSummary {
                owner: owners.get(&pet.client_id).cloned(),
                age_years: pet.age_in_years(today),
                pet,
            })
            .collect())
    }

    async fn set_active(&self, id: i32, active: bool) -> DomainResult<()> {
        if !self.repo.set_active(id, active).await? {
            return Err(DomainError::not_found("Pet", id));
        }
        info!(pet_id = id, active, "Pet active flag changed");
        Ok(())
    }

    async fn require_client(&self, client_id: i32) -> DomainResult<()> {
        match self.clients.find_by_id(client_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Client", client_id)),
        }
    }

    async fn ensure_microchip_free(&self, id: Option<i32>, microchip: Option<&str>) -> DomainResult<()> {
        let Some(microchip) = microchip else {
            return Ok(());
        };
        match self.repo.find_by_microchip(microchip).await? {
            Some(other) if Some(other.id) != id => Err(DomainError::Conflict(format!(
                "Microchip number {} is already registered",
                microchip
            ))),
            _ => Ok(()),
        }
    }
}

/// 0 = exact name, 1 = name prefix, 2 = anything else
fn match_rank(name: &str, needle: &str) -> u8 {
    let name = name.to_lowercase();
    if name == needle {
        0
    } else if name.starts_with(needle) {
        1
    } else {
        2
    }
}

fn validate_weight(weight: Option<f64>) -> DomainResult<()> {
    match weight {
        Some(w) if !(w > 0.0 && w <= MAX_WEIGHT_KG) => Err(DomainError::Validation(format!(
            "Weight must be greater than 0 and at most {} kg",
            MAX_WEIGHT_KG
        ))),
        _ => Ok(()),
    }
}

fn validate_birth_date(birth_date: Option<NaiveDate>) -> DomainResult<()> {
    match birth_date {
        Some(date) if date > Utc::now().date_naive() => Err(DomainError::Validation(
            "Birth date cannot be in the future".into(),
        )),
        _ => Ok(()),
    }
}
