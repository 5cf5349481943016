use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::{db_err, write_err};
use crate::domain::{
    CreatePetDto, DomainError, DomainResult, Pet, PetGender, PetRepository, PetSpecies,
    UpdatePetDto,
};
use crate::infrastructure::database::entities::{appointment, pet};

pub struct SeaOrmPetRepository {
    db: DatabaseConnection,
}

impl SeaOrmPetRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> DomainResult<Option<pet::Model>> {
        pet::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn pet_model_to_domain(model: pet::Model) -> DomainResult<Pet> {
    let species: PetSpecies = model
        .species
        .parse()
        .map_err(|_| DomainError::Database(format!("Unknown species '{}' stored", model.species)))?;
    let gender: PetGender = model
        .gender
        .parse()
        .map_err(|_| DomainError::Database(format!("Unknown gender '{}' stored", model.gender)))?;

    Ok(Pet {
        id: model.id,
        name: model.name,
        species,
        breed: model.breed,
        birth_date: model.birth_date,
        gender,
        color: model.color,
        weight: model.weight,
        microchip_number: model.microchip_number,
        client_id: model.client_id,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn models_to_domain(models: Vec<pet::Model>) -> DomainResult<Vec<Pet>> {
    models.into_iter().map(pet_model_to_domain).collect()
}

const DUPLICATE_MICROCHIP: &str = "Microchip number already registered";

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl PetRepository for SeaOrmPetRepository {
    async fn create(&self, dto: CreatePetDto) -> DomainResult<Pet> {
        debug!("Creating pet '{}' for client {}", dto.name, dto.client_id);
        let now = Utc::now();

        let model = pet::ActiveModel {
            id: NotSet,
            name: Set(dto.name),
            species: Set(dto.species.as_str().to_string()),
            breed: Set(dto.breed),
            birth_date: Set(dto.birth_date),
            gender: Set(dto.gender.as_str().to_string()),
            color: Set(dto.color),
            weight: Set(dto.weight),
            microchip_number: Set(dto.microchip_number),
            client_id: Set(dto.client_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_err(e, DUPLICATE_MICROCHIP))?;

        pet_model_to_domain(model)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Pet>> {
        self.find_model(id).await?.map(pet_model_to_domain).transpose()
    }

    async fn find_all(&self, active_only: bool) -> DomainResult<Vec<Pet>> {
        let mut query = pet::Entity::find();
        if active_only {
            query = query.filter(pet::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(pet::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models_to_domain(models)
    }

    async fn find_by_client(&self, client_id: i32, active_only: bool) -> DomainResult<Vec<Pet>> {
        let mut query = pet::Entity::find().filter(pet::Column::ClientId.eq(client_id));
        if active_only {
            query = query.filter(pet::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(pet::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models_to_domain(models)
    }

    async fn find_by_microchip(&self, microchip_number: &str) -> DomainResult<Option<Pet>> {
        pet::Entity::find()
            .filter(pet::Column::MicrochipNumber.eq(microchip_number))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(pet_model_to_domain)
            .transpose()
    }

    async fn search(&self, query: &str) -> DomainResult<Vec<Pet>> {
        let models = pet::Entity::find()
            .filter(pet::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(pet::Column::Name.contains(query))
                    .add(pet::Column::Breed.contains(query))
                    .add(pet::Column::MicrochipNumber.contains(query)),
            )
            .order_by_asc(pet::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models_to_domain(models)
    }

    async fn update(&self, id: i32, dto: UpdatePetDto) -> DomainResult<Option<Pet>> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: pet::ActiveModel = existing.into();

        if let Some(name) = dto.name {
            active.name = Set(name);
        }
        if let Some(species) = dto.species {
            active.species = Set(species.as_str().to_string());
        }
        if let Some(breed) = dto.breed {
            active.breed = Set(Some(breed));
        }
        if let Some(birth_date) = dto.birth_date {
            active.birth_date = Set(Some(birth_date));
        }
        if let Some(gender) = dto.gender {
            active.gender = Set(gender.as_str().to_string());
        }
        if let Some(color) = dto.color {
            active.color = Set(Some(color));
        }
        if let Some(weight) = dto.weight {
            active.weight = Set(Some(weight));
        }
        if let Some(microchip) = dto.microchip_number {
            active.microchip_number = Set(Some(microchip));
        }
        if let Some(is_active) = dto.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, DUPLICATE_MICROCHIP))?;

        pet_model_to_domain(updated).map(Some)
    }

    async fn set_active(&self, id: i32, is_active: bool) -> DomainResult<bool> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(false);
        };

        let mut active: pet::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        Ok(true)
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;

        appointment::Entity::delete_many()
            .filter(appointment::Column::PetId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = pet::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }
}
