use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{db_err, write_err};
use crate::domain::{Client, ClientRepository, CreateClientDto, DomainResult, UpdateClientDto};
use crate::infrastructure::database::entities::{appointment, client, pet};

pub struct SeaOrmClientRepository {
    db: DatabaseConnection,
}

impl SeaOrmClientRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn client_model_to_domain(model: client::Model) -> Client {
    Client {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        identification_number: model.identification_number,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

const DUPLICATE_CLIENT: &str = "Client email or identification number already exists";

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl ClientRepository for SeaOrmClientRepository {
    async fn create(&self, dto: CreateClientDto) -> DomainResult<Client> {
        debug!("Creating client: {} {}", dto.first_name, dto.last_name);
        let now = Utc::now();

        let model = client::ActiveModel {
            id: NotSet,
            first_name: Set(dto.first_name),
            last_name: Set(dto.last_name),
            email: Set(dto.email),
            phone: Set(dto.phone),
            address: Set(dto.address),
            identification_number: Set(dto.identification_number),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_err(e, DUPLICATE_CLIENT))?;

        Ok(client_model_to_domain(model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Client>> {
        let model = client::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(client_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Client>> {
        let model = client::Entity::find()
            .filter(client::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(client_model_to_domain))
    }

    async fn find_by_identification_number(&self, number: &str) -> DomainResult<Option<Client>> {
        let model = client::Entity::find()
            .filter(client::Column::IdentificationNumber.eq(number))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(client_model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Client>> {
        let models = client::Entity::find()
            .order_by_asc(client::Column::LastName)
            .order_by_asc(client::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(client_model_to_domain).collect())
    }

    async fn search(&self, query: &str) -> DomainResult<Vec<Client>> {
        let models = client::Entity::find()
            .filter(
                Condition::any()
                    .add(client::Column::FirstName.contains(query))
                    .add(client::Column::LastName.contains(query))
                    .add(client::Column::Email.contains(query))
                    .add(client::Column::Phone.contains(query))
                    .add(client::Column::IdentificationNumber.contains(query)),
            )
            .order_by_asc(client::Column::LastName)
            .order_by_asc(client::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(client_model_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        client::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn count_pets(&self, id: i32) -> DomainResult<(u64, u64)> {
        let all = pet::Entity::find()
            .filter(pet::Column::ClientId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let active = pet::Entity::find()
            .filter(pet::Column::ClientId.eq(id))
            .filter(pet::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok((all, active))
    }

    async fn update(&self, id: i32, dto: UpdateClientDto) -> DomainResult<Option<Client>> {
        let Some(existing) = client::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: client::ActiveModel = existing.into();

        if let Some(first_name) = dto.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = dto.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = dto.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = dto.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = dto.address {
            active.address = Set(Some(address));
        }
        if let Some(number) = dto.identification_number {
            active.identification_number = Set(Some(number));
        }

        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, DUPLICATE_CLIENT))?;

        Ok(Some(client_model_to_domain(updated)))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let pet_ids: Vec<i32> = pet::Entity::find()
            .select_only()
            .column(pet::Column::Id)
            .filter(pet::Column::ClientId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let appointments = appointment::Entity::delete_many()
            .filter(appointment::Column::PetId.is_in(pet_ids.clone()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        pet::Entity::delete_many()
            .filter(pet::Column::ClientId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = client::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        debug!(
            "Deleted client {} with {} pets and {} appointments",
            id,
            pet_ids.len(),
            appointments.rows_affected
        );

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::database::test_database;

    fn ana() -> CreateClientDto {
        CreateClientDto {
            first_name: "Ana".into(),
            last_name: "Garcia".into(),
            email: Some("ana@example.com".into()),
            phone: Some("555-0101".into()),
            identification_number: Some("ID-001".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_find_and_search() {
        let repo = SeaOrmClientRepository::new(test_database().await);
        let created = repo.create(ana()).await.unwrap();

        assert_eq!(created.full_name(), "Ana Garcia");
        assert!(repo.find_by_id(created.id).await.unwrap().is_some());
        assert!(repo
            .find_by_email("ana@example.com")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_identification_number("ID-001")
            .await
            .unwrap()
            .is_some());

        assert_eq!(repo.search("garc").await.unwrap().len(), 1);
        assert_eq!(repo.search("0101").await.unwrap().len(), 1);
        assert!(repo.search("nobody").await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repo = SeaOrmClientRepository::new(test_database().await);
        repo.create(ana()).await.unwrap();

        let err = repo
            .create(CreateClientDto {
                identification_number: None,
                ..ana()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_keeps_untouched_fields() {
        let repo = SeaOrmClientRepository::new(test_database().await);
        let created = repo.create(ana()).await.unwrap();

        let updated = repo
            .update(
                created.id,
                UpdateClientDto {
                    phone: Some("555-9999".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("555-9999"));
        assert_eq!(updated.email.as_deref(), Some("ana@example.com"));
        assert!(repo
            .update(404, UpdateClientDto::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_missing_client_returns_false() {
        let repo = SeaOrmClientRepository::new(test_database().await);
        assert!(!repo.delete(404).await.unwrap());
    }
}
