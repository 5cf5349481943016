//! Client (pet owner) management

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    Client, ClientRepository, ClientSummary, CreateClientDto, DomainError, DomainResult,
    UpdateClientDto,
};
use crate::shared::validations::{optional_text, require_text, validate_email};

pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_client(&self, dto: CreateClientDto) -> DomainResult<Client> {
        let first_name = require_text("First name", &dto.first_name, 50)?;
        let last_name = require_text("Last name", &dto.last_name, 50)?;
        let email = normalize_email(dto.email)?;
        let identification_number = optional_text(dto.identification_number);

        self.ensure_unique(None, email.as_deref(), identification_number.as_deref())
            .await?;

        let client = self
            .repo
            .create(CreateClientDto {
                first_name,
                last_name,
                email,
                phone: optional_text(dto.phone),
                address: optional_text(dto.address),
                identification_number,
            })
            .await?;

        info!(client_id = client.id, "Client created");
        Ok(client)
    }

    pub async fn get_client_by_id(&self, id: i32) -> DomainResult<Option<Client>> {
        self.repo.find_by_id(id).await
    }

    pub async fn get_all_clients(&self) -> DomainResult<Vec<Client>> {
        self.repo.find_all().await
    }

    /// Blank queries list every client
    pub async fn search_clients(&self, query: &str) -> DomainResult<Vec<Client>> {
        let query = query.trim();
        if query.is_empty() {
            return self.repo.find_all().await;
        }
        self.repo.search(query).await
    }

    pub async fn update_client(&self, id: i32, dto: UpdateClientDto) -> DomainResult<Client> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("Client", id));
        }

        let first_name = dto
            .first_name
            .map(|v| require_text("First name", &v, 50))
            .transpose()?;
        let last_name = dto
            .last_name
            .map(|v| require_text("Last name", &v, 50))
            .transpose()?;
        let email = normalize_email(dto.email)?;
        let identification_number = optional_text(dto.identification_number);

        self.ensure_unique(Some(id), email.as_deref(), identification_number.as_deref())
            .await?;

        self.repo
            .update(
                id,
                UpdateClientDto {
                    first_name,
                    last_name,
                    email,
                    phone: optional_text(dto.phone),
                    address: optional_text(dto.address),
                    identification_number,
                },
            )
            .await?
            .ok_or_else(|| DomainError::not_found("Client", id))
    }

    /// Delete the client together with all of its pets and their appointments
    pub async fn delete_client(&self, id: i32) -> DomainResult<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found("Client", id));
        }
        info!(client_id = id, "Client deleted with its pets");
        Ok(())
    }

    pub async fn get_client_summary(&self, id: i32) -> DomainResult<ClientSummary> {
        let client = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", id))?;
        let (pet_count, active_pet_count) = self.repo.count_pets(id).await?;

        Ok(ClientSummary {
            client,
            pet_count,
            active_pet_count,
        })
    }

    pub async fn client_count(&self) -> DomainResult<u64> {
        self.repo.count().await
    }

    async fn ensure_unique(
        &self,
        id: Option<i32>,
        email: Option<&str>,
        identification_number: Option<&str>,
    ) -> DomainResult<()> {
        let is_other = |client: &Client| Some(client.id) != id;

        if let Some(email) = email {
            if self.repo.find_by_email(email).await?.filter(is_other).is_some() {
                return Err(DomainError::Conflict(format!(
                    "A client with email {} already exists",
                    email
                )));
            }
        }
        if let Some(number) = identification_number {
            if self
                .repo
                .find_by_identification_number(number)
                .await?
                .filter(is_other)
                .is_some()
            {
                return Err(DomainError::Conflict(format!(
                    "A client with identification number {} already exists",
                    number
                )));
            }
        }
        Ok(())
    }
}

fn normalize_email(email: Option<String>) -> DomainResult<Option<String>> {
    let Some(email) = optional_text(email) else {
        return Ok(None);
    };
    let email = email.to_lowercase();
    validate_email(&email)?;
    Ok(Some(email))
}
