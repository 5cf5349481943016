use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Select, Set,
};

use super::db_err;
use crate::domain::{
    Appointment, AppointmentRepository, AppointmentStatus, AppointmentType, CreateAppointmentDto,
    DomainError, DomainResult, UpdateAppointmentDto,
};
use crate::infrastructure::database::entities::appointment;

pub struct SeaOrmAppointmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmAppointmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> DomainResult<Option<appointment::Model>> {
        appointment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn fetch(&self, query: Select<appointment::Entity>) -> DomainResult<Vec<Appointment>> {
        let models = query.all(&self.db).await.map_err(db_err)?;
        models.into_iter().map(appointment_model_to_domain).collect()
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn appointment_model_to_domain(model: appointment::Model) -> DomainResult<Appointment> {
    let appointment_type: AppointmentType = model.appointment_type.parse().map_err(|_| {
        DomainError::Database(format!(
            "Unknown appointment type '{}' stored",
            model.appointment_type
        ))
    })?;
    let status: AppointmentStatus = model.status.parse().map_err(|_| {
        DomainError::Database(format!("Unknown appointment status '{}' stored", model.status))
    })?;

    Ok(Appointment {
        id: model.id,
        pet_id: model.pet_id,
        veterinarian_id: model.veterinarian_id,
        created_by: model.created_by,
        appointment_date: model.appointment_date,
        duration_minutes: model.duration_minutes,
        appointment_type,
        status,
        reason: model.reason,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn in_range(
    query: Select<appointment::Entity>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Select<appointment::Entity> {
    query
        .filter(appointment::Column::AppointmentDate.gte(from))
        .filter(appointment::Column::AppointmentDate.lt(to))
        .order_by_asc(appointment::Column::AppointmentDate)
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl AppointmentRepository for SeaOrmAppointmentRepository {
    async fn create(&self, dto: CreateAppointmentDto) -> DomainResult<Appointment> {
        debug!(
            "Creating appointment for pet {} at {}",
            dto.pet_id, dto.appointment_date
        );
        let now = Utc::now();

        let model = appointment::ActiveModel {
            id: NotSet,
            pet_id: Set(dto.pet_id),
            veterinarian_id: Set(dto.veterinarian_id),
            created_by: Set(dto.created_by),
            appointment_date: Set(dto.appointment_date),
            duration_minutes: Set(dto.duration_minutes),
            appointment_type: Set(dto.appointment_type.as_str().to_string()),
            status: Set(AppointmentStatus::Scheduled.as_str().to_string()),
            reason: Set(dto.reason),
            notes: Set(dto.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        appointment_model_to_domain(model)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Appointment>> {
        self.find_model(id)
            .await?
            .map(appointment_model_to_domain)
            .transpose()
    }

    async fn find_by_pet(&self, pet_id: i32) -> DomainResult<Vec<Appointment>> {
        self.fetch(
            appointment::Entity::find()
                .filter(appointment::Column::PetId.eq(pet_id))
                .order_by_desc(appointment::Column::AppointmentDate),
        )
        .await
    }

    async fn find_by_veterinarian(&self, veterinarian_id: i32) -> DomainResult<Vec<Appointment>> {
        self.fetch(
            appointment::Entity::find()
                .filter(appointment::Column::VeterinarianId.eq(veterinarian_id))
                .order_by_asc(appointment::Column::AppointmentDate),
        )
        .await
    }

    async fn find_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        self.fetch(in_range(appointment::Entity::find(), from, to))
            .await
    }

    async fn find_for_veterinarian_between(
        &self,
        veterinarian_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        let query = appointment::Entity::find()
            .filter(appointment::Column::VeterinarianId.eq(veterinarian_id));
        self.fetch(in_range(query, from, to)).await
    }

    async fn update(&self, id: i32, dto: UpdateAppointmentDto) -> DomainResult<Option<Appointment>> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: appointment::ActiveModel = existing.into();

        if let Some(vet) = dto.veterinarian_id {
            active.veterinarian_id = Set(Some(vet));
        }
        if let Some(date) = dto.appointment_date {
            active.appointment_date = Set(date);
        }
        if let Some(minutes) = dto.duration_minutes {
            active.duration_minutes = Set(minutes);
        }
        if let Some(kind) = dto.appointment_type {
            active.appointment_type = Set(kind.as_str().to_string());
        }
        if let Some(reason) = dto.reason {
            active.reason = Set(Some(reason));
        }
        if let Some(notes) = dto.notes {
            active.notes = Set(Some(notes));
        }

        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        appointment_model_to_domain(updated).map(Some)
    }

    async fn update_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> DomainResult<Option<Appointment>> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(None);
        };

        debug!("Appointment {}: {} -> {}", id, existing.status, status);

        let mut active: appointment::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        appointment_model_to_domain(updated).map(Some)
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let result = appointment::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientRepository, CreateClientDto, CreatePetDto, PetRepository};
    use crate::infrastructure::database::repositories::{
        SeaOrmClientRepository, SeaOrmPetRepository,
    };
    use crate::infrastructure::database::test_database;
    use chrono::{Duration, TimeZone};

    async fn setup() -> (SeaOrmAppointmentRepository, i32) {
        let db = test_database().await;
        let client = SeaOrmClientRepository::new(db.clone())
            .create(CreateClientDto {
                first_name: "Ana".into(),
                last_name: "Garcia".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let pet = SeaOrmPetRepository::new(db.clone())
            .create(CreatePetDto {
                name: "Rex".into(),
                client_id: client.id,
                ..Default::default()
            })
            .await
            .unwrap();
        (SeaOrmAppointmentRepository::new(db), pet.id)
    }

    fn at(pet_id: i32, date: DateTime<Utc>) -> CreateAppointmentDto {
        CreateAppointmentDto {
            pet_id,
            veterinarian_id: None,
            created_by: None,
            appointment_date: date,
            duration_minutes: 30,
            appointment_type: AppointmentType::Consultation,
            reason: Some("Checkup".into()),
            notes: None,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn new_appointments_start_scheduled() {
        let (repo, pet_id) = setup().await;
        let created = repo.create(at(pet_id, base())).await.unwrap();

        assert_eq!(created.status, AppointmentStatus::Scheduled);
        assert_eq!(created.appointment_type, AppointmentType::Consultation);
    }

    #[tokio::test]
    async fn by_pet_is_newest_first_and_range_is_half_open() {
        let (repo, pet_id) = setup().await;
        for days in 0..3 {
            repo.create(at(pet_id, base() + Duration::days(days)))
                .await
                .unwrap();
        }

        let history = repo.find_by_pet(pet_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[0].appointment_date > history[2].appointment_date);

        let range = repo
            .find_by_date_range(base(), base() + Duration::days(2))
            .await
            .unwrap();
        assert_eq!(range.len(), 2);
        assert!(range[0].appointment_date < range[1].appointment_date);
    }

    #[tokio::test]
    async fn update_status_persists() {
        let (repo, pet_id) = setup().await;
        let created = repo.create(at(pet_id, base())).await.unwrap();

        let confirmed = repo
            .update_status(created.id, AppointmentStatus::Confirmed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        assert!(repo
            .update_status(404, AppointmentStatus::Confirmed)
            .await
            .unwrap()
            .is_none());

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }
}
