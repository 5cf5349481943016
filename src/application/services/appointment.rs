//! Appointment scheduling and status lifecycle

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::domain::{
    Appointment, AppointmentRepository, AppointmentStatus, CreateAppointmentDto, DomainError,
    DomainResult, PetRepository, UpdateAppointmentDto, UserRepository,
};
use crate::shared::validations::optional_text;

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 240;
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

pub struct AppointmentService {
    repo: Arc<dyn AppointmentRepository>,
    pets: Arc<dyn PetRepository>,
    users: Arc<dyn UserRepository>,
}

impl AppointmentService {
    pub fn new(
        repo: Arc<dyn AppointmentRepository>,
        pets: Arc<dyn PetRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { repo, pets, users }
    }

    pub async fn create_appointment(&self, dto: CreateAppointmentDto) -> DomainResult<Appointment> {
        validate_duration(dto.duration_minutes)?;

        match self.pets.find_by_id(dto.pet_id).await? {
            Some(pet) if pet.is_active => {}
            Some(_) => {
                return Err(DomainError::Validation(format!(
                    "Pet {} is inactive",
                    dto.pet_id
                )))
            }
            None => return Err(DomainError::not_found("Pet", dto.pet_id)),
        }

        if let Some(vet_id) = dto.veterinarian_id {
            self.require_veterinarian(vet_id).await?;
            self.ensure_slot_free(vet_id, dto.appointment_date, dto.duration_minutes, None)
                .await?;
        }
        if let Some(creator) = dto.created_by {
            if self.users.find_by_id(creator).await?.is_none() {
                return Err(DomainError::not_found("User", creator));
            }
        }

        let appointment = self
            .repo
            .create(CreateAppointmentDto {
                reason: optional_text(dto.reason),
                notes: optional_text(dto.notes),
                ..dto
            })
            .await?;

        info!(
            appointment_id = appointment.id,
            pet_id = appointment.pet_id,
            veterinarian_id = ?appointment.veterinarian_id,
            date = %appointment.appointment_date,
            "Appointment scheduled"
        );
        Ok(appointment)
    }

    pub async fn get_appointment_by_id(&self, id: i32) -> DomainResult<Option<Appointment>> {
        self.repo.find_by_id(id).await
    }

    /// Newest first
    pub async fn get_appointments_by_pet(&self, pet_id: i32) -> DomainResult<Vec<Appointment>> {
        self.repo.find_by_pet(pet_id).await
    }

    pub async fn get_appointments_by_veterinarian(
        &self,
        veterinarian_id: i32,
    ) -> DomainResult<Vec<Appointment>> {
        self.repo.find_by_veterinarian(veterinarian_id).await
    }

    /// Appointments starting in `[from, to)`
    pub async fn get_appointments_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        if to <= from {
            return Err(DomainError::Validation(
                "End of range must be after its start".into(),
            ));
        }
        self.repo.find_by_date_range(from, to).await
    }

    /// Reschedule or edit an open appointment
    pub async fn update_appointment(
        &self,
        id: i32,
        dto: UpdateAppointmentDto,
    ) -> DomainResult<Appointment> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", id))?;

        if existing.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "Appointment {} is {} and can no longer be changed",
                id, existing.status
            )));
        }

        if let Some(minutes) = dto.duration_minutes {
            validate_duration(minutes)?;
        }
        if let Some(vet_id) = dto.veterinarian_id {
            self.require_veterinarian(vet_id).await?;
        }

        let vet = dto.veterinarian_id.or(existing.veterinarian_id);
        let start = dto.appointment_date.unwrap_or(existing.appointment_date);
        let minutes = dto.duration_minutes.unwrap_or(existing.duration_minutes);
        if let Some(vet_id) = vet {
            self.ensure_slot_free(vet_id, start, minutes, Some(id)).await?;
        }

        self.repo
            .update(
                id,
                UpdateAppointmentDto {
                    reason: optional_text(dto.reason),
                    notes: optional_text(dto.notes),
                    ..dto
                },
            )
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", id))
    }

    /// Move an appointment along its lifecycle
    pub async fn change_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> DomainResult<Appointment> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", id))?;

        let next = existing.status.transition_to(status)?;
        let updated = self
            .repo
            .update_status(id, next)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", id))?;

        info!(appointment_id = id, from = %existing.status, to = %next, "Appointment status changed");
        Ok(updated)
    }

    pub async fn confirm(&self, id: i32) -> DomainResult<Appointment> {
        self.change_status(id, AppointmentStatus::Confirmed).await
    }

    pub async fn start(&self, id: i32) -> DomainResult<Appointment> {
        self.change_status(id, AppointmentStatus::InProgress).await
    }

    pub async fn complete(&self, id: i32) -> DomainResult<Appointment> {
        self.change_status(id, AppointmentStatus::Completed).await
    }

    pub async fn cancel(&self, id: i32) -> DomainResult<Appointment> {
        self.change_status(id, AppointmentStatus::Cancelled).await
    }

    pub async fn mark_no_show(&self, id: i32) -> DomainResult<Appointment> {
        self.change_status(id, AppointmentStatus::NoShow).await
    }

    async fn require_veterinarian(&self, id: i32) -> DomainResult<()> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        if !user.is_active || !user.is_veterinarian() {
            return Err(DomainError::Validation(format!(
                "User {} is not an active veterinarian",
                id
            )));
        }
        Ok(())
    }

    /// Reject a slot that intersects another open appointment of the same vet
    async fn ensure_slot_free(
        &self,
        veterinarian_id: i32,
        start: DateTime<Utc>,
        minutes: i32,
        ignore: Option<i32>,
    ) -> DomainResult<()> {
        // Anything starting earlier than this cannot reach `start`
        let window_start = start - Duration::minutes(i64::from(MAX_DURATION_MINUTES));
        let window_end = start + Duration::minutes(i64::from(minutes));

        let candidates = self
            .repo
            .find_for_veterinarian_between(veterinarian_id, window_start, window_end)
            .await?;

        let clash = candidates.iter().find(|a| {
            Some(a.id) != ignore && !a.status.is_terminal() && a.overlaps(start, minutes)
        });

        match clash {
            Some(other) => Err(DomainError::Conflict(format!(
                "Veterinarian {} already has appointment {} at {}",
                veterinarian_id, other.id, other.appointment_date
            ))),
            None => Ok(()),
        }
    }
}

fn validate_duration(minutes: i32) -> DomainResult<()> {
    if (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Duration must be between {} and {} minutes",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AppointmentType, ClientRepository, CreateClientDto, CreatePetDto, CreateUserDto,
        UserRole,
    };
    use crate::infrastructure::database::repositories::{
        SeaOrmAppointmentRepository, SeaOrmClientRepository, SeaOrmPetRepository,
        SeaOrmUserRepository,
    };
    use crate::infrastructure::database::test_database;
    use chrono::TimeZone;

    struct Fixture {
        svc: AppointmentService,
        pets: Arc<SeaOrmPetRepository>,
        pet_id: i32,
        vet_id: i32,
        receptionist_id: i32,
    }

    async fn fixture() -> Fixture {
        let db = test_database().await;
        let clients = SeaOrmClientRepository::new(db.clone());
        let pets = Arc::new(SeaOrmPetRepository::new(db.clone()));
        let users = Arc::new(SeaOrmUserRepository::new(db.clone()));

        let client = clients
            .create(CreateClientDto {
                first_name: "Ana".into(),
                last_name: "Garcia".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let pet = pets
            .create(CreatePetDto {
                name: "Rex".into(),
                client_id: client.id,
                ..Default::default()
            })
            .await
            .unwrap();

        let staff = |username: &str, role| CreateUserDto {
            username: username.into(),
            email: format!("{username}@vetcare.com"),
            password_hash: "x".into(),
            role,
            first_name: "Staff".into(),
            last_name: username.into(),
        };
        let vet = users.create(staff("drsmith", UserRole::Veterinarian)).await.unwrap();
        let desk = users.create(staff("desk", UserRole::Receptionist)).await.unwrap();

        let svc = AppointmentService::new(
            Arc::new(SeaOrmAppointmentRepository::new(db)),
            pets.clone(),
            users,
        );

        Fixture {
            svc,
            pets,
            pet_id: pet.id,
            vet_id: vet.id,
            receptionist_id: desk.id,
        }
    }

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    fn booking(f: &Fixture, start: DateTime<Utc>) -> CreateAppointmentDto {
        CreateAppointmentDto {
            pet_id: f.pet_id,
            veterinarian_id: Some(f.vet_id),
            created_by: Some(f.receptionist_id),
            appointment_date: start,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            appointment_type: AppointmentType::Vaccination,
            reason: Some("Annual shots".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let f = fixture().await;
        let appt = f.svc.create_appointment(booking(&f, nine_am())).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);

        f.svc.confirm(appt.id).await.unwrap();
        f.svc.start(appt.id).await.unwrap();
        let done = f.svc.complete(appt.id).await.unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);

        let again = f.svc.cancel(appt.id).await;
        assert!(matches!(again, Err(DomainError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn cannot_skip_or_repeat_states() {
        let f = fixture().await;
        let appt = f.svc.create_appointment(booking(&f, nine_am())).await.unwrap();

        let skip = f.svc.complete(appt.id).await;
        assert!(matches!(skip, Err(DomainError::InvalidTransition { .. })));
        let same = f
            .svc
            .change_status(appt.id, AppointmentStatus::Scheduled)
            .await;
        assert!(matches!(same, Err(DomainError::InvalidTransition { .. })));

        let no_show = f.svc.mark_no_show(appt.id).await.unwrap();
        assert_eq!(no_show.status, AppointmentStatus::NoShow);
    }

    #[tokio::test]
    async fn overlapping_slot_for_same_vet_is_conflict() {
        let f = fixture().await;
        f.svc.create_appointment(booking(&f, nine_am())).await.unwrap();

        let overlap = f
            .svc
            .create_appointment(booking(&f, nine_am() + Duration::minutes(15)))
            .await;
        assert!(matches!(overlap, Err(DomainError::Conflict(_))));

        // Back-to-back is fine
        let next = f
            .svc
            .create_appointment(booking(&f, nine_am() + Duration::minutes(30)))
            .await;
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn cancelled_slot_can_be_rebooked() {
        let f = fixture().await;
        let first = f.svc.create_appointment(booking(&f, nine_am())).await.unwrap();
        f.svc.cancel(first.id).await.unwrap();

        assert!(f.svc.create_appointment(booking(&f, nine_am())).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_invalid_references_and_durations() {
        let f = fixture().await;

        let short = f
            .svc
            .create_appointment(CreateAppointmentDto {
                duration_minutes: 10,
                ..booking(&f, nine_am())
            })
            .await;
        assert!(matches!(short, Err(DomainError::Validation(_))));

        let not_a_vet = f
            .svc
            .create_appointment(CreateAppointmentDto {
                veterinarian_id: Some(f.receptionist_id),
                ..booking(&f, nine_am())
            })
            .await;
        assert!(matches!(not_a_vet, Err(DomainError::Validation(_))));

        let no_pet = f
            .svc
            .create_appointment(CreateAppointmentDto {
                pet_id: 999,
                ..booking(&f, nine_am())
            })
            .await;
        assert!(matches!(no_pet, Err(DomainError::NotFound { entity: "Pet", .. })));

        f.pets.set_active(f.pet_id, false).await.unwrap();
        let inactive = f.svc.create_appointment(booking(&f, nine_am())).await;
        assert!(matches!(inactive, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn reschedule_checks_overlap_but_ignores_itself() {
        let f = fixture().await;
        let first = f.svc.create_appointment(booking(&f, nine_am())).await.unwrap();
        let second = f
            .svc
            .create_appointment(booking(&f, nine_am() + Duration::hours(1)))
            .await
            .unwrap();

        let longer = f
            .svc
            .update_appointment(
                first.id,
                UpdateAppointmentDto {
                    duration_minutes: Some(45),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(longer.duration_minutes, 45);
        assert_eq!(longer.reason.as_deref(), Some("Annual shots"));

        let clash = f
            .svc
            .update_appointment(
                second.id,
                UpdateAppointmentDto {
                    appointment_date: Some(nine_am() + Duration::minutes(30)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn queries_by_pet_vet_and_range() {
        let f = fixture().await;
        for hours in [0, 2, 26] {
            f.svc
                .create_appointment(booking(&f, nine_am() + Duration::hours(hours)))
                .await
                .unwrap();
        }

        let history = f.svc.get_appointments_by_pet(f.pet_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[0].appointment_date > history[1].appointment_date);

        assert_eq!(
            f.svc
                .get_appointments_by_veterinarian(f.vet_id)
                .await
                .unwrap()
                .len(),
            3
        );

        let day = f
            .svc
            .get_appointments_between(nine_am(), nine_am() + Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(day.len(), 2);

        let backwards = f
            .svc
            .get_appointments_between(nine_am(), nine_am())
            .await;
        assert!(matches!(backwards, Err(DomainError::Validation(_))));
    }
}
