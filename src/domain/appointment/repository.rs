use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Appointment, AppointmentStatus, CreateAppointmentDto, UpdateAppointmentDto};
use crate::domain::DomainResult;

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, dto: CreateAppointmentDto) -> DomainResult<Appointment>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Appointment>>;
    /// Newest first
    async fn find_by_pet(&self, pet_id: i32) -> DomainResult<Vec<Appointment>>;
    async fn find_by_veterinarian(&self, veterinarian_id: i32) -> DomainResult<Vec<Appointment>>;
    /// Appointments starting in `[from, to)`, ordered by date
    async fn find_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>>;
    /// Same as `find_by_date_range`, restricted to one veterinarian
    async fn find_for_veterinarian_between(
        &self,
        veterinarian_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>>;

    async fn update(&self, id: i32, dto: UpdateAppointmentDto) -> DomainResult<Option<Appointment>>;
    async fn update_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> DomainResult<Option<Appointment>>;

    async fn delete(&self, id: i32) -> DomainResult<bool>;
}
