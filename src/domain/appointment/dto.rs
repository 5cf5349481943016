use chrono::{DateTime, Utc};

use super::AppointmentType;

#[derive(Debug, Clone)]
pub struct CreateAppointmentDto {
    pub pet_id: i32,
    pub veterinarian_id: Option<i32>,
    pub created_by: Option<i32>,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the column untouched. Status changes go
/// through the lifecycle instead.
#[derive(Debug, Clone, Default)]
pub struct UpdateAppointmentDto {
    pub veterinarian_id: Option<i32>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<AppointmentType>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}
