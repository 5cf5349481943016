//! Appointment DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::Appointment;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentDto {
    pub id: i32,
    pub pet_id: i32,
    pub veterinarian_id: Option<i32>,
    pub created_by: Option<i32>,
    pub appointment_date: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub duration_minutes: i32,
    /// consultation, vaccination, surgery, emergency, follow_up, grooming
    pub appointment_type: String,
    /// scheduled, confirmed, in_progress, completed, cancelled, no_show
    pub status: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            ends_at: a.ends_at(),
            id: a.id,
            pet_id: a.pet_id,
            veterinarian_id: a.veterinarian_id,
            created_by: a.created_by,
            appointment_date: a.appointment_date,
            duration_minutes: a.duration_minutes,
            appointment_type: a.appointment_type.as_str().to_string(),
            status: a.status.as_str().to_string(),
            reason: a.reason,
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAppointmentRequest {
    pub pet_id: i32,
    pub veterinarian_id: Option<i32>,
    pub appointment_date: DateTime<Utc>,
    /// Minutes, 15-240. Defaults to 30
    pub duration_minutes: Option<i32>,
    #[serde(default = "default_type")]
    pub appointment_type: String,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

fn default_type() -> String {
    "consultation".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointmentRequest {
    pub veterinarian_id: Option<i32>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<String>,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    /// Target status, e.g. `confirmed`
    pub status: String,
}

/// Filters are applied in this order: pet, veterinarian, date range.
/// Without any filter, today's appointments (UTC) are returned.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAppointmentsParams {
    pub pet_id: Option<i32>,
    pub veterinarian_id: Option<i32>,
    /// Inclusive start, RFC 3339
    pub from: Option<DateTime<Utc>>,
    /// Exclusive end, RFC 3339
    pub to: Option<DateTime<Utc>>,
}
