//! Appointment domain entity and status lifecycle

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentType {
    Consultation,
    Vaccination,
    Surgery,
    Emergency,
    FollowUp,
    Grooming,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 6] = [
        AppointmentType::Consultation,
        AppointmentType::Vaccination,
        AppointmentType::Surgery,
        AppointmentType::Emergency,
        AppointmentType::FollowUp,
        AppointmentType::Grooming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consultation => "consultation",
            Self::Vaccination => "vaccination",
            Self::Surgery => "surgery",
            Self::Emergency => "emergency",
            Self::FollowUp => "follow_up",
            Self::Grooming => "grooming",
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Invalid appointment type: {}", s)))
    }
}

/// Appointment status
///
/// ```text
/// scheduled -> confirmed -> in_progress -> completed
///     |            |
///     +------------+--> cancelled | no_show
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Scheduled | Confirmed, Cancelled)
                | (Scheduled | Confirmed, NoShow)
        )
    }

    /// Validate a transition, returning the target status
    pub fn transition_to(&self, next: AppointmentStatus) -> Result<AppointmentStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Invalid appointment status: {}", s)))
    }
}

/// Veterinary appointment for one pet
#[derive(Clone, Debug)]
pub struct Appointment {
    pub id: i32,
    pub pet_id: i32,
    pub veterinarian_id: Option<i32>,
    pub created_by: Option<i32>,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.appointment_date + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Whether this appointment's slot intersects `[start, start + minutes)`
    pub fn overlaps(&self, start: DateTime<Utc>, minutes: i32) -> bool {
        let end = start + Duration::minutes(i64::from(minutes));
        self.appointment_date < end && start < self.ends_at()
    }
}
