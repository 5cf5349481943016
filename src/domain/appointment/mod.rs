//! Appointment aggregate

pub mod model;
pub mod repository;

mod dto;

pub use dto::{CreateAppointmentDto, UpdateAppointmentDto};
pub use model::{Appointment, AppointmentStatus, AppointmentType};
pub use repository::AppointmentRepository;
