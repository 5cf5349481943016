pub mod appointments;
pub mod auth;
pub mod clients;
pub mod health;
pub mod metrics;
pub mod pets;
pub mod request_id;
pub mod users;
