//! # VetCare
//!
//! Veterinary clinic management: staff accounts, clients, their pets and
//! appointments, served as a JSON REST API.
//!
//! ## Architecture
//!
//! - **domain**: entities, DTOs and repository traits
//! - **application**: services and the composition root ([`Container`])
//! - **infrastructure**: SeaORM persistence, password hashing, JWT
//! - **interfaces**: axum REST API with Swagger documentation
//! - **server**: runtime lifecycle shared by the CLI binary

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError, Profile};

pub use application::{Container, ContainerError};

pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::http::create_api_router;
