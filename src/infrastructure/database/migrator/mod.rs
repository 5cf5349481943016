//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_clients;
mod m20240101_000003_create_pets;
mod m20240101_000004_create_appointments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_clients::Migration),
            Box::new(m20240101_000003_create_pets::Migration),
            Box::new(m20240101_000004_create_appointments::Migration),
        ]
    }
}
