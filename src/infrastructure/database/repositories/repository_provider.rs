//! SeaORM-backed `RepositoryProvider`

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    SeaOrmAppointmentRepository, SeaOrmClientRepository, SeaOrmPetRepository,
    SeaOrmUserRepository,
};
use crate::domain::{
    AppointmentRepository, ClientRepository, PetRepository, RepositoryProvider, UserRepository,
};

/// Builds repositories over one shared connection pool
#[derive(Clone)]
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn user_repository(&self) -> Arc<dyn UserRepository> {
        Arc::new(SeaOrmUserRepository::new(self.db.clone()))
    }

    fn client_repository(&self) -> Arc<dyn ClientRepository> {
        Arc::new(SeaOrmClientRepository::new(self.db.clone()))
    }

    fn pet_repository(&self) -> Arc<dyn PetRepository> {
        Arc::new(SeaOrmPetRepository::new(self.db.clone()))
    }

    fn appointment_repository(&self) -> Arc<dyn AppointmentRepository> {
        Arc::new(SeaOrmAppointmentRepository::new(self.db.clone()))
    }
}
