//! Composition root
//!
//! Builds every repository once, injects them into the services and hands
//! out shared references. The server creates one `Container` at startup and
//! passes it to the HTTP layer; there is no global instance.
//!
//! ```ignore
//! let container = Container::new(Arc::new(SeaOrmRepositoryProvider::new(db)), settings);
//! container.initialize();
//! let pets = container.pet_service()?;
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::services::{AppointmentService, AuthService, AuthSettings, ClientService, PetService};
use crate::domain::{
    AppointmentRepository, ClientRepository, PetRepository, RepositoryProvider, UserRepository,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("Container not initialized. Call initialize() first.")]
    Uninitialized,

    #[error("Repository '{name}' not found. Available: {}", .available.join(", "))]
    RepositoryNotFound { name: String, available: Vec<String> },

    #[error("Service '{name}' not found. Available: {}", .available.join(", "))]
    ServiceNotFound { name: String, available: Vec<String> },
}

// ── Registry keys ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryKind {
    User,
    Client,
    Pet,
    Appointment,
}

impl RepositoryKind {
    pub const ALL: [RepositoryKind; 4] = [
        RepositoryKind::User,
        RepositoryKind::Client,
        RepositoryKind::Pet,
        RepositoryKind::Appointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Client => "client",
            Self::Pet => "pet",
            Self::Appointment => "appointment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Auth,
    Client,
    Pet,
    Appointment,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Auth,
        ServiceKind::Client,
        ServiceKind::Pet,
        ServiceKind::Appointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Client => "client",
            Self::Pet => "pet",
            Self::Appointment => "appointment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn names<T: fmt::Display>(kinds: &[T]) -> Vec<String> {
    kinds.iter().map(ToString::to_string).collect()
}

// ── Handles returned by name lookup ─────────────────────────────

#[derive(Clone)]
pub enum RepositoryHandle {
    User(Arc<dyn UserRepository>),
    Client(Arc<dyn ClientRepository>),
    Pet(Arc<dyn PetRepository>),
    Appointment(Arc<dyn AppointmentRepository>),
}

impl RepositoryHandle {
    pub fn kind(&self) -> RepositoryKind {
        match self {
            Self::User(_) => RepositoryKind::User,
            Self::Client(_) => RepositoryKind::Client,
            Self::Pet(_) => RepositoryKind::Pet,
            Self::Appointment(_) => RepositoryKind::Appointment,
        }
    }

    /// Whether both handles point at the same instance
    pub fn same_instance(&self, other: &RepositoryHandle) -> bool {
        match (self, other) {
            (Self::User(a), Self::User(b)) => Arc::ptr_eq(a, b),
            (Self::Client(a), Self::Client(b)) => Arc::ptr_eq(a, b),
            (Self::Pet(a), Self::Pet(b)) => Arc::ptr_eq(a, b),
            (Self::Appointment(a), Self::Appointment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepositoryHandle({})", self.kind())
    }
}

#[derive(Clone)]
pub enum ServiceHandle {
    Auth(Arc<AuthService>),
    Client(Arc<ClientService>),
    Pet(Arc<PetService>),
    Appointment(Arc<AppointmentService>),
}

impl ServiceHandle {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Self::Auth(_) => ServiceKind::Auth,
            Self::Client(_) => ServiceKind::Client,
            Self::Pet(_) => ServiceKind::Pet,
            Self::Appointment(_) => ServiceKind::Appointment,
        }
    }

    pub fn same_instance(&self, other: &ServiceHandle) -> bool {
        match (self, other) {
            (Self::Auth(a), Self::Auth(b)) => Arc::ptr_eq(a, b),
            (Self::Client(a), Self::Client(b)) => Arc::ptr_eq(a, b),
            (Self::Pet(a), Self::Pet(b)) => Arc::ptr_eq(a, b),
            (Self::Appointment(a), Self::Appointment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceHandle({})", self.kind())
    }
}

/// Diagnostic snapshot of the container
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContainerHealth {
    pub initialized: bool,
    pub repositories_count: usize,
    pub services_count: usize,
    pub available_repositories: Vec<String>,
    pub available_services: Vec<String>,
}

// ── Container ───────────────────────────────────────────────────

struct Registry {
    users: Arc<dyn UserRepository>,
    clients: Arc<dyn ClientRepository>,
    pets: Arc<dyn PetRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    auth_service: Arc<AuthService>,
    client_service: Arc<ClientService>,
    pet_service: Arc<PetService>,
    appointment_service: Arc<AppointmentService>,
}

pub struct Container {
    provider: Arc<dyn RepositoryProvider>,
    auth_settings: AuthSettings,
    registry: OnceLock<Registry>,
}

impl Container {
    pub fn new(provider: Arc<dyn RepositoryProvider>, auth_settings: AuthSettings) -> Self {
        Self {
            provider,
            auth_settings,
            registry: OnceLock::new(),
        }
    }

    /// Build all repositories, then all services. Later calls are no-ops.
    pub fn initialize(&self) {
        self.registry.get_or_init(|| {
            let registry = self.build();
            info!(
                repositories = RepositoryKind::ALL.len(),
                services = ServiceKind::ALL.len(),
                "Container initialized"
            );
            registry
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.get().is_some()
    }

    fn build(&self) -> Registry {
        let users = self.provider.user_repository();
        let clients = self.provider.client_repository();
        let pets = self.provider.pet_repository();
        let appointments = self.provider.appointment_repository();

        let auth_service = Arc::new(AuthService::new(users.clone(), self.auth_settings.clone()));
        let client_service = Arc::new(ClientService::new(clients.clone()));
        let pet_service = Arc::new(PetService::new(pets.clone(), clients.clone()));
        let appointment_service = Arc::new(AppointmentService::new(
            appointments.clone(),
            pets.clone(),
            users.clone(),
        ));

        Registry {
            users,
            clients,
            pets,
            appointments,
            auth_service,
            client_service,
            pet_service,
            appointment_service,
        }
    }

    fn registry(&self) -> Result<&Registry, ContainerError> {
        self.registry.get().ok_or(ContainerError::Uninitialized)
    }

    // ── Lookup by name ──────────────────────────────────────────

    pub fn get_repository(&self, name: &str) -> Result<RepositoryHandle, ContainerError> {
        let registry = self.registry()?;
        let kind =
            RepositoryKind::from_name(name).ok_or_else(|| ContainerError::RepositoryNotFound {
                name: name.to_string(),
                available: names(&RepositoryKind::ALL),
            })?;

        Ok(match kind {
            RepositoryKind::User => RepositoryHandle::User(registry.users.clone()),
            RepositoryKind::Client => RepositoryHandle::Client(registry.clients.clone()),
            RepositoryKind::Pet => RepositoryHandle::Pet(registry.pets.clone()),
            RepositoryKind::Appointment => {
                RepositoryHandle::Appointment(registry.appointments.clone())
            }
        })
    }

    pub fn get_service(&self, name: &str) -> Result<ServiceHandle, ContainerError> {
        let registry = self.registry()?;
        let kind = ServiceKind::from_name(name).ok_or_else(|| ContainerError::ServiceNotFound {
            name: name.to_string(),
            available: names(&ServiceKind::ALL),
        })?;

        Ok(match kind {
            ServiceKind::Auth => ServiceHandle::Auth(registry.auth_service.clone()),
            ServiceKind::Client => ServiceHandle::Client(registry.client_service.clone()),
            ServiceKind::Pet => ServiceHandle::Pet(registry.pet_service.clone()),
            ServiceKind::Appointment => {
                ServiceHandle::Appointment(registry.appointment_service.clone())
            }
        })
    }

    // ── Typed accessors ─────────────────────────────────────────

    pub fn user_repository(&self) -> Result<Arc<dyn UserRepository>, ContainerError> {
        Ok(self.registry()?.users.clone())
    }

    pub fn client_repository(&self) -> Result<Arc<dyn ClientRepository>, ContainerError> {
        Ok(self.registry()?.clients.clone())
    }

    pub fn pet_repository(&self) -> Result<Arc<dyn PetRepository>, ContainerError> {
        Ok(self.registry()?.pets.clone())
    }

    pub fn appointment_repository(&self) -> Result<Arc<dyn AppointmentRepository>, ContainerError> {
        Ok(self.registry()?.appointments.clone())
    }

    pub fn auth_service(&self) -> Result<Arc<AuthService>, ContainerError> {
        Ok(self.registry()?.auth_service.clone())
    }

    pub fn client_service(&self) -> Result<Arc<ClientService>, ContainerError> {
        Ok(self.registry()?.client_service.clone())
    }

    pub fn pet_service(&self) -> Result<Arc<PetService>, ContainerError> {
        Ok(self.registry()?.pet_service.clone())
    }

    pub fn appointment_service(&self) -> Result<Arc<AppointmentService>, ContainerError> {
        Ok(self.registry()?.appointment_service.clone())
    }

    pub fn health_check(&self) -> ContainerHealth {
        if self.is_initialized() {
            ContainerHealth {
                initialized: true,
                repositories_count: RepositoryKind::ALL.len(),
                services_count: ServiceKind::ALL.len(),
                available_repositories: names(&RepositoryKind::ALL),
                available_services: names(&ServiceKind::ALL),
            }
        } else {
            ContainerHealth {
                initialized: false,
                repositories_count: 0,
                services_count: 0,
                available_repositories: Vec::new(),
                available_services: Vec::new(),
            }
        }
    }
}
