//! Reusable VetCare server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database connection,
//! migrations, the service container, the default admin account, the
//! REST API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{AuthService, Container};
use crate::config::{AdminConfig, AppConfig, Profile};
use crate::domain::{DomainError, RegisterUserDto, UserRole};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::init_database;
use crate::interfaces::http::create_api_router;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin account when no users exist (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running VetCare server.
///
/// ```rust,no_run
/// use vetcare::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Initialized service container shared with the router.
    pub container: Arc<Container>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is actually bound to (resolves port 0).
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!(profile = %app_cfg.profile, "Starting VetCare...");

        if app_cfg.profile == Profile::Production && app_cfg.uses_default_secret() {
            warn!("Production profile is using the built-in JWT secret; set SECRET_KEY");
        }

        let prometheus_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db_config = app_cfg.database_config();
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Container ──────────────────────────────────────────
        let provider = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let container = Arc::new(Container::new(provider, app_cfg.auth_settings()));
        container.initialize();

        if opts.create_default_admin {
            let auth = container.auth_service()?;
            if let Err(e) = create_default_admin(&auth, &app_cfg.admin).await {
                error!(error = %e, "Failed to create default admin user");
            }
        }

        // ── REST API ───────────────────────────────────────────
        let api_router = create_api_router(container.clone(), db.clone(), prometheus_handle)?;

        let listener = tokio::net::TcpListener::bind(app_cfg.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            container,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API task to drain, bounded by the shutdown timeout,
    /// then close the database pool.
    pub async fn wait(self) {
        let timeout = std::time::Duration::from_secs(self.shutdown.timeout_secs());
        match tokio::time::timeout(timeout, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!("REST API did not stop within {}s", timeout.as_secs()),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("VetCare shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down VetCare...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// The global recorder can only be installed once per process, so restarts
/// within the same process reuse the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable; /metrics disabled");
                None
            }
        })
        .clone()
}

/// Register the configured admin when the users table is empty.
/// Returns whether an account was created.
pub async fn create_default_admin(
    auth: &AuthService,
    admin: &AdminConfig,
) -> Result<bool, DomainError> {
    if auth.user_count().await? > 0 {
        return Ok(false);
    }

    info!("Creating default admin user...");
    let user = auth
        .register(RegisterUserDto {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            role: Some(UserRole::Admin),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
        })
        .await?;

    info!(username = %user.username, "Default admin created");
    warn!("Please change the default admin password immediately!");
    Ok(true)
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// the configured level. Call once at process startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AuthSettings;
    use crate::infrastructure::database::test_database;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.profile = Profile::Testing;
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.security.bcrypt_cost = 4;
        config
    }

    #[tokio::test]
    async fn default_admin_is_created_once() {
        let db = test_database().await;
        let container = Container::new(
            Arc::new(SeaOrmRepositoryProvider::new(db)),
            AuthSettings {
                bcrypt_cost: 4,
                ..AuthSettings::default()
            },
        );
        container.initialize();
        let auth = container.auth_service().unwrap();
        let admin = AdminConfig::default();

        assert!(create_default_admin(&auth, &admin).await.unwrap());
        assert!(!create_default_admin(&auth, &admin).await.unwrap());
        assert_eq!(auth.user_count().await.unwrap(), 1);

        let result = auth.authenticate("admin", "admin123").await.unwrap();
        assert_eq!(result.user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn server_serves_health_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            ..ServerOptions::default()
        })
        .await
        .unwrap();
        assert!(handle.is_running());
        assert!(handle.container.is_initialized());

        let auth = handle.container.auth_service().unwrap();
        assert_eq!(auth.user_count().await.unwrap(), 1);

        let mut stream = tokio::net::TcpStream::connect(handle.local_addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.contains("x-request-id"));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn no_admin_option_leaves_users_empty() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: true,
            create_default_admin: false,
        })
        .await
        .unwrap();

        let auth = handle.container.auth_service().unwrap();
        assert_eq!(auth.user_count().await.unwrap(), 0);
        handle.shutdown().await;
    }
}
