pub mod entities;
pub mod migrator;
pub mod repositories;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./instance/vetcare_dev.db?mode=rwc")
    pub url: String,
    /// Upper bound of the connection pool
    pub max_connections: u32,
    /// Log every SQL statement at debug level
    pub log_statements: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./instance/vetcare_dev.db?mode=rwc".to_string(),
            max_connections: 10,
            log_statements: false,
        }
    }
}

impl DatabaseConfig {
    /// Create config for a SQLite file
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Self::default()
        }
    }

    /// Private in-memory SQLite database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new(self.url.clone());
        opts.connect_timeout(Duration::from_secs(8))
            .sqlx_logging(self.log_statements)
            .sqlx_logging_level(log::LevelFilter::Debug);

        if self.is_in_memory() {
            // Every pooled connection would otherwise open its own empty database
            opts.max_connections(1).min_connections(1);
        } else {
            opts.max_connections(self.max_connections);
        }
        opts
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(config.connect_options()).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Fresh in-memory database with all migrations applied
#[cfg(test)]
pub(crate) async fn test_database() -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    migrator::Migrator::up(&db, None)
        .await
        .expect("migrations apply cleanly");
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_pool_is_pinned_to_one_connection() {
        let opts = DatabaseConfig::in_memory().connect_options();
        assert_eq!(opts.get_max_connections(), Some(1));

        let opts = DatabaseConfig::sqlite("/tmp/vetcare.db").connect_options();
        assert_eq!(opts.get_max_connections(), Some(10));
    }

    #[tokio::test]
    async fn migrations_create_all_tables() {
        use sea_orm::{ConnectionTrait, Statement};

        let db = test_database().await;
        for table in ["users", "clients", "pets", "appointments"] {
            let row = db
                .query_one(Statement::from_string(
                    db.get_database_backend(),
                    format!(
                        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '{}'",
                        table
                    ),
                ))
                .await
                .unwrap();
            assert!(row.is_some(), "missing table {}", table);
        }
    }
}
