//! Application configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults
//! for the active [`Profile`], an optional TOML file, then environment
//! variables. The CLI applies its flags on top.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::AuthSettings;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::DatabaseConfig;

const DEFAULT_JWT_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown profile '{0}' (expected development, production or testing)")]
    UnknownProfile(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Deployment profile, selected by `VETCARE_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
    Testing,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Production => "production",
            Profile::Testing => "testing",
        }
    }

    /// Environment variable that overrides the database URL, if any
    pub fn database_url_env(&self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("DEV_DATABASE_URL"),
            Profile::Production => Some("DATABASE_URL"),
            Profile::Testing => None,
        }
    }

    pub fn default_database_url(&self) -> &'static str {
        match self {
            Profile::Development => "sqlite://./instance/vetcare_dev.db?mode=rwc",
            Profile::Production => "sqlite://./instance/vetcare_prod.db?mode=rwc",
            Profile::Testing => "sqlite::memory:",
        }
    }

    pub fn default_host(&self) -> &'static str {
        match self {
            Profile::Production => "0.0.0.0",
            _ => "127.0.0.1",
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "default" => Ok(Profile::Development),
            "production" => Ok(Profile::Production),
            "testing" => Ok(Profile::Testing),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address; the profile decides when unset
    pub host: Option<String>,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 5000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Connection URL; the profile decides when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub log_statements: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            log_statements: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `vetcare=debug,sqlx=warn`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub max_failed_attempts: i32,
    pub lockout_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 2,
            max_failed_attempts: 5,
            lockout_minutes: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Account created on first start when the users table is empty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@vetcare.com".to_string(),
            password: "admin123".to_string(),
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: Profile,
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Parse a TOML file; every key is optional.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(io_err)
    }

    /// Apply `VETCARE_ENV`, `HOST`, `PORT` and `SECRET_KEY` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(profile) = lookup("VETCARE_ENV") {
            self.profile = profile.parse()?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = Some(host);
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: port,
            })?;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.security.jwt_secret = secret;
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        self.server
            .host
            .as_deref()
            .unwrap_or_else(|| self.profile.default_host())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host(), self.server.port)
    }

    /// Database URL for the active profile. The profile's environment
    /// variable wins over the file, which wins over the built-in default.
    pub fn database_url(&self) -> String {
        self.database_url_with(|key| std::env::var(key).ok())
    }

    pub fn database_url_with<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        self.profile
            .database_url_env()
            .and_then(lookup)
            .or_else(|| self.database.url.clone())
            .unwrap_or_else(|| self.profile.default_database_url().to_string())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url(),
            max_connections: self.database.max_connections,
            log_statements: self.database.log_statements,
        }
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt: JwtConfig {
                secret: self.security.jwt_secret.clone(),
                expiration_hours: self.security.jwt_expiration_hours,
                issuer: "vetcare".to_string(),
            },
            max_failed_attempts: self.security.max_failed_attempts,
            lockout_minutes: self.security.lockout_minutes,
            bcrypt_cost: self.security.bcrypt_cost,
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.security.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// `VETCARE_CONFIG` if set, else `~/.config/vetcare/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("VETCARE_CONFIG") {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vetcare")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn profile_parsing() {
        assert_eq!("production".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!(" Testing ".parse::<Profile>().unwrap(), Profile::Testing);
        assert_eq!("default".parse::<Profile>().unwrap(), Profile::Development);
        assert!(matches!(
            "staging".parse::<Profile>(),
            Err(ConfigError::UnknownProfile(p)) if p == "staging"
        ));
    }

    #[test]
    fn defaults_follow_profile() {
        let mut config = AppConfig::default();
        assert_eq!(config.profile, Profile::Development);
        assert_eq!(config.address(), "127.0.0.1:5000");
        assert_eq!(
            config.database_url_with(env(&[])),
            "sqlite://./instance/vetcare_dev.db?mode=rwc"
        );

        config.profile = Profile::Production;
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(
            config.database_url_with(env(&[])),
            "sqlite://./instance/vetcare_prod.db?mode=rwc"
        );

        config.profile = Profile::Testing;
        assert_eq!(config.database_url_with(env(&[])), "sqlite::memory:");
    }

    #[test]
    fn database_url_env_is_profile_specific() {
        let lookup = env(&[
            ("DEV_DATABASE_URL", "sqlite://dev.db"),
            ("DATABASE_URL", "sqlite://prod.db"),
        ]);
        let mut config = AppConfig::default();
        assert_eq!(config.database_url_with(&lookup), "sqlite://dev.db");

        config.profile = Profile::Production;
        assert_eq!(config.database_url_with(&lookup), "sqlite://prod.db");

        config.profile = Profile::Testing;
        assert_eq!(config.database_url_with(&lookup), "sqlite::memory:");
    }

    #[test]
    fn env_overrides_file() {
        let mut config = AppConfig::from_toml(
            r#"
            [server]
            host = "10.0.0.1"
            port = 8080

            [database]
            url = "sqlite://file.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.address(), "10.0.0.1:8080");
        assert_eq!(config.database_url_with(env(&[])), "sqlite://file.db");

        config
            .apply_overrides(env(&[
                ("VETCARE_ENV", "production"),
                ("PORT", "9090"),
                ("SECRET_KEY", "s3cret"),
            ]))
            .unwrap();
        assert_eq!(config.profile, Profile::Production);
        assert_eq!(config.address(), "10.0.0.1:9090");
        assert_eq!(config.auth_settings().jwt.secret, "s3cret");
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));

        let err = config
            .apply_overrides(env(&[("VETCARE_ENV", "qa")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile(_)));
    }

    #[test]
    fn partial_toml_keeps_section_defaults() {
        let config = AppConfig::from_toml(
            r#"
            profile = "testing"

            [security]
            lockout_minutes = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.profile, Profile::Testing);
        assert_eq!(config.security.lockout_minutes, 5);
        assert_eq!(config.security.max_failed_attempts, 5);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.admin.username, "admin");
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("vetcare-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 6100;
        config.logging.format = "json".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.server.port, 6100);
        assert_eq!(loaded.logging.format, "json");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_is_io_error_unless_defaulted() {
        let path = Path::new("/nonexistent/vetcare/config.toml");
        assert!(matches!(AppConfig::load(path), Err(ConfigError::Io { .. })));
        assert_eq!(AppConfig::load_or_default(path).unwrap().server.port, 5000);
    }
}
