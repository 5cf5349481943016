//! VetCare CLI server
//!
//! Headless veterinary clinic API suitable for a systemd service, a Docker
//! container or a standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/vetcare/config.toml)
//! vetcare
//!
//! # Production profile on a custom port
//! VETCARE_ENV=production vetcare --port 8080
//!
//! # Validate config without starting
//! vetcare --config /etc/vetcare/config.toml --check
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info};

use vetcare::config::{AppConfig, ConfigError, Profile};
use vetcare::server::{init_tracing, ServerHandle, ServerOptions};

/// VetCare: clients, pets and appointments for a veterinary clinic.
#[derive(Parser, Debug)]
#[command(
    name = "vetcare",
    version,
    about = "Veterinary clinic management REST API",
    long_about = "VetCare REST API server for staff accounts, clients, pets \
                  and appointments.\n\n\
                  Default config: ~/.config/vetcare/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "VETCARE_CONFIG")]
    config: Option<PathBuf>,

    /// Profile: development, production or testing. Overrides VETCARE_ENV.
    #[arg(long)]
    profile: Option<Profile>,

    /// Override the listen address.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(vetcare::default_config_path);
    let (mut config, load_error) = match AppConfig::load_or_default(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    config.apply_env_overrides()?;

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if let Some(host) = cli.host {
        config.server.host = Some(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);
    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        let report = check_config(&config_path, &config, load_error)?;
        println!("{}", report);
        return Ok(());
    }

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

/// `--check` never falls back to defaults: a file that failed to load is an error.
fn check_config(
    config_path: &Path,
    config: &AppConfig,
    load_error: Option<ConfigError>,
) -> Result<String, ConfigError> {
    if let Some(e) = load_error {
        error!("Failed to load config from {}: {}", config_path.display(), e);
        return Err(e);
    }

    Ok([
        "Configuration is valid".to_string(),
        format!("   Config file : {}", config_path.display()),
        format!("   Profile     : {}", config.profile),
        format!("   API address : {}", config.address()),
        format!("   Database    : {}", config.database_url()),
        format!("   Log level   : {}", config.logging.level),
    ]
    .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reports_valid_config() {
        let report =
            check_config(Path::new("vetcare.toml"), &AppConfig::default(), None).unwrap();
        assert!(report.starts_with("Configuration is valid"));
        assert!(report.contains("vetcare.toml"));
    }

    #[test]
    fn check_fails_when_config_did_not_load() {
        let parse_error = AppConfig::from_toml("server = [unclosed").unwrap_err();
        let result = check_config(
            Path::new("vetcare.toml"),
            &AppConfig::default(),
            Some(parse_error),
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
