use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `CAR_OFFER__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "CAR_OFFER";

pub const DEFAULT_CONFIG_FILE: &str = "car-offer.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    pub path: String,
    /// Insert the demo valuations when the database is empty
    pub seed_on_startup: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Settings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Defaults, then the TOML file if it exists, then `CAR_OFFER__*` variables
pub fn load_config(path: &Path) -> anyhow::Result<Settings> {
    let config = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.path", "car-offer.db")?
        .set_default("database.seed_on_startup", true)?
        .set_default("logging.level", "info")?
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_settings(settings: &Settings) -> anyhow::Result<()> {
    if settings.server.host.trim().is_empty() {
        anyhow::bail!("Server host cannot be empty");
    }

    if settings.server.port == 0 {
        anyhow::bail!("Server port must be between 1 and 65535");
    }

    if settings.database.path.trim().is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }

    let level = settings.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        anyhow::bail!(
            "Invalid log level '{}', expected one of: {}",
            settings.logging.level,
            LOG_LEVELS.join(", ")
        );
    }

    Ok(())
}
