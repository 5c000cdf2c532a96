use std::path::PathBuf;

use anyhow::{Context, Result};

/// Configuration for the laneboard server.
///
/// CLI flags override environment variables, which override the defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            db_path: PathBuf::from("laneboard.db"),
            dev_mode: false,
        }
    }
}

impl ServerConfig {
    /// Build a config from `LANEBOARD_PORT`, `LANEBOARD_DB` and
    /// `LANEBOARD_DEV`, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("LANEBOARD_PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("Invalid LANEBOARD_PORT value: {}", port))?;
        }
        if let Ok(db) = std::env::var("LANEBOARD_DB") {
            config.db_path = PathBuf::from(db);
        }
        if let Ok(dev) = std::env::var("LANEBOARD_DEV") {
            config.dev_mode = dev == "1" || dev.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}
