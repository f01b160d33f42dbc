use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the seeder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the library database lives.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string. `DATABASE_URL` overrides whatever is here.
    #[serde(default)]
    pub url: String,
    /// How long to wait for the server to accept the connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "database=debug").
    #[serde(default = "default_level")]
    pub level: String,
    /// If set, logs are also written to `library-seed.log` in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Emit JSON lines on stderr instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_level() -> String {
    "info".to_string()
}

// --- Default Implementations ---
// A config.toml is optional; these let DATABASE_URL alone be enough.

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            json: false,
        }
    }
}
