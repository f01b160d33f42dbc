use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LoggingSettings};

/// Default location of the optional configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads the seeder configuration.
///
/// Sources, lowest precedence first: `config.toml` (optional), environment
/// variables prefixed `LIBRARY_SEED__` (e.g. `LIBRARY_SEED__LOGGING__LEVEL`),
/// and finally `DATABASE_URL`, which is the one variable operators are
/// expected to set. A `.env` file in the working directory is read first.
pub fn load_config() -> Result<Config, ConfigError> {
    // No .env file is fine; the variables may already be in the environment.
    let _ = dotenvy::dotenv();

    load_config_from(
        Path::new(DEFAULT_CONFIG_FILE),
        std::env::var("DATABASE_URL").ok(),
    )
}

/// Same as [`load_config`] but with the file path and connection string
/// override passed in.
pub fn load_config_from(path: &Path, database_url: Option<String>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("LIBRARY_SEED").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let mut config = builder.try_deserialize::<Config>()?;

    if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
        config.database.url = url;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "no database connection string; set DATABASE_URL".to_string(),
        ));
    }
    if config.database.connect_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "database.connect_timeout_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_file_and_fills_defaults() {
        let (_dir, path) = write_config(
            r#"
            [database]
            url = "postgres://postgres@localhost/library"

            [logging]
            level = "debug"
            "#,
        );

        let config = load_config_from(&path, None).unwrap();
        assert_eq!(config.database.url, "postgres://postgres@localhost/library");
        assert_eq!(config.database.connect_timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.directory.is_none());
        assert!(!config.logging.json);
    }

    #[test]
    fn database_url_overrides_file() {
        let (_dir, path) = write_config(
            r#"
            [database]
            url = "postgres://from-file/library"
            connect_timeout_secs = 2
            "#,
        );

        let config =
            load_config_from(&path, Some("postgres://from-env/library".to_string())).unwrap();
        assert_eq!(config.database.url, "postgres://from-env/library");
        assert_eq!(config.database.connect_timeout_secs, 2);
    }

    #[test]
    fn missing_file_is_fine_when_url_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let url = Some("postgres://localhost/app5".to_string());
        let config = load_config_from(&path, url).unwrap();
        assert_eq!(config.database.url, "postgres://localhost/app5");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_url_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_config_from(&path, None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let (_dir, path) = write_config(
            r#"
            [database]
            url = "postgres://localhost/library"
            connect_timeout_secs = 0
            "#,
        );

        let err = load_config_from(&path, None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError(msg) if msg.contains("connect_timeout_secs")
        ));
    }
}
