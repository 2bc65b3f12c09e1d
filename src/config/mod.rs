//! Builds an `AppConfig` from the files in `config/` and `APP_` prefixed environment variables.
//! The configuration is loaded once at startup and handed to the `App` explicitly.

mod data;
mod error;

use tracing::info;

// Re-export config structs
pub use data::{
    AppConfig, BlobConfig, DbConfig, Environment, NetConfig, SslRequire, StoreBackend,
    StoreConfig, BLOB_TOKEN_ENV,
};
pub use error::{ConfigError, ConfigResult};

/// Loads the configuration for the environment named by `APP_ENVIRONMENT` (default `local`)
/// from the `config` directory inside the current working directory.
pub fn load_config() -> ConfigResult<AppConfig> {
    info!("{:<20} - Initializing the configuration", "load_config");

    let config_dir = std::env::current_dir()?.join("config");
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;

    AppConfig::load_from(&config_dir, environment)
}
