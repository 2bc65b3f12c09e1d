//! The configuration structs used to build the AppConfig, and their impls.
use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use lazy_regex::regex_captures;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

/// Name of the variable the hosting platform uses to hand out the blob store token.
pub const BLOB_TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub store_config: StoreConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Refuse to start when the selected backend has no credential.
    #[serde(default)]
    pub require_credential: bool,
    pub blob: BlobConfig,
    #[serde(default)]
    pub db: Option<DbConfig>,
}

#[derive(Deserialize, derive_more::Display, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[display("blob")]
    Blob,
    #[display("postgres")]
    Postgres,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BlobConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<SecretString>,
    pub prefix: String,
    pub api_version: u32,
    pub timeout_millis: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DbConfig {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub host: String,
    pub db_name: String,
    #[serde(default)]
    pub require_ssl: SslRequire,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SslRequire {
    #[default]
    Prefer,
    Require,
    Disable,
}

// ###################################
// ->   IMPLs
// ###################################
impl AppConfig {
    /// Layers `base.toml`, the environment specific file and `APP_` prefixed
    /// environment variables (nesting separated by `__`) on top of each other.
    pub fn figment(config_dir: &Path, environment: Environment) -> Figment {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
    }

    pub fn load_from(config_dir: &Path, environment: Environment) -> ConfigResult<Self> {
        let mut config: AppConfig = Self::figment(config_dir, environment).extract()?;

        // The platform provided token is only a fallback for an explicit one.
        if config.store_config.blob.token.is_none() {
            if let Ok(token) = std::env::var(BLOB_TOKEN_ENV) {
                config.store_config.blob.token = Some(SecretString::from(token));
            }
        }

        if matches!(environment, Environment::Production) {
            if let Ok(production_db) = std::env::var("DATABASE_URL") {
                config.store_config.db = Some(DbConfig::try_from(production_db.as_str())?);
            }
        }

        Ok(config)
    }
}

impl StoreConfig {
    /// Whether the selected backend has what it needs to write.
    pub fn has_credential(&self) -> bool {
        match self.backend {
            StoreBackend::Blob => self
                .blob
                .token
                .as_ref()
                .is_some_and(|token| !token.expose_secret().trim().is_empty()),
            StoreBackend::Postgres => self.db.is_some(),
        }
    }
}

impl BlobConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl DbConfig {
    pub fn connection_options(&self) -> PgConnectOptions {
        // Don't try to use the '$HOME/.pgpass' file.
        PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .database(&self.db_name)
            .ssl_mode(self.require_ssl.into())
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

impl From<SslRequire> for PgSslMode {
    fn from(value: SslRequire) -> Self {
        match value {
            SslRequire::Require => PgSslMode::Require,
            SslRequire::Disable => PgSslMode::Disable,
            SslRequire::Prefer => PgSslMode::Prefer,
        }
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

impl TryFrom<&str> for DbConfig {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // postgres://{username}:{password}@{hostname}:{port}/{database}?{options}
        let (_whole, username, password, host, port, db_name, options) = regex_captures!(
            r#"^postgres(?:ql)?:\/\/([^:]+):([^@]+)@([^:\/]+):(\d+)\/([^\s\/?]+)(\?[^\s]*)?$"#,
            value
        )
        .ok_or(Self::Error::StringToDbConfigFail)?;

        let (username, db_name, host) =
            (username.to_string(), db_name.to_string(), host.to_string());
        let password = SecretString::from(password.to_string());
        let port = port
            .parse()
            .map_err(|_| Self::Error::StringToDbConfigFail)?;

        let mut require_ssl = SslRequire::default();
        if let Some(options) = options.strip_prefix('?') {
            for option in options.split(['&', ',']) {
                if let Some(("sslmode", val)) = option.split_once('=') {
                    match val {
                        "disable" => require_ssl = SslRequire::Disable,
                        "require" => require_ssl = SslRequire::Require,
                        _ => {}
                    }
                }
            }
        }

        Ok(DbConfig {
            username,
            password,
            port,
            host,
            db_name,
            require_ssl,
        })
    }
}

// ###################################
// ->   TESTS
// ###################################
