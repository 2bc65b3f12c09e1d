use strum_macros::AsRefStr;

use crate::config::StoreBackend;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum StoreError {
    #[error("no credential configured for the '{0}' store")]
    MissingCredential(StoreBackend),
    #[error("invalid blob store url: {0}")]
    UrlParsing(String),
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(String),

    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// A misconfigured deployment, as opposed to a failing store.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}
