//! The durable store behind the waitlist.
//! Either a blob store (one object per submission) or a Postgres table with a unique `email`.

mod blob;
mod error;
mod postgres;

pub use blob::{sanitize_email, BlobStore};
pub use error::{StoreError, StoreResult};
pub use postgres::PgStore;

use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};

/// One accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    /// Tells apart submissions of the same email within the same millisecond.
    pub id: Uuid,
    pub email: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_timestamp(email, Utc::now())
    }

    pub fn with_timestamp(email: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            submitted_at,
        }
    }
}

/// What the store reports back after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReceipt {
    /// Public location of the record, if the backend has one.
    pub url: Option<String>,
    /// `false` when the store already held this email and skipped the write.
    pub created: bool,
}

#[derive(Debug)]
pub enum Store {
    Blob(BlobStore),
    Postgres(PgStore),
    /// The selected backend has no credential, every write is refused.
    Unconfigured(StoreBackend),
}

impl Store {
    pub async fn init(config: &StoreConfig) -> StoreResult<Self> {
        if !config.has_credential() {
            error!(
                "{:<20} - no credential for the '{}' store, submissions will be refused",
                "init_store", config.backend
            );
            return Ok(Self::Unconfigured(config.backend));
        }

        let store = match (config.backend, &config.blob.token, &config.db) {
            (StoreBackend::Blob, Some(token), _) => {
                Self::Blob(BlobStore::new(&config.blob, token.clone())?)
            }
            (StoreBackend::Postgres, _, Some(db_config)) => {
                Self::Postgres(PgStore::init(db_config).await?)
            }
            (backend, _, _) => Self::Unconfigured(backend),
        };
        info!("{:<20} - {}", "init_store", store.backend());

        Ok(store)
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Store::Blob(_) => StoreBackend::Blob,
            Store::Postgres(_) => StoreBackend::Postgres,
            Store::Unconfigured(backend) => *backend,
        }
    }

    pub fn has_credential(&self) -> bool {
        !matches!(self, Store::Unconfigured(_))
    }

    /// A single atomic write. Never retried.
    pub async fn insert(&self, record: &SubmissionRecord) -> StoreResult<StoreReceipt> {
        match self {
            Store::Blob(blob) => blob.put(record).await,
            Store::Postgres(pg) => pg.insert(record).await,
            Store::Unconfigured(backend) => Err(StoreError::MissingCredential(*backend)),
        }
    }
}
