//! A client for an object store that is written to with a single authenticated `PUT`.

use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BlobConfig;

use super::{StoreReceipt, StoreResult, SubmissionRecord};

#[derive(Debug)]
pub struct BlobStore {
    http_client: Client,
    base_url: reqwest::Url,
    prefix: String,
    api_version: u32,
    token: SecretString,
}

impl BlobStore {
    pub fn new(config: &BlobConfig, token: SecretString) -> StoreResult<Self> {
        // `Url::join` replaces the last path segment unless the base ends with a slash.
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = reqwest::Url::parse(&base_url)
            .map_err(|e| super::StoreError::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(config.timeout()).build()?;

        Ok(BlobStore {
            http_client,
            base_url,
            prefix: config.prefix.trim_matches('/').to_string(),
            api_version: config.api_version,
            token,
        })
    }

    /// `<prefix>/<unix-ms>-<sanitized-email>-<record-id>.json`
    ///
    /// Every record gets its own key, the store never overwrites an earlier submission.
    pub fn object_path(&self, record: &SubmissionRecord) -> String {
        format!(
            "{}/{}-{}-{}.json",
            self.prefix,
            record.submitted_at.timestamp_millis(),
            sanitize_email(&record.email),
            record.id.simple()
        )
    }

    pub async fn put(&self, record: &SubmissionRecord) -> StoreResult<StoreReceipt> {
        let pathname = self.object_path(record);
        let url = self
            .base_url
            .join(&pathname)
            .map_err(|e| super::StoreError::UrlParsing(e.to_string()))?;

        let content = serde_json::to_vec(&BlobContent {
            email: &record.email,
            timestamp: record.submitted_at,
        })?;

        debug!("{:<20} - {pathname}", "PUT blob");
        let resp: PutBlobResponse = self
            .http_client
            .put(url)
            .bearer_auth(self.token.expose_secret())
            .header("x-api-version", self.api_version.to_string())
            .header("x-content-type", "application/json")
            .header("x-add-random-suffix", "0")
            .header("x-access", "public")
            .body(content)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(StoreReceipt {
            url: Some(resp.url),
            created: true,
        })
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with an underscore.
pub fn sanitize_email(email: &str) -> String {
    email
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Serialize)]
struct BlobContent<'a> {
    email: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct PutBlobResponse {
    url: String,
}
