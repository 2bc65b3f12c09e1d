use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::DbConfig;

use super::{StoreError, StoreReceipt, StoreResult, SubmissionRecord};

#[derive(Clone, Debug)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn init(db_config: &DbConfig) -> StoreResult<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let max_cons = if cfg!(test) { 1 } else { 5 };

        let db = PgPoolOptions::new()
            .max_connections(max_cons)
            .acquire_timeout(Duration::from_millis(500))
            .connect_with(db_config.connection_options())
            .await
            .map_err(|ex| StoreError::FailToCreatePool(ex.to_string()))?;

        let store = Self { db };
        store.ensure_table().await?;

        Ok(store)
    }

    /// Creates the `waitlist` table if it does not exist yet.
    async fn ensure_table(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS waitlist (
                email TEXT UNIQUE NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Inserts the record, silently skipping emails that are already on the waitlist.
    pub async fn insert(&self, record: &SubmissionRecord) -> StoreResult<StoreReceipt> {
        let query_result = sqlx::query(
            r#"
            INSERT INTO waitlist (email, created_at)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
        "#,
        )
        .bind(&record.email)
        .bind(record.submitted_at)
        .execute(&self.db)
        .await?;

        Ok(StoreReceipt {
            url: None,
            created: query_result.rows_affected() == 1,
        })
    }
}
