//! PostgreSQL record store
//!
//! Records live in a single `records` table as JSONB documents keyed by
//! `(table_name, id)`. Ids come from `record_counters`, bumped in the same
//! transaction as the insert.

use async_trait::async_trait;
use bedfinder_core::{Error as CoreError, Record, RecordStore, Result as CoreResult};
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;

use crate::{config::StorageConfig, Error, Result};

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

fn backend(e: sqlx::Error) -> CoreError {
    CoreError::Backend(format!("postgres: {e}"))
}

fn into_record(table: &str, id: i64, data: JsonValue) -> CoreResult<Record> {
    match data {
        JsonValue::Object(mut record) => {
            record.insert("id".to_string(), JsonValue::from(id));
            Ok(record)
        }
        other => Err(CoreError::Decode {
            table: table.to_string(),
            id,
            message: format!("expected a JSON object, found {other}"),
        }),
    }
}

impl PgRecordStore {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Internal("storage.database_url is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Failed to run migrations: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get_all(&self, table: &str) -> CoreResult<Vec<Record>> {
        let rows: Vec<(i64, Json<JsonValue>)> =
            sqlx::query_as("SELECT id, data FROM records WHERE table_name = $1 ORDER BY id")
                .bind(table)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;

        rows.into_iter()
            .map(|(id, Json(data))| into_record(table, id, data))
            .collect()
    }

    async fn get_by_id(&self, table: &str, id: i64) -> CoreResult<Option<Record>> {
        let row: Option<(Json<JsonValue>,)> =
            sqlx::query_as("SELECT data FROM records WHERE table_name = $1 AND id = $2")
                .bind(table)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        row.map(|(Json(data),)| into_record(table, id, data))
            .transpose()
    }

    async fn create(&self, table: &str, mut data: Record) -> CoreResult<i64> {
        data.remove("id");

        let mut tx = self.pool.begin().await.map_err(backend)?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO record_counters (table_name, last_id) VALUES ($1, 1)
            ON CONFLICT (table_name) DO UPDATE SET last_id = record_counters.last_id + 1
            RETURNING last_id
            "#,
        )
        .bind(table)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;

        sqlx::query("INSERT INTO records (table_name, id, data) VALUES ($1, $2, $3)")
            .bind(table)
            .bind(id)
            .bind(Json(JsonValue::Object(data)))
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, mut changes: Record) -> CoreResult<bool> {
        changes.remove("id");

        let result = sqlx::query(
            r#"
            UPDATE records
            SET data = data || $3, updated_at = now()
            WHERE table_name = $1 AND id = $2
            "#,
        )
        .bind(table)
        .bind(id)
        .bind(Json(JsonValue::Object(changes)))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, table: &str, id: i64) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM records WHERE table_name = $1 AND id = $2")
            .bind(table)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }
}
