//! Store construction and startup seeding

use bedfinder_core::{
    seed::{ensure_sample_data, AdminSeed, SeedReport, SeedTargets},
    JsonFileStore, MemoryStore, RecordStore,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::{AuthConfig, StorageBackend, StorageConfig},
    db::PgRecordStore,
    Error, Result,
};

/// An opened store plus the pool behind it, when there is one.
pub struct OpenedStore {
    pub store: Arc<dyn RecordStore>,
    pub db_pool: Option<PgPool>,
}

/// Open the configured backend. PostgreSQL schemas are migrated here.
pub async fn open_store(config: &StorageConfig) -> Result<OpenedStore> {
    let opened = match config.backend {
        StorageBackend::Memory => OpenedStore {
            store: Arc::new(MemoryStore::new()),
            db_pool: None,
        },
        StorageBackend::JsonFile => {
            let path = config.path.clone().ok_or_else(|| {
                Error::Internal("storage.path is required for the json_file backend".to_string())
            })?;
            OpenedStore {
                store: Arc::new(JsonFileStore::new(path)),
                db_pool: None,
            }
        }
        StorageBackend::Postgres => {
            let store = PgRecordStore::connect(config).await?;
            store.migrate().await?;
            let pool = store.pool().clone();
            OpenedStore {
                store: Arc::new(store),
                db_pool: Some(pool),
            }
        }
    };

    tracing::info!(
        backend = opened.store.backend_name(),
        path = ?config.path.as_ref().filter(|_| config.backend == StorageBackend::JsonFile),
        "Record store opened"
    );
    Ok(opened)
}

/// Seed sample hospitals, blog posts and the initial admin into empty tables.
pub async fn seed_sample_data(targets: SeedTargets<'_>, auth: &AuthConfig) -> Result<SeedReport> {
    let report = ensure_sample_data(
        targets,
        AdminSeed {
            username: &auth.seed_admin_username,
            password: &auth.seed_admin_password,
        },
    )
    .await?;

    if report.admins_created > 0 && auth.seed_admin_password == AuthConfig::default().seed_admin_password
    {
        tracing::warn!(
            username = %auth.seed_admin_username,
            "Seeded admin uses the default password; change it before exposing the server"
        );
    }
    Ok(report)
}
