//! Shared application state handed to every handler.

use bedfinder_core::{
    seed::SeedTargets, AdminRepository, BlogRepository, BookingRepository, HospitalRepository,
    RecordStore,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{auth::TokenIssuer, startup, Config, Result};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub hospitals: HospitalRepository,
    pub bookings: BookingRepository,
    pub admins: AdminRepository,
    pub blog: BlogRepository,
    pub tokens: TokenIssuer,
    /// Set for the postgres backend; feeds the connection gauges.
    pub db_pool: Option<PgPool>,
}

/// Overrides for tests and tools that bring their own store.
#[derive(Clone, Default)]
pub struct AppStateOptions {
    /// Use this store instead of opening the configured backend.
    pub store: Option<Arc<dyn RecordStore>>,
    /// Overrides `storage.seed_on_startup`.
    pub seed_sample_data: Option<bool>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        Self::new_with_options(config, AppStateOptions::default()).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        let (store, db_pool) = match options.store {
            Some(store) => (store, None),
            None => {
                let opened = startup::open_store(&config.storage).await?;
                (opened.store, opened.db_pool)
            }
        };

        let hospitals = HospitalRepository::new(Arc::clone(&store));
        let bookings = BookingRepository::new(Arc::clone(&store));
        let admins = AdminRepository::new(Arc::clone(&store));
        let blog = BlogRepository::new(Arc::clone(&store));

        if options
            .seed_sample_data
            .unwrap_or(config.storage.seed_on_startup)
        {
            let targets = SeedTargets {
                hospitals: &hospitals,
                admins: &admins,
                blog: &blog,
            };
            startup::seed_sample_data(targets, &config.auth).await?;
        }

        let tokens = TokenIssuer::new(&config.auth);

        Ok(Self {
            config: Arc::new(config),
            store,
            hospitals,
            bookings,
            admins,
            blog,
            tokens,
            db_pool,
        })
    }
}
