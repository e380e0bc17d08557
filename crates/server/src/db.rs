pub mod memory;

use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::archive::ArchivalClient;
use crate::config::Settings;
use crate::staging::StagingArea;
use crate::workflow::assignment::AssignmentLocks;

pub use memory::MemoryStore;

/// Document store backing the `users`, `cases` and `lawyer_notifications`
/// collections.
///
/// Every single-document mutation is atomic in both backends. Nothing spans
/// documents: a workflow step that touches a case and a user issues two
/// independent writes.
#[derive(Clone)]
pub enum Store {
    Postgres(Pool<Postgres>),
    Memory(Arc<MemoryStore>),
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(Arc::new(MemoryStore::default()))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    /// Cheap liveness probe used by the health endpoint.
    pub async fn ping(&self) -> Result<(), String> {
        match self {
            Store::Postgres(pool) => sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(pool)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Store::Memory(_) => Ok(()),
        }
    }
}

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract individual parts directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub archive: Arc<ArchivalClient>,
    pub staging: StagingArea,
    pub settings: Arc<Settings>,
    pub locks: AssignmentLocks,
}

impl AppState {
    pub fn new(store: Store, archive: ArchivalClient, settings: Settings) -> Self {
        let staging = StagingArea::new(settings.upload_dir.clone());
        Self {
            store,
            archive: Arc::new(archive),
            staging,
            settings: Arc::new(settings),
            locks: AssignmentLocks::default(),
        }
    }
}

/// Create a new database connection pool.
/// Uses `connect_lazy` so no connections open until the first query.
pub fn create_pool(database_url: &str, max_connections: u32) -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(database_url)
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Pick the store for the given settings: Postgres when `DATABASE_URL` is
/// set (migrations applied), otherwise a process-local memory store.
pub async fn open_store(settings: &Settings) -> Result<Store, String> {
    match &settings.database_url {
        Some(url) => {
            let pool = create_pool(url, settings.database_max_connections)
                .map_err(|e| format!("Failed to create database pool: {e}"))?;
            run_migrations(&pool)
                .await
                .map_err(|e| format!("Failed to run database migrations: {e}"))?;
            tracing::info!("Using Postgres document store");
            Ok(Store::Postgres(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
            Ok(Store::memory())
        }
    }
}
