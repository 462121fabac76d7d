//! Record store collaborator
//!
//! The scouting sheet is read and written as a whole: callers load every
//! row, modify their copy and write every row back. No retry or
//! consistency guarantee is given; a failed `save_all` leaves the store
//! as it was before the call as far as the caller can tell.

use std::future::Future;

use tracing::{error, info, warn};

use crate::{
    cache::{RecordCache, RedisConfig},
    database::{DatabaseConfig, SheetStore},
    demo::DemoStore,
    error::StoreResult,
    records::{PLAYER_COLUMNS, PlayerRecord},
};

/// Result of a `save_all` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Records were written to the backing store
    Persisted,
    /// The store runs in demo mode and dropped the write
    Discarded,
}

/// Read-all/write-all backend for player records
pub trait RecordStore {
    /// Load every record in sheet order
    fn load_all(&self) -> impl Future<Output = StoreResult<Vec<PlayerRecord>>> + Send;

    /// Replace every record with `records`
    fn save_all(
        &self,
        records: &[PlayerRecord],
    ) -> impl Future<Output = StoreResult<SaveOutcome>> + Send;

    /// Write the header row when the store is empty
    fn initialize_with_header(
        &self,
        columns: &[&str],
    ) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Backend chosen at startup
#[derive(Clone)]
pub enum PlayerStore {
    /// PostgreSQL-backed sheet
    Sheet(SheetStore),
    /// In-memory fixture, writes are discarded
    Demo(DemoStore),
}

impl PlayerStore {
    /// Connect to the configured backend, falling back to demo mode
    ///
    /// Demo mode is used when `DATABASE_URL` is unset, when the database
    /// cannot be reached, or when the header row cannot be written. A connection failure is logged with a
    /// remediation hint instead of aborting startup.
    pub async fn connect(db_config: Option<DatabaseConfig>, redis_config: Option<RedisConfig>) -> Self {
        let Some(db_config) = db_config else {
            warn!("Record store not configured, demo mode active");
            return PlayerStore::Demo(DemoStore::new());
        };

        let sheet = match SheetStore::connect(&db_config).await {
            Ok(sheet) => sheet,
            Err(e) => {
                error!("Record store unavailable: {} ({})", e, e.hint());
                warn!("Falling back to demo mode");
                return PlayerStore::Demo(DemoStore::new());
            }
        };

        let sheet = match redis_config {
            Some(redis_config) => match RecordCache::new(&redis_config) {
                Ok(cache) => sheet.with_cache(cache),
                Err(e) => {
                    warn!("Record cache disabled: {}", e);
                    sheet
                }
            },
            None => sheet,
        };

        info!("Record store connected");
        Self::from_sheet(sheet).await
    }

    /// Use `sheet` once its header row is in place, falling back to demo
    /// mode when the header cannot be written
    pub async fn from_sheet(sheet: SheetStore) -> Self {
        match sheet.initialize_with_header(&PLAYER_COLUMNS).await {
            Ok(()) => PlayerStore::Sheet(sheet),
            Err(e) => {
                error!("Record store header setup failed: {} ({})", e, e.hint());
                warn!("Falling back to demo mode");
                PlayerStore::Demo(DemoStore::new())
            }
        }
    }

    /// Whether writes are discarded
    pub fn is_demo(&self) -> bool {
        matches!(self, PlayerStore::Demo(_))
    }
}

impl RecordStore for PlayerStore {
    async fn load_all(&self) -> StoreResult<Vec<PlayerRecord>> {
        match self {
            PlayerStore::Sheet(store) => store.load_all().await,
            PlayerStore::Demo(store) => store.load_all().await,
        }
    }

    async fn save_all(&self, records: &[PlayerRecord]) -> StoreResult<SaveOutcome> {
        match self {
            PlayerStore::Sheet(store) => store.save_all(records).await,
            PlayerStore::Demo(store) => store.save_all(records).await,
        }
    }

    async fn initialize_with_header(&self, columns: &[&str]) -> StoreResult<()> {
        match self {
            PlayerStore::Sheet(store) => store.initialize_with_header(columns).await,
            PlayerStore::Demo(store) => store.initialize_with_header(columns).await,
        }
    }
}
