//! PostgreSQL-backed record store
//!
//! The sheet is kept in two tables: the header row and the ordered data
//! rows, each row stored as a JSONB object keyed by column header.

use sqlx::{
    PgPool, Row,
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
};
use std::{env, time::Duration};
use tracing::{info, warn};

use crate::{
    cache::RecordCache,
    error::{StoreError, StoreResult},
    records::{PLAYER_COLUMNS, PlayerRecord},
    store::{RecordStore, SaveOutcome},
};

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// Returns `None` when `DATABASE_URL` is unset, meaning the record
    /// store is unconfigured.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: PostgreSQL connection URL
    /// - `DATABASE_MAX_CONNECTIONS`: Maximum number of connections (default: 5)
    /// - `DATABASE_CONNECTION_TIMEOUT`: Connection timeout in seconds (default: 10)
    pub fn from_env() -> Option<Self> {
        let database_url = env::var("DATABASE_URL").ok()?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let connection_timeout = env::var("DATABASE_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Some(Self {
            database_url,
            max_connections,
            connection_timeout,
        })
    }
}

/// Initialize a PostgreSQL connection pool
pub async fn init_pool(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let options: PgConnectOptions = config
        .database_url
        .parse()
        .map_err(|e| StoreError::Configuration(format!("Invalid database URL: {}", e)))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_with(options)
        .await
        .map_err(StoreError::Connection)?;

    Ok(pool)
}

/// Check database connectivity
pub async fn health_check(pool: &PgPool) -> StoreResult<bool> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(StoreError::Query)?;

    Ok(true)
}

/// Sheet stored in PostgreSQL, with an optional read cache
#[derive(Clone)]
pub struct SheetStore {
    pool: PgPool,
    cache: Option<RecordCache>,
}

impl SheetStore {
    /// Connect and create the sheet tables if they are missing
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = init_pool(config).await?;
        health_check(&pool).await?;

        for statement in [
            "CREATE TABLE IF NOT EXISTS player_sheet_header (
                position INTEGER PRIMARY KEY,
                column_name TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS player_sheet_rows (
                position INTEGER PRIMARY KEY,
                record JSONB NOT NULL
            )",
        ] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(StoreError::Query)?;
        }

        info!("Player sheet tables ready");
        Ok(Self { pool, cache: None })
    }

    /// Store over a pool that connects on first use
    ///
    /// Nothing is checked or created up front; the first query reports an
    /// unreachable database.
    pub fn connect_lazy(config: &DatabaseConfig) -> StoreResult<Self> {
        let options: PgConnectOptions = config
            .database_url
            .parse()
            .map_err(|e| StoreError::Configuration(format!("Invalid database URL: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy_with(options);

        Ok(Self { pool, cache: None })
    }

    /// Serve reads through `cache`
    pub fn with_cache(mut self, cache: RecordCache) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn header_is_empty(&self) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM player_sheet_header")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(count == 0)
    }

    async fn load_uncached(&self) -> StoreResult<Vec<PlayerRecord>> {
        if self.header_is_empty().await? {
            self.initialize_with_header(&PLAYER_COLUMNS).await?;
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT record FROM player_sheet_rows ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        rows.into_iter()
            .map(|row| {
                let Json(record): Json<PlayerRecord> =
                    row.try_get("record").map_err(StoreError::Query)?;
                Ok(record)
            })
            .collect()
    }
}

impl RecordStore for SheetStore {
    async fn load_all(&self) -> StoreResult<Vec<PlayerRecord>> {
        if let Some(cache) = &self.cache {
            match cache.get_records().await {
                Ok(Some(records)) => return Ok(records),
                Ok(None) => {}
                Err(e) => warn!("Record cache read failed: {}", e),
            }
        }

        let records = self.load_uncached().await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_records(&records).await {
                warn!("Record cache write failed: {}", e);
            }
        }

        Ok(records)
    }

    async fn save_all(&self, records: &[PlayerRecord]) -> StoreResult<SaveOutcome> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Query)?;

        sqlx::query("DELETE FROM player_sheet_rows")
            .execute(&mut *tx)
            .await
            .map_err(StoreError::Query)?;

        for (position, record) in records.iter().enumerate() {
            sqlx::query("INSERT INTO player_sheet_rows (position, record) VALUES ($1, $2)")
                .bind(position as i32)
                .bind(Json(record))
                .execute(&mut *tx)
                .await
                .map_err(StoreError::Query)?;
        }

        tx.commit().await.map_err(StoreError::Query)?;
        info!("Saved {} player records", records.len());

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate().await {
                warn!("Record cache invalidation failed: {}", e);
            }
        }

        Ok(SaveOutcome::Persisted)
    }

    async fn initialize_with_header(&self, columns: &[&str]) -> StoreResult<()> {
        if !self.header_is_empty().await? {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(StoreError::Query)?;
        for (position, column) in columns.iter().enumerate() {
            sqlx::query("INSERT INTO player_sheet_header (position, column_name) VALUES ($1, $2)")
                .bind(position as i32)
                .bind(*column)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::Query)?;
        }
        tx.commit().await.map_err(StoreError::Query)?;

        info!("Initialized sheet header with {} columns", columns.len());
        Ok(())
    }
}
