//! Common library for the scouting application
//!
//! This crate provides the player record schema and the record store
//! collaborator shared by the services: a PostgreSQL-backed sheet with an
//! optional Redis read cache, and an in-memory demo fixture used when no
//! store is configured.

pub mod cache;
pub mod database;
pub mod demo;
pub mod error;
pub mod records;
pub mod store;

/// Example usage of the record store
///
/// ```rust,no_run
/// use common::{
///     cache::RedisConfig,
///     database::DatabaseConfig,
///     store::{PlayerStore, RecordStore},
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = PlayerStore::connect(DatabaseConfig::from_env(), RedisConfig::from_env()).await;
///     let players = store.load_all().await?;
///     println!("{} players (demo mode: {})", players.len(), store.is_demo());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
