//! Demo mode backend
//!
//! Serves a fixed pair of players when no record store is configured.
//! Writes are accepted and dropped.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::{
    error::StoreResult,
    records::{Foot, PlayerRecord, Role},
    store::{RecordStore, SaveOutcome},
};

/// Notice displayed while demo mode is active
pub const DEMO_NOTICE: &str = "Demo mode: data is not saved permanently";

/// In-memory fixture store
#[derive(Debug, Clone)]
pub struct DemoStore {
    fixture: Arc<Vec<PlayerRecord>>,
}

impl DemoStore {
    pub fn new() -> Self {
        Self {
            fixture: Arc::new(fixture()),
        }
    }
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for DemoStore {
    async fn load_all(&self) -> StoreResult<Vec<PlayerRecord>> {
        Ok(self.fixture.as_ref().clone())
    }

    async fn save_all(&self, records: &[PlayerRecord]) -> StoreResult<SaveOutcome> {
        info!("Demo mode: discarding write of {} records", records.len());
        Ok(SaveOutcome::Discarded)
    }

    async fn initialize_with_header(&self, _columns: &[&str]) -> StoreResult<()> {
        Ok(())
    }
}

fn fixture() -> Vec<PlayerRecord> {
    vec![
        PlayerRecord {
            name: "Mario Rossi".to_string(),
            team: "Juventus".to_string(),
            age: 25,
            role: Role::Midfielder,
            market_value: "15M€".to_string(),
            agent: "Raiola".to_string(),
            height_cm: 180,
            foot: Foot::Right,
            call_ups: 45,
            appearances: 38,
            goals: 8,
            assists: 12,
            minutes_played: 3200,
            contract_start: NaiveDate::from_ymd_opt(2022, 7, 1),
            contract_end: NaiveDate::from_ymd_opt(2025, 6, 30),
            to_monitor: true,
            notes_danilo_antonio: "Buon potenziale".to_string(),
            notes_alessio_fabrizio: "Da seguire".to_string(),
            presented_to_miniero: true,
            miniero_response: "Interessante".to_string(),
            extra: BTreeMap::new(),
        },
        PlayerRecord {
            name: "Luca Bianchi".to_string(),
            team: "Milan".to_string(),
            age: 28,
            role: Role::Striker,
            market_value: "20M€".to_string(),
            agent: "Mendes".to_string(),
            height_cm: 175,
            foot: Foot::Left,
            call_ups: 52,
            appearances: 41,
            goals: 15,
            assists: 7,
            minutes_played: 3650,
            contract_start: NaiveDate::from_ymd_opt(2021, 8, 15),
            contract_end: NaiveDate::from_ymd_opt(2024, 7, 31),
            to_monitor: false,
            notes_danilo_antonio: "Ottimo in zona gol".to_string(),
            notes_alessio_fabrizio: "Pronto per il salto".to_string(),
            presented_to_miniero: false,
            miniero_response: "Da valutare".to_string(),
            extra: BTreeMap::new(),
        },
    ]
}
