//! API models for request and response payloads

use auth::session::SessionState;
use common::records::{PlayerRecord, x_flag};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for a successful login
#[derive(Serialize)]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub username: String,
    /// Token to carry under the `auth` query parameter
    pub auth: String,
    pub message: String,
}

/// Current browsing session
#[derive(Serialize)]
pub struct SessionResponse {
    pub session: SessionState,
    pub demo_mode: bool,
}

/// Request for tab or record selection changes
#[derive(Debug, Deserialize)]
pub struct NavigationRequest {
    pub active_tab: Option<usize>,
    pub selected_record_index: Option<usize>,
}

/// Query parameters for player search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerQuery {
    /// Case-insensitive substring of the player name
    pub name: Option<String>,
    /// Comma-separated team names
    pub squads: Option<String>,
    /// Comma-separated role labels
    pub roles: Option<String>,
}

/// Player together with its position in the sheet
#[derive(Debug, Serialize)]
pub struct IndexedPlayer {
    pub index: usize,
    pub player: PlayerRecord,
}

/// Response for player listing
#[derive(Debug, Serialize)]
pub struct PlayerListResponse {
    pub players: Vec<IndexedPlayer>,
    pub total: usize,
    pub demo_mode: bool,
    pub notice: Option<&'static str>,
}

/// Fields editable on an existing player
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerUpdate {
    #[serde(rename = "Nome Giocatore")]
    pub name: Option<String>,
    #[serde(rename = "Squadra")]
    pub team: Option<String>,
    #[serde(rename = "Età")]
    pub age: Option<u32>,
    #[serde(
        rename = "Da Monitorare",
        default,
        deserialize_with = "x_flag::deserialize_option"
    )]
    pub to_monitor: Option<bool>,
    #[serde(
        rename = "Presentato a Miniero",
        default,
        deserialize_with = "x_flag::deserialize_option"
    )]
    pub presented_to_miniero: Option<bool>,
    #[serde(rename = "Note Danilo/Antonio")]
    pub notes_danilo_antonio: Option<String>,
    #[serde(rename = "Note Alessio/Fabrizio")]
    pub notes_alessio_fabrizio: Option<String>,
    #[serde(rename = "Risposta Miniero")]
    pub miniero_response: Option<String>,
}

/// Response for player writes
#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub message: String,
    pub index: Option<usize>,
    pub demo_mode: bool,
    pub notice: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_update_reads_sheet_flags() {
        let update: PlayerUpdate = serde_json::from_value(json!({
            "Da Monitorare": "X",
            "Presentato a Miniero": "",
        }))
        .unwrap();
        assert_eq!(update.to_monitor, Some(true));
        assert_eq!(update.presented_to_miniero, Some(false));

        let update: PlayerUpdate = serde_json::from_value(json!({ "Età": 30 })).unwrap();
        assert_eq!(update.to_monitor, None);
        assert_eq!(update.presented_to_miniero, None);

        assert!(serde_json::from_value::<PlayerUpdate>(json!({ "Da Monitorare": true })).is_err());
    }
}
