//! Player record schema
//!
//! Records are stored with the column headers of the scouting sheet as
//! keys, so the serialized form of a [`PlayerRecord`] is one sheet row.
//! Columns that are not part of the fixed schema are kept in
//! [`PlayerRecord::extra`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sheet header, in column order
pub const PLAYER_COLUMNS: [&str; 20] = [
    "Nome Giocatore",
    "Squadra",
    "Età",
    "Ruolo",
    "Valore di Mercato",
    "Procuratore",
    "Altezza",
    "Piede",
    "Convocazioni",
    "Partite Giocate",
    "Gol",
    "Assist",
    "Minuti Giocati",
    "Data Inizio Contratto",
    "Data Fine Contratto",
    "Da Monitorare",
    "Note Danilo/Antonio",
    "Note Alessio/Fabrizio",
    "Presentato a Miniero",
    "Risposta Miniero",
];

/// Playing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Portiere")]
    Goalkeeper,
    #[serde(rename = "Difensore Centrale")]
    CentreBack,
    #[serde(rename = "Terzino Destro")]
    RightBack,
    #[serde(rename = "Terzino Sinistro")]
    LeftBack,
    #[serde(rename = "Centrocampista Difensivo")]
    DefensiveMidfielder,
    #[serde(rename = "Centrocampista")]
    Midfielder,
    #[serde(rename = "Centrocampista Offensivo")]
    AttackingMidfielder,
    #[serde(rename = "Ala Destra")]
    RightWinger,
    #[serde(rename = "Ala Sinistra")]
    LeftWinger,
    #[serde(rename = "Attaccante")]
    Striker,
    #[serde(rename = "Seconda Punta")]
    SecondStriker,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Goalkeeper,
        Role::CentreBack,
        Role::RightBack,
        Role::LeftBack,
        Role::DefensiveMidfielder,
        Role::Midfielder,
        Role::AttackingMidfielder,
        Role::RightWinger,
        Role::LeftWinger,
        Role::Striker,
        Role::SecondStriker,
    ];

    /// Label used in the sheet
    pub fn label(&self) -> &'static str {
        match self {
            Role::Goalkeeper => "Portiere",
            Role::CentreBack => "Difensore Centrale",
            Role::RightBack => "Terzino Destro",
            Role::LeftBack => "Terzino Sinistro",
            Role::DefensiveMidfielder => "Centrocampista Difensivo",
            Role::Midfielder => "Centrocampista",
            Role::AttackingMidfielder => "Centrocampista Offensivo",
            Role::RightWinger => "Ala Destra",
            Role::LeftWinger => "Ala Sinistra",
            Role::Striker => "Attaccante",
            Role::SecondStriker => "Seconda Punta",
        }
    }

    /// Parse a sheet label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Role> {
        let label = label.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.label().eq_ignore_ascii_case(label))
    }
}

/// Preferred foot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Foot {
    #[serde(rename = "Destro")]
    Right,
    #[serde(rename = "Sinistro")]
    Left,
    #[serde(rename = "Ambidestro")]
    Both,
}

/// One row of the scouting sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(rename = "Nome Giocatore")]
    pub name: String,
    #[serde(rename = "Squadra")]
    pub team: String,
    #[serde(rename = "Età")]
    pub age: u32,
    #[serde(rename = "Ruolo")]
    pub role: Role,
    #[serde(rename = "Valore di Mercato", default)]
    pub market_value: String,
    #[serde(rename = "Procuratore", default)]
    pub agent: String,
    #[serde(rename = "Altezza")]
    pub height_cm: u32,
    #[serde(rename = "Piede")]
    pub foot: Foot,
    #[serde(rename = "Convocazioni", default)]
    pub call_ups: u32,
    #[serde(rename = "Partite Giocate", default)]
    pub appearances: u32,
    #[serde(rename = "Gol", default)]
    pub goals: u32,
    #[serde(rename = "Assist", default)]
    pub assists: u32,
    #[serde(rename = "Minuti Giocati", default)]
    pub minutes_played: u32,
    #[serde(rename = "Data Inizio Contratto", default)]
    pub contract_start: Option<NaiveDate>,
    #[serde(rename = "Data Fine Contratto", default)]
    pub contract_end: Option<NaiveDate>,
    #[serde(rename = "Da Monitorare", with = "x_flag", default)]
    pub to_monitor: bool,
    #[serde(rename = "Note Danilo/Antonio", default)]
    pub notes_danilo_antonio: String,
    #[serde(rename = "Note Alessio/Fabrizio", default)]
    pub notes_alessio_fabrizio: String,
    #[serde(rename = "Presentato a Miniero", with = "x_flag", default)]
    pub presented_to_miniero: bool,
    #[serde(rename = "Risposta Miniero", default)]
    pub miniero_response: String,
    /// Columns added to the sheet by hand
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Sheet checkbox columns hold `"X"` when set and `""` otherwise
pub mod x_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "X" } else { "" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(is_set(&raw))
    }

    /// Flag that may be left out, as in partial updates
    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(is_set))
    }

    fn is_set(raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case("x")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PlayerRecord {
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
            presented_to_miniero: false,
            miniero_response: String::new(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_record_serializes_with_sheet_headers() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        for column in PLAYER_COLUMNS {
            assert!(object.contains_key(column), "missing column {column}");
        }
        assert_eq!(object.len(), PLAYER_COLUMNS.len());
        assert_eq!(value["Da Monitorare"], json!("X"));
        assert_eq!(value["Presentato a Miniero"], json!(""));
        assert_eq!(value["Ruolo"], json!("Centrocampista"));
        assert_eq!(value["Data Inizio Contratto"], json!("2022-07-01"));
    }

    #[test]
    fn test_unknown_columns_are_kept_in_extra() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["Nazionalità"] = json!("Italiana");

        let record: PlayerRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.extra.get("Nazionalità"), Some(&json!("Italiana")));
        assert!(record.to_monitor);
    }

    #[test]
    fn test_flag_parsing_is_lenient() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["Da Monitorare"] = json!(" x ");
        value["Presentato a Miniero"] = json!("no");

        let record: PlayerRecord = serde_json::from_value(value).unwrap();
        assert!(record.to_monitor);
        assert!(!record.presented_to_miniero);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::from_label("attaccante"), Some(Role::Striker));
        assert_eq!(Role::from_label(" Ala Destra "), Some(Role::RightWinger));
        assert_eq!(Role::from_label("Libero"), None);
        for role in Role::ALL {
            assert_eq!(Role::from_label(role.label()), Some(role));
        }
    }
}
