//! Player search, dashboard statistics and edits

use common::records::{PlayerRecord, Role};
use serde::Serialize;

use crate::models::{PlayerQuery, PlayerUpdate};

/// Search filter built from [`PlayerQuery`]
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    name: Option<String>,
    squads: Vec<String>,
    roles: Vec<Role>,
}

impl PlayerFilter {
    /// Parse query parameters; unknown role labels are rejected
    pub fn from_query(query: &PlayerQuery) -> Result<Self, String> {
        let name = query
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase);

        let squads = split_list(query.squads.as_deref())
            .map(str::to_string)
            .collect();

        let roles = split_list(query.roles.as_deref())
            .map(|label| Role::from_label(label).ok_or_else(|| format!("Unknown role: {}", label)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            squads,
            roles,
        })
    }

    pub fn matches(&self, player: &PlayerRecord) -> bool {
        if let Some(name) = &self.name {
            if !player.name.to_lowercase().contains(name) {
                return false;
            }
        }

        if !self.squads.is_empty() && !self.squads.contains(&player.team) {
            return false;
        }

        if !self.roles.is_empty() && !self.roles.contains(&player.role) {
            return false;
        }

        true
    }

    /// Matching players with their sheet positions
    pub fn apply<'a>(&self, players: &'a [PlayerRecord]) -> Vec<(usize, &'a PlayerRecord)> {
        players
            .iter()
            .enumerate()
            .filter(|(_, player)| self.matches(player))
            .collect()
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub monitored: usize,
    pub presented: usize,
    pub average_age: f64,
}

impl DashboardStats {
    pub fn from_players(players: &[PlayerRecord]) -> Self {
        let total = players.len();
        let average_age = if total == 0 {
            0.0
        } else {
            players.iter().map(|p| p.age as f64).sum::<f64>() / total as f64
        };

        Self {
            total,
            monitored: players.iter().filter(|p| p.to_monitor).count(),
            presented: players.iter().filter(|p| p.presented_to_miniero).count(),
            average_age,
        }
    }
}

/// Copy the provided fields of `update` onto `player`
pub fn apply_update(player: &mut PlayerRecord, update: PlayerUpdate) {
    if let Some(name) = update.name {
        player.name = name;
    }
    if let Some(team) = update.team {
        player.team = team;
    }
    if let Some(age) = update.age {
        player.age = age;
    }
    if let Some(to_monitor) = update.to_monitor {
        player.to_monitor = to_monitor;
    }
    if let Some(presented) = update.presented_to_miniero {
        player.presented_to_miniero = presented;
    }
    if let Some(notes) = update.notes_danilo_antonio {
        player.notes_danilo_antonio = notes;
    }
    if let Some(notes) = update.notes_alessio_fabrizio {
        player.notes_alessio_fabrizio = notes;
    }
    if let Some(response) = update.miniero_response {
        player.miniero_response = response;
    }
}
