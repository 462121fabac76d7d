//! Player input validation

use common::records::PlayerRecord;
use regex::Regex;
use std::sync::OnceLock;

/// Validate a player before it is written to the sheet
pub fn validate_player(player: &PlayerRecord) -> Result<(), String> {
    if player.name.trim().is_empty() || player.team.trim().is_empty() {
        return Err("Player name and team are required".to_string());
    }

    if !(16..=50).contains(&player.age) {
        return Err("Age must be between 16 and 50".to_string());
    }

    if !(150..=220).contains(&player.height_cm) {
        return Err("Height must be between 150 and 220 cm".to_string());
    }

    validate_market_value(&player.market_value)?;

    if let (Some(start), Some(end)) = (player.contract_start, player.contract_end) {
        if end < start {
            return Err("Contract end date is before the start date".to_string());
        }
    }

    Ok(())
}

/// Validate a market value such as `15M€`, `800K€` or `2.5M`
pub fn validate_market_value(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Ok(());
    }

    static MARKET_VALUE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = MARKET_VALUE_REGEX.get_or_init(|| {
        Regex::new(r"^\d+(?:[.,]\d+)?\s?[KkMm]?\s?€?$").expect("Failed to compile market value regex")
    });

    if !regex.is_match(value.trim()) {
        return Err("Market value must look like 15M€".to_string());
    }

    Ok(())
}
