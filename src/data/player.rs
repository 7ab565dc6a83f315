//! Player data: career statistics, zone-level shot profiles, and goalie
//! numbers. Snapshots only; the core never refreshes them mid-run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::team::Zone;

pub type PlayerId = u32;

/// Player lookup for one simulation call. An empty map means no
/// player-level data was supplied and team-level fallbacks apply.
pub type PlayerMap = BTreeMap<PlayerId, Player>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goalie,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ZoneStats {
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub expected_goals: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub time_on_ice_seconds: u32,
    #[serde(default)]
    pub corsi_percentage: f64,
    #[serde(default)]
    pub expected_goals_for: f64,
    #[serde(default)]
    pub expected_goals_against: f64,
    #[serde(default)]
    pub zone_stats: BTreeMap<Zone, ZoneStats>,

    // Per-segment production splits (inputs to fatigue indicators)
    #[serde(default)]
    pub early_game_points: u32,
    #[serde(default)]
    pub mid_game_points: u32,
    #[serde(default)]
    pub late_game_points: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GoalieStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub save_percentage: f64,
    #[serde(default)]
    pub goals_against_average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub career_stats: PlayerStats,
    #[serde(default)]
    pub goalie_stats: Option<GoalieStats>,
    /// Pairwise chemistry with other players (0-1), from the synergy
    /// pipeline. Used when no line-level chemistry score is stored.
    #[serde(default)]
    pub synergies: BTreeMap<PlayerId, f64>,
    /// Whole-game fatigue scalar from schedule enrichment; 1.0 = rested.
    #[serde(default = "default_fatigue_factor")]
    pub fatigue_factor: f64,
}

fn default_fatigue_factor() -> f64 {
    1.0
}

impl Player {
    pub fn new(player_id: PlayerId, name: impl Into<String>, position: Position) -> Self {
        Self {
            player_id,
            name: name.into(),
            position,
            career_stats: PlayerStats::default(),
            goalie_stats: None,
            synergies: BTreeMap::new(),
            fatigue_factor: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatigue_factor_defaults_to_rested() {
        let player = Player::new(7, "Skater", Position::Center);
        assert_eq!(player.fatigue_factor, 1.0);

        let parsed: Player =
            serde_json::from_str(r#"{"player_id":7,"name":"Skater","position":"center"}"#)
                .expect("player json");
        assert_eq!(parsed.fatigue_factor, 1.0);
    }
}
