//! Team data: roster, line configurations, and season statistics.
//! These are immutable per-call snapshots produced by upstream pipelines;
//! nothing in the simulation core fetches or mutates them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::player::PlayerId;

pub type TeamId = u32;

/// Ice zones used by the shot-location model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Slot,
    HighSlot,
    LeftCircle,
    RightCircle,
    LeftPoint,
    RightPoint,
    BehindNet,
    NeutralZone,
}

impl Zone {
    pub const ALL: [Zone; 8] = [
        Zone::Slot,
        Zone::HighSlot,
        Zone::LeftCircle,
        Zone::RightCircle,
        Zone::LeftPoint,
        Zone::RightPoint,
        Zone::BehindNet,
        Zone::NeutralZone,
    ];

    /// Zones that carry matchup-advantage reporting. Behind-net and the
    /// neutral zone produce too few scoring chances to matter there.
    pub const SCORING: [Zone; 6] = [
        Zone::Slot,
        Zone::HighSlot,
        Zone::LeftCircle,
        Zone::RightCircle,
        Zone::LeftPoint,
        Zone::RightPoint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Slot => "slot",
            Zone::HighSlot => "high_slot",
            Zone::LeftCircle => "left_circle",
            Zone::RightCircle => "right_circle",
            Zone::LeftPoint => "left_point",
            Zone::RightPoint => "right_point",
            Zone::BehindNet => "behind_net",
            Zone::NeutralZone => "neutral_zone",
        }
    }

    /// Default per-shot scoring probability for the zone.
    pub const fn base_xg_rate(self) -> f64 {
        match self {
            Zone::Slot => 0.18,
            Zone::HighSlot => 0.10,
            Zone::LeftCircle | Zone::RightCircle => 0.08,
            Zone::LeftPoint | Zone::RightPoint => 0.03,
            Zone::BehindNet => 0.02,
            Zone::NeutralZone => 0.01,
        }
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Forward,
    Defense,
}

/// A forward line (1-4) or defensive pairing (1-3) with the aggregate
/// on-ice metrics the matchup and xG models consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfiguration {
    pub line_number: u8,
    pub line_type: LineType,
    #[serde(default)]
    pub player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub chemistry_score: f64,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub corsi_percentage: f64,
    #[serde(default)]
    pub expected_goals_percentage: f64,
    #[serde(default)]
    pub time_on_ice_seconds: u32,
}

impl LineConfiguration {
    pub fn new(line_number: u8, line_type: LineType) -> Self {
        Self {
            line_number,
            line_type,
            player_ids: Vec::new(),
            chemistry_score: 0.0,
            goals_for: 0,
            goals_against: 0,
            corsi_percentage: 0.0,
            expected_goals_percentage: 0.0,
            time_on_ice_seconds: 0,
        }
    }

    pub fn goals_for_percentage(&self) -> f64 {
        let total = self.goals_for + self.goals_against;
        if total > 0 {
            f64::from(self.goals_for) / f64::from(total)
        } else {
            0.5
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub forwards: Vec<PlayerId>,
    #[serde(default)]
    pub defensemen: Vec<PlayerId>,
    #[serde(default)]
    pub goalies: Vec<PlayerId>,
}

impl TeamRoster {
    pub fn all_skaters(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.forwards.iter().chain(self.defensemen.iter()).copied()
    }

    pub fn all_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.forwards
            .iter()
            .chain(self.defensemen.iter())
            .chain(self.goalies.iter())
            .copied()
    }
}

/// Season-level team statistics. Zone maps may be sparse; missing zones fall
/// back to a neutral shot share inside the xG calculator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub overtime_losses: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub shots_for: u32,
    #[serde(default)]
    pub shots_against: u32,
    #[serde(default)]
    pub corsi_percentage: f64,
    #[serde(default)]
    pub expected_goals_for: f64,
    #[serde(default)]
    pub expected_goals_against: f64,

    // Special teams (percentages on the 0-100 scale reported upstream)
    #[serde(default)]
    pub power_play_percentage: f64,
    #[serde(default)]
    pub power_play_opportunities: u32,
    #[serde(default)]
    pub penalty_kill_percentage: f64,
    #[serde(default)]
    pub penalty_kill_opportunities: u32,

    #[serde(default)]
    pub zone_shots_for: BTreeMap<Zone, u32>,
    #[serde(default)]
    pub zone_shots_against: BTreeMap<Zone, u32>,

    // Per-segment goal splits
    #[serde(default)]
    pub early_game_goals_for: u32,
    #[serde(default)]
    pub early_game_goals_against: u32,
    #[serde(default)]
    pub mid_game_goals_for: u32,
    #[serde(default)]
    pub mid_game_goals_against: u32,
    #[serde(default)]
    pub late_game_goals_for: u32,
    #[serde(default)]
    pub late_game_goals_against: u32,
}

impl TeamStats {
    pub fn goal_differential(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    pub fn shooting_percentage(&self) -> f64 {
        if self.shots_for > 0 {
            f64::from(self.goals_for) / f64::from(self.shots_for)
        } else {
            0.0
        }
    }

    pub fn save_percentage(&self) -> f64 {
        if self.shots_against == 0 {
            1.0
        } else {
            1.0 - f64::from(self.goals_against) / f64::from(self.shots_against)
        }
    }
}

/// Complete team snapshot: identity, roster, lines, season stats, and the
/// per-zone heat maps (0-1 strength ratings aggregated upstream).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub roster: TeamRoster,
    #[serde(default)]
    pub forward_lines: Vec<LineConfiguration>,
    #[serde(default)]
    pub defense_pairs: Vec<LineConfiguration>,
    #[serde(default)]
    pub starting_goalie_id: Option<PlayerId>,
    #[serde(default)]
    pub stats: TeamStats,
    #[serde(default)]
    pub offensive_heat_map: BTreeMap<Zone, f64>,
    #[serde(default)]
    pub defensive_heat_map: BTreeMap<Zone, f64>,
}

impl Team {
    pub fn new(team_id: TeamId, name: impl Into<String>) -> Self {
        Self {
            team_id,
            name: name.into(),
            abbreviation: String::new(),
            roster: TeamRoster::default(),
            forward_lines: Vec::new(),
            defense_pairs: Vec::new(),
            starting_goalie_id: None,
            stats: TeamStats::default(),
            offensive_heat_map: BTreeMap::new(),
            defensive_heat_map: BTreeMap::new(),
        }
    }

    /// Strength rating (0-1) for a zone, from the aggregated heat maps.
    /// Unknown zones rate 0.0, which the calculators treat as neutral.
    pub fn zone_strength(&self, zone: Zone, offensive: bool) -> f64 {
        let map = if offensive {
            &self.offensive_heat_map
        } else {
            &self.defensive_heat_map
        };
        map.get(&zone).copied().unwrap_or(0.0)
    }

    pub fn get_line(&self, line_number: u8, line_type: LineType) -> Option<&LineConfiguration> {
        let lines = match line_type {
            LineType::Forward => &self.forward_lines,
            LineType::Defense => &self.defense_pairs,
        };
        lines.iter().find(|line| line.line_number == line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_rates_cover_all_zones() {
        for zone in Zone::ALL {
            assert!(zone.base_xg_rate() > 0.0);
        }
    }

    #[test]
    fn zone_strength_defaults_to_zero() {
        let team = Team::new(1, "Test");
        assert_eq!(team.zone_strength(Zone::Slot, true), 0.0);
        assert_eq!(team.zone_strength(Zone::Slot, false), 0.0);
    }

    #[test]
    fn goals_for_percentage_neutral_without_goals() {
        let line = LineConfiguration::new(1, LineType::Forward);
        assert_eq!(line.goals_for_percentage(), 0.5);
    }

    #[test]
    fn save_percentage_without_shots_is_perfect() {
        let stats = TeamStats::default();
        assert_eq!(stats.save_percentage(), 1.0);
    }
}
