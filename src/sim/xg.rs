//! Zone-based expected goals.
//!
//! Converts team shot-location tendencies and zone strength heat maps into
//! per-team baseline scoring rates. Every value object produced here is
//! owned by one simulation call and frozen after construction; the single
//! home-ice multiplier in [ExpectedGoalsCalculator::calculate_matchup_xg]
//! is the only post-construction touch.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::player::{PlayerId, PlayerMap};
use crate::data::team::{LineConfiguration, LineType, Team, TeamId, Zone};

/// Applied to the home side's scoring rates once per matchup call, never
/// per iteration.
pub const HOME_ICE_MULTIPLIER: f64 = 1.03;

const EVEN_STRENGTH_SHARE: f64 = 0.75;
const EARLY_SHARE: f64 = 0.30;
const MID_SHARE: f64 = 0.35;
const LATE_SHARE: f64 = 0.35;

/// Expected goals breakdown for one ice zone.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ZoneExpectedGoals {
    pub zone: Zone,
    pub offensive_xg: f64,
    pub defensive_xg_against: f64,
    pub shot_volume: f64,
}

impl ZoneExpectedGoals {
    pub fn net_xg(&self) -> f64 {
        self.offensive_xg - self.defensive_xg_against
    }
}

/// Expected goals for one line configuration, with adjustment scalars the
/// matchup analyzer fills in.
#[derive(Debug, Clone, Serialize)]
pub struct LineExpectedGoals {
    pub line_number: u8,
    pub line_type: LineType,
    pub player_ids: Vec<PlayerId>,
    pub offensive_xg_per_60: f64,
    pub defensive_xg_against_per_60: f64,
    pub zone_xg: BTreeMap<Zone, ZoneExpectedGoals>,
    pub synergy_modifier: f64,
}

impl LineExpectedGoals {
    pub fn adjusted_offensive_xg(&self) -> f64 {
        self.offensive_xg_per_60 * self.synergy_modifier
    }
}

/// Per-team derived scoring rates for one simulation call.
#[derive(Debug, Clone, Serialize)]
pub struct TeamExpectedGoals {
    pub team_id: TeamId,
    pub total_xg_for: f64,
    pub total_xg_against: f64,

    // Situation buckets
    pub even_strength_xg_for: f64,
    pub power_play_xg_for: f64,
    pub penalty_kill_xg_against: f64,

    // Segment decomposition of the "for" total
    pub early_game_xg_for: f64,
    pub mid_game_xg_for: f64,
    pub late_game_xg_for: f64,

    pub zone_xg: BTreeMap<Zone, ZoneExpectedGoals>,
    pub line_xg: Vec<LineExpectedGoals>,
}

impl TeamExpectedGoals {
    pub fn net_xg(&self) -> f64 {
        self.total_xg_for - self.total_xg_against
    }

    pub fn xg_percentage(&self) -> f64 {
        let total = self.total_xg_for + self.total_xg_against;
        if total > 0.0 {
            self.total_xg_for / total
        } else {
            0.5
        }
    }
}

/// Zone-based expected goals calculator. Stateless; per-shot zone rates
/// come from [Zone] unless overridden.
#[derive(Debug, Clone, Default)]
pub struct ExpectedGoalsCalculator {
    zone_rate_overrides: BTreeMap<Zone, f64>,
}

impl ExpectedGoalsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone_rate(mut self, zone: Zone, rate: f64) -> Self {
        self.zone_rate_overrides.insert(zone, rate);
        self
    }

    fn zone_rate(&self, zone: Zone) -> f64 {
        self.zone_rate_overrides
            .get(&zone)
            .copied()
            .unwrap_or_else(|| zone.base_xg_rate())
    }

    /// Baseline xG for `team` against `opponent`, no home-ice edge.
    pub fn calculate_team_xg(
        &self,
        team: &Team,
        opponent: &Team,
        players: &PlayerMap,
    ) -> TeamExpectedGoals {
        let mut result = self.accumulate_zones(team, opponent, players);
        self.finalize(&mut result, team, opponent);
        result
    }

    /// Baseline xG for both sides of a matchup. The home-ice multiplier is
    /// applied to the home "for" total and the away "against" total exactly
    /// once, before the situation and segment decomposition so the edge
    /// reaches the per-segment draws.
    pub fn calculate_matchup_xg(
        &self,
        home_team: &Team,
        away_team: &Team,
        players: &PlayerMap,
    ) -> (TeamExpectedGoals, TeamExpectedGoals) {
        let mut home = self.accumulate_zones(home_team, away_team, players);
        let mut away = self.accumulate_zones(away_team, home_team, players);

        home.total_xg_for *= HOME_ICE_MULTIPLIER;
        away.total_xg_against *= HOME_ICE_MULTIPLIER;

        self.finalize(&mut home, home_team, away_team);
        self.finalize(&mut away, away_team, home_team);
        (home, away)
    }

    /// Zone sums and per-line breakdowns, totals not yet decomposed.
    fn accumulate_zones(
        &self,
        team: &Team,
        opponent: &Team,
        players: &PlayerMap,
    ) -> TeamExpectedGoals {
        let mut result = TeamExpectedGoals {
            team_id: team.team_id,
            total_xg_for: 0.0,
            total_xg_against: 0.0,
            even_strength_xg_for: 0.0,
            power_play_xg_for: 0.0,
            penalty_kill_xg_against: 0.0,
            early_game_xg_for: 0.0,
            mid_game_xg_for: 0.0,
            late_game_xg_for: 0.0,
            zone_xg: BTreeMap::new(),
            line_xg: Vec::new(),
        };

        for zone in Zone::ALL {
            let zone_xg = self.calculate_zone_xg(team, opponent, zone);
            result.total_xg_for += zone_xg.offensive_xg;
            result.total_xg_against += zone_xg.defensive_xg_against;
            result.zone_xg.insert(zone, zone_xg);
        }

        for line in &team.forward_lines {
            result.line_xg.push(self.calculate_line_xg(line, players));
        }
        for pair in &team.defense_pairs {
            result.line_xg.push(self.calculate_line_xg(pair, players));
        }

        result
    }

    fn finalize(&self, result: &mut TeamExpectedGoals, team: &Team, opponent: &Team) {
        result.even_strength_xg_for = result.total_xg_for * EVEN_STRENGTH_SHARE;
        result.power_play_xg_for = power_play_xg(team);
        result.penalty_kill_xg_against = penalty_kill_xg_against(team, opponent);

        result.early_game_xg_for = result.total_xg_for * EARLY_SHARE;
        result.mid_game_xg_for = result.total_xg_for * MID_SHARE;
        result.late_game_xg_for = result.total_xg_for * LATE_SHARE;
    }

    fn calculate_zone_xg(&self, team: &Team, opponent: &Team, zone: Zone) -> ZoneExpectedGoals {
        let base_rate = self.zone_rate(zone);

        let offense = team.zone_strength(zone, true);
        let defense = opponent.zone_strength(zone, false);
        let modifier = (1.0 + offense) / (1.0 + defense);
        let shots_per_game = zone_shots_per_game(team, zone);

        let opp_offense = opponent.zone_strength(zone, true);
        let own_defense = team.zone_strength(zone, false);
        let against_modifier = (1.0 + opp_offense) / (1.0 + own_defense);
        let opp_shots_per_game = zone_shots_per_game(opponent, zone);

        ZoneExpectedGoals {
            zone,
            offensive_xg: shots_per_game * base_rate * modifier,
            defensive_xg_against: opp_shots_per_game * base_rate * against_modifier,
            shot_volume: shots_per_game,
        }
    }

    fn calculate_line_xg(&self, line: &LineConfiguration, players: &PlayerMap) -> LineExpectedGoals {
        let toi_minutes = if line.time_on_ice_seconds > 0 {
            f64::from(line.time_on_ice_seconds) / 60.0
        } else {
            60.0
        };
        let rate_from_goals = f64::from(line.goals_for) / toi_minutes * 60.0;
        // xG% scaled to a per-60 rate so unplayed lines still get a baseline
        let offensive_xg_per_60 = rate_from_goals.max(line.expected_goals_percentage * 5.0);
        let defensive_xg_against_per_60 = f64::from(line.goals_against) / toi_minutes * 60.0;

        let synergy_modifier = if line.chemistry_score > 0.0 {
            1.0 + line.chemistry_score / 10.0
        } else {
            1.0
        };

        let mut zone_xg = BTreeMap::new();
        if !players.is_empty() {
            for zone in Zone::ALL {
                zone_xg.insert(zone, line_zone_xg(line, players, zone));
            }
        }

        LineExpectedGoals {
            line_number: line.line_number,
            line_type: line.line_type,
            player_ids: line.player_ids.clone(),
            offensive_xg_per_60,
            defensive_xg_against_per_60,
            zone_xg,
            synergy_modifier,
        }
    }
}

/// Estimated shots per game for a zone, from the team's observed zone shot
/// share. Zero shots or games fall back to a uniform 1/6 share and a one
/// shot floor.
fn zone_shots_per_game(team: &Team, zone: Zone) -> f64 {
    let stats = &team.stats;
    let total_shots = stats.shots_for.max(1);
    let zone_shots = stats
        .zone_shots_for
        .get(&zone)
        .copied()
        .unwrap_or(total_shots / 6);
    let shot_share = if stats.shots_for > 0 {
        f64::from(zone_shots) / f64::from(total_shots)
    } else {
        1.0 / 6.0
    };

    let games = stats.games_played.max(1);
    let shots_per_game = f64::from(stats.shots_for) / f64::from(games) * shot_share;
    shots_per_game.max(1.0)
}

fn line_zone_xg(line: &LineConfiguration, players: &PlayerMap, zone: Zone) -> ZoneExpectedGoals {
    let mut offensive_xg = 0.0;
    let mut shot_volume = 0.0;
    let mut games_total = 0u32;
    let mut known_players = 0u32;

    for player_id in &line.player_ids {
        if let Some(player) = players.get(player_id) {
            if let Some(zone_stats) = player.career_stats.zone_stats.get(&zone) {
                offensive_xg += zone_stats.expected_goals;
                shot_volume += f64::from(zone_stats.shots);
            }
            games_total += player.career_stats.games_played;
            known_players += 1;
        }
    }

    let games = if known_players > 0 {
        (games_total / known_players).max(1)
    } else {
        1
    };

    ZoneExpectedGoals {
        zone,
        offensive_xg: offensive_xg / f64::from(games),
        defensive_xg_against: 0.0,
        shot_volume: shot_volume / f64::from(games),
    }
}

fn power_play_xg(team: &Team) -> f64 {
    let stats = &team.stats;
    let pp_rate = if stats.power_play_percentage > 0.0 {
        stats.power_play_percentage / 100.0
    } else {
        0.20
    };
    let opportunities_per_game =
        f64::from(stats.power_play_opportunities) / f64::from(stats.games_played.max(1));
    opportunities_per_game * pp_rate
}

fn penalty_kill_xg_against(team: &Team, opponent: &Team) -> f64 {
    let stats = &team.stats;
    let opp_stats = &opponent.stats;

    let pk_rate = if stats.penalty_kill_percentage > 0.0 {
        stats.penalty_kill_percentage / 100.0
    } else {
        0.80
    };
    let opp_pp_rate = if opp_stats.power_play_percentage > 0.0 {
        opp_stats.power_play_percentage / 100.0
    } else {
        0.20
    };

    let shorthanded_per_game =
        f64::from(stats.penalty_kill_opportunities) / f64::from(stats.games_played.max(1));
    let combined_rate = (1.0 - pk_rate + opp_pp_rate) / 2.0;
    shorthanded_per_game * combined_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::team::TeamStats;

    fn team_with_shots(team_id: TeamId, shots: u32, games: u32) -> Team {
        let mut team = Team::new(team_id, format!("Team {team_id}"));
        team.stats = TeamStats {
            games_played: games,
            shots_for: shots,
            ..TeamStats::default()
        };
        team
    }

    #[test]
    fn empty_zone_map_uses_uniform_share() {
        let team = team_with_shots(1, 1800, 60);
        // 30 shots/game, 1/6 per zone with the integer-share fallback
        assert!((zone_shots_per_game(&team, Zone::Slot) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_shots_floors_at_one() {
        let team = team_with_shots(1, 0, 0);
        assert_eq!(zone_shots_per_game(&team, Zone::Slot), 1.0);
    }

    #[test]
    fn home_ice_applied_once_before_decomposition() {
        let calc = ExpectedGoalsCalculator::new();
        let home = team_with_shots(1, 1800, 60);
        let away = team_with_shots(2, 1800, 60);
        let players = PlayerMap::new();

        let neutral = calc.calculate_team_xg(&home, &away, &players);
        let (home_xg, away_xg) = calc.calculate_matchup_xg(&home, &away, &players);

        assert!(
            (home_xg.total_xg_for - neutral.total_xg_for * HOME_ICE_MULTIPLIER).abs() < 1e-9
        );
        // Segment shares carry the edge too
        assert!(
            (home_xg.early_game_xg_for - home_xg.total_xg_for * 0.30).abs() < 1e-9
        );
        assert!(
            (away_xg.total_xg_against - neutral.total_xg_against * HOME_ICE_MULTIPLIER).abs()
                < 1e-9
        );
        // Away "for" side is untouched
        assert!((away_xg.total_xg_for - neutral.total_xg_for).abs() < 1e-9);
    }

    #[test]
    fn stronger_offense_raises_zone_xg() {
        let calc = ExpectedGoalsCalculator::new();
        let players = PlayerMap::new();
        let away = team_with_shots(2, 1800, 60);

        let mut strong = team_with_shots(1, 1800, 60);
        strong.offensive_heat_map.insert(Zone::Slot, 0.9);
        let weak = team_with_shots(3, 1800, 60);

        let strong_xg = calc.calculate_team_xg(&strong, &away, &players);
        let weak_xg = calc.calculate_team_xg(&weak, &away, &players);
        assert!(strong_xg.total_xg_for > weak_xg.total_xg_for);
    }

    #[test]
    fn line_xg_uses_chemistry_synergy() {
        let calc = ExpectedGoalsCalculator::new();
        let mut line = LineConfiguration::new(1, LineType::Forward);
        line.chemistry_score = 5.0;
        line.goals_for = 12;
        line.time_on_ice_seconds = 3600 * 4;

        let xg = calc.calculate_line_xg(&line, &PlayerMap::new());
        assert!((xg.synergy_modifier - 1.5).abs() < 1e-9);
        assert!(xg.adjusted_offensive_xg() > xg.offensive_xg_per_60);
    }
}
