//! Line-on-line matchup analysis.
//!
//! Produces a static [MatchupAnalysis] once per simulation call. Line
//! matchup selection is a greedy scan: each home line is paired with the
//! opposing line that maximizes its xG edge, ties broken by encounter
//! order. An away line can be picked more than once; this mirrors how a
//! home coach with last change chases favorable shifts and is not a
//! globally optimal assignment.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::analytics::{SynergySource, NO_ANALYTICS};
use crate::data::player::PlayerMap;
use crate::data::team::{LineConfiguration, LineType, Team, TeamId, Zone};
use crate::sim::models::{Segment, Side};

const DEFAULT_SAVE_PERCENTAGE: f64 = 0.910;
const STRENGTH_FLOOR: f64 = 0.3;
const STRENGTH_CEILING: f64 = 1.5;
const BASE_XG_PER_PERIOD: f64 = 0.5;

const ZONE_MISMATCH_THRESHOLD: f64 = 0.1;
const LINE_MISMATCH_THRESHOLD: f64 = 0.15;
const PP_MISMATCH_THRESHOLD: f64 = 0.05;
const GOALIE_MISMATCH_THRESHOLD: f64 = 0.03;
const LATE_GAME_MISMATCH_THRESHOLD: f64 = 0.1;

/// One line pairing with derived strengths and per-period xG.
#[derive(Debug, Clone, Serialize)]
pub struct LineMatchup {
    pub home_line_number: u8,
    pub away_line_number: u8,
    pub line_type: LineType,
    pub home_offensive_strength: f64,
    pub away_offensive_strength: f64,
    pub home_defensive_strength: f64,
    pub away_defensive_strength: f64,
    pub home_chemistry: f64,
    pub away_chemistry: f64,
    pub home_xg: f64,
    pub away_xg: f64,
}

impl LineMatchup {
    pub fn home_advantage(&self) -> f64 {
        self.home_xg - self.away_xg
    }
}

/// Strength comparison for one selected pairing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MatchupStrength {
    pub home_strength: f64,
    pub away_strength: f64,
    pub home_advantage: f64,
}

impl Default for MatchupStrength {
    fn default() -> Self {
        Self {
            home_strength: 0.5,
            away_strength: 0.5,
            home_advantage: 0.0,
        }
    }
}

impl MatchupStrength {
    /// None when the edge is within the 0.05 dead band.
    pub fn dominant_side(&self) -> Option<Side> {
        if self.home_advantage > 0.05 {
            Some(Side::Home)
        } else if self.home_advantage < -0.05 {
            Some(Side::Away)
        } else {
            None
        }
    }
}

/// Full pre-simulation matchup picture. All advantages are signed with
/// positive favoring the home side.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupAnalysis {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub zone_advantages: BTreeMap<Zone, f64>,
    pub forward_line_advantages: Vec<f64>,
    pub defense_pair_advantages: Vec<f64>,
    pub early_game_advantage: f64,
    pub mid_game_advantage: f64,
    pub late_game_advantage: f64,
    pub power_play_advantage: f64,
    pub penalty_kill_advantage: f64,
    pub goalie_advantage: f64,
    /// Disjoint description -> magnitude map for reporting.
    pub key_mismatches: BTreeMap<String, f64>,
}

impl MatchupAnalysis {
    pub fn neutral(home_team_id: TeamId, away_team_id: TeamId) -> Self {
        Self {
            home_team_id,
            away_team_id,
            zone_advantages: BTreeMap::new(),
            forward_line_advantages: Vec::new(),
            defense_pair_advantages: Vec::new(),
            early_game_advantage: 0.0,
            mid_game_advantage: 0.0,
            late_game_advantage: 0.0,
            power_play_advantage: 0.0,
            penalty_kill_advantage: 0.0,
            goalie_advantage: 0.0,
            key_mismatches: BTreeMap::new(),
        }
    }

    pub fn segment_advantage(&self, segment: Segment) -> f64 {
        match segment {
            Segment::EarlyGame => self.early_game_advantage,
            Segment::MidGame => self.mid_game_advantage,
            Segment::LateGame | Segment::Overtime => self.late_game_advantage,
        }
    }

    pub fn overall_advantage(&self) -> f64 {
        let segment_avg =
            (self.early_game_advantage + self.mid_game_advantage + self.late_game_advantage) / 3.0;
        let special_teams = (self.power_play_advantage + self.penalty_kill_advantage) / 2.0;
        segment_avg * 0.6 + special_teams * 0.2 + self.goalie_advantage * 0.2
    }
}

/// Matchup analyzer. Holds a synergy source; the null default degrades
/// line chemistry to stored scores and pairwise player synergies.
pub struct MatchupAnalyzer<'a> {
    synergy: &'a dyn SynergySource,
    home_ice_advantage: f64,
}

impl Default for MatchupAnalyzer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchupAnalyzer<'static> {
    pub fn new() -> Self {
        Self {
            synergy: &NO_ANALYTICS,
            home_ice_advantage: 0.03,
        }
    }
}

impl<'a> MatchupAnalyzer<'a> {
    pub fn with_synergy(mut self, source: &'a dyn SynergySource) -> MatchupAnalyzer<'a> {
        self.synergy = source;
        self
    }

    pub fn analyze_full_matchup(
        &self,
        home_team: &Team,
        away_team: &Team,
        players: &PlayerMap,
    ) -> MatchupAnalysis {
        let mut analysis = MatchupAnalysis::neutral(home_team.team_id, away_team.team_id);

        for zone in Zone::SCORING {
            let home_off = home_team.zone_strength(zone, true);
            let away_def = away_team.zone_strength(zone, false);
            let away_off = away_team.zone_strength(zone, true);
            let home_def = home_team.zone_strength(zone, false);
            analysis
                .zone_advantages
                .insert(zone, (home_off - away_def) - (away_off - home_def));
        }

        for home_line in &home_team.forward_lines {
            let best = self.find_best_matchup(home_line, &away_team.forward_lines, players);
            analysis.forward_line_advantages.push(best.home_advantage);
        }
        for home_pair in &home_team.defense_pairs {
            let best = self.find_best_matchup(home_pair, &away_team.defense_pairs, players);
            analysis.defense_pair_advantages.push(best.home_advantage);
        }

        analysis.early_game_advantage =
            segment_advantage(home_team, away_team, Segment::EarlyGame);
        analysis.mid_game_advantage = segment_advantage(home_team, away_team, Segment::MidGame);
        analysis.late_game_advantage = segment_advantage(home_team, away_team, Segment::LateGame);

        analysis.power_play_advantage = power_play_advantage(home_team, away_team);
        analysis.penalty_kill_advantage = penalty_kill_advantage(home_team, away_team);
        analysis.goalie_advantage = goalie_advantage(home_team, away_team, players);

        analysis.key_mismatches = identify_key_mismatches(&analysis);
        analysis
    }

    /// Detailed metrics for one specific pairing.
    pub fn calculate_line_matchup(
        &self,
        home_line: &LineConfiguration,
        away_line: &LineConfiguration,
        players: &PlayerMap,
    ) -> LineMatchup {
        let home_offensive_strength = self.line_offense(home_line, players);
        let away_offensive_strength = self.line_offense(away_line, players);
        let home_defensive_strength = self.line_defense(home_line, players);
        let away_defensive_strength = self.line_defense(away_line, players);
        let home_chemistry = self.line_chemistry(home_line, players);
        let away_chemistry = self.line_chemistry(away_line, players);

        let home_attack = home_offensive_strength / away_defensive_strength.max(0.1)
            * (1.0 + home_chemistry * 0.1);
        let away_attack = away_offensive_strength / home_defensive_strength.max(0.1)
            * (1.0 + away_chemistry * 0.1);

        LineMatchup {
            home_line_number: home_line.line_number,
            away_line_number: away_line.line_number,
            line_type: home_line.line_type,
            home_offensive_strength,
            away_offensive_strength,
            home_defensive_strength,
            away_defensive_strength,
            home_chemistry,
            away_chemistry,
            home_xg: BASE_XG_PER_PERIOD * home_attack * (1.0 + self.home_ice_advantage),
            away_xg: BASE_XG_PER_PERIOD * away_attack,
        }
    }

    /// Greedy best pairing for every home forward line and defense pair.
    pub fn optimal_matchups(
        &self,
        home_team: &Team,
        away_team: &Team,
        players: &PlayerMap,
    ) -> Vec<LineMatchup> {
        let mut optimal = Vec::new();
        for home_line in &home_team.forward_lines {
            if let Some(best) = self.best_line_matchup(home_line, &away_team.forward_lines, players)
            {
                optimal.push(best);
            }
        }
        for home_pair in &home_team.defense_pairs {
            if let Some(best) = self.best_line_matchup(home_pair, &away_team.defense_pairs, players)
            {
                optimal.push(best);
            }
        }
        optimal
    }

    fn best_line_matchup(
        &self,
        home_line: &LineConfiguration,
        away_lines: &[LineConfiguration],
        players: &PlayerMap,
    ) -> Option<LineMatchup> {
        let mut best: Option<LineMatchup> = None;
        for away_line in away_lines {
            let matchup = self.calculate_line_matchup(home_line, away_line, players);
            let better = match &best {
                Some(current) => matchup.home_advantage() > current.home_advantage(),
                None => true,
            };
            if better {
                best = Some(matchup);
            }
        }
        best
    }

    fn find_best_matchup(
        &self,
        home_line: &LineConfiguration,
        away_lines: &[LineConfiguration],
        players: &PlayerMap,
    ) -> MatchupStrength {
        match self.best_line_matchup(home_line, away_lines, players) {
            Some(matchup) => MatchupStrength {
                home_strength: matchup.home_offensive_strength,
                away_strength: matchup.away_offensive_strength,
                home_advantage: matchup.home_advantage(),
            },
            None => MatchupStrength::default(),
        }
    }

    fn line_offense(&self, line: &LineConfiguration, players: &PlayerMap) -> f64 {
        let mut base = (non_zero_or(line.expected_goals_percentage, 0.5)
            + non_zero_or(line.corsi_percentage, 0.5))
            / 2.0;

        if line.goals_for > 0 {
            let toi_hours = if line.time_on_ice_seconds > 0 {
                f64::from(line.time_on_ice_seconds) / 3600.0
            } else {
                1.0
            };
            base += (f64::from(line.goals_for) / toi_hours / 10.0).min(0.3);
        }

        for player_id in &line.player_ids {
            if let Some(player) = players.get(player_id) {
                let games = player.career_stats.games_played.max(1);
                base += player.career_stats.expected_goals_for / f64::from(games) * 0.1;
            }
        }

        if let Some(synergy) = self.synergy.line_synergy(&line.player_ids) {
            base *= 1.0 + synergy * 0.05;
        }

        base.clamp(STRENGTH_FLOOR, STRENGTH_CEILING)
    }

    fn line_defense(&self, line: &LineConfiguration, players: &PlayerMap) -> f64 {
        let mut base = (non_zero_or(line.expected_goals_percentage, 0.5)
            + non_zero_or(line.corsi_percentage, 0.5))
            / 2.0;

        if line.goals_against > 0 {
            let toi_hours = if line.time_on_ice_seconds > 0 {
                f64::from(line.time_on_ice_seconds) / 3600.0
            } else {
                1.0
            };
            base += (-f64::from(line.goals_against) / toi_hours / 10.0).max(-0.3);
        }

        for player_id in &line.player_ids {
            if let Some(player) = players.get(player_id) {
                let games = player.career_stats.games_played.max(1);
                base -= player.career_stats.expected_goals_against / f64::from(games) * 0.05;
            }
        }

        // Pairs are deployed for defense first
        if line.line_type == LineType::Defense {
            base *= 1.1;
        }

        base.clamp(STRENGTH_FLOOR, STRENGTH_CEILING)
    }

    fn line_chemistry(&self, line: &LineConfiguration, players: &PlayerMap) -> f64 {
        if line.chemistry_score > 0.0 {
            return line.chemistry_score;
        }
        if let Some(synergy) = self.synergy.line_synergy(&line.player_ids) {
            return synergy;
        }

        // Average pairwise player synergies, 0.5 for unknown pairs
        if line.player_ids.len() >= 2 {
            let mut total = 0.0;
            let mut pairs = 0u32;
            for (i, first) in line.player_ids.iter().enumerate() {
                let Some(player) = players.get(first) else {
                    continue;
                };
                for second in &line.player_ids[i + 1..] {
                    total += player.synergies.get(second).copied().unwrap_or(0.5);
                    pairs += 1;
                }
            }
            if pairs > 0 {
                return total / f64::from(pairs);
            }
        }

        0.5
    }
}

fn non_zero_or(value: f64, fallback: f64) -> f64 {
    if value != 0.0 {
        value
    } else {
        fallback
    }
}

fn segment_goal_differential(team: &Team, segment: Segment) -> i64 {
    let stats = &team.stats;
    let (goals_for, goals_against) = match segment {
        Segment::EarlyGame => (stats.early_game_goals_for, stats.early_game_goals_against),
        Segment::MidGame => (stats.mid_game_goals_for, stats.mid_game_goals_against),
        Segment::LateGame | Segment::Overtime => {
            (stats.late_game_goals_for, stats.late_game_goals_against)
        }
    };
    i64::from(goals_for) - i64::from(goals_against)
}

fn segment_advantage(home_team: &Team, away_team: &Team, segment: Segment) -> f64 {
    let home_games = home_team.stats.games_played.max(1);
    let away_games = away_team.stats.games_played.max(1);
    let home = segment_goal_differential(home_team, segment) as f64 / f64::from(home_games);
    let away = segment_goal_differential(away_team, segment) as f64 / f64::from(away_games);
    home - away
}

fn power_play_advantage(home_team: &Team, away_team: &Team) -> f64 {
    let home_pp = non_zero_or(home_team.stats.power_play_percentage, 20.0);
    let away_pk = non_zero_or(away_team.stats.penalty_kill_percentage, 80.0);
    (home_pp - (100.0 - away_pk)) / 100.0
}

fn penalty_kill_advantage(home_team: &Team, away_team: &Team) -> f64 {
    let home_pk = non_zero_or(home_team.stats.penalty_kill_percentage, 80.0);
    let away_pp = non_zero_or(away_team.stats.power_play_percentage, 20.0);
    (home_pk - (100.0 - away_pp)) / 100.0
}

fn goalie_advantage(home_team: &Team, away_team: &Team, players: &PlayerMap) -> f64 {
    let save_pct = |team: &Team| {
        team.starting_goalie_id
            .and_then(|id| players.get(&id))
            .and_then(|goalie| goalie.goalie_stats)
            .map(|stats| non_zero_or(stats.save_percentage, DEFAULT_SAVE_PERCENTAGE))
            .unwrap_or(DEFAULT_SAVE_PERCENTAGE)
    };
    (save_pct(home_team) - save_pct(away_team)) * 10.0
}

fn identify_key_mismatches(analysis: &MatchupAnalysis) -> BTreeMap<String, f64> {
    let mut mismatches = BTreeMap::new();
    let direction = |advantage: f64| if advantage > 0.0 { "home" } else { "away" };

    for (&zone, &advantage) in &analysis.zone_advantages {
        if advantage.abs() > ZONE_MISMATCH_THRESHOLD {
            mismatches.insert(
                format!("{}_dominates_{}", direction(advantage), zone.as_str()),
                advantage.abs(),
            );
        }
    }

    for (i, &advantage) in analysis.forward_line_advantages.iter().enumerate() {
        if advantage.abs() > LINE_MISMATCH_THRESHOLD {
            mismatches.insert(
                format!("{}_line{}_advantage", direction(advantage), i + 1),
                advantage.abs(),
            );
        }
    }

    if analysis.power_play_advantage.abs() > PP_MISMATCH_THRESHOLD {
        mismatches.insert(
            format!("{}_pp_advantage", direction(analysis.power_play_advantage)),
            analysis.power_play_advantage.abs(),
        );
    }

    if analysis.goalie_advantage.abs() > GOALIE_MISMATCH_THRESHOLD {
        mismatches.insert(
            format!("{}_goalie_advantage", direction(analysis.goalie_advantage)),
            analysis.goalie_advantage.abs(),
        );
    }

    if analysis.late_game_advantage.abs() > LATE_GAME_MISMATCH_THRESHOLD {
        mismatches.insert(
            format!("{}_late_game_edge", direction(analysis.late_game_advantage)),
            analysis.late_game_advantage.abs(),
        );
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::player::{GoalieStats, Player, Position};
    use crate::data::team::TeamStats;

    fn line(number: u8, line_type: LineType, xg_pct: f64, corsi: f64) -> LineConfiguration {
        let mut line = LineConfiguration::new(number, line_type);
        line.expected_goals_percentage = xg_pct;
        line.corsi_percentage = corsi;
        line
    }

    fn basic_team(team_id: TeamId) -> Team {
        let mut team = Team::new(team_id, format!("Team {team_id}"));
        team.stats = TeamStats {
            games_played: 60,
            shots_for: 1800,
            ..TeamStats::default()
        };
        team
    }

    #[test]
    fn strength_clamps_hold() {
        let analyzer = MatchupAnalyzer::new();
        let players = PlayerMap::new();

        let weak = line(1, LineType::Forward, 0.01, 0.01);
        assert!(analyzer.line_offense(&weak, &players) >= STRENGTH_FLOOR);

        let mut strong = line(1, LineType::Forward, 0.9, 0.9);
        strong.goals_for = 50;
        strong.time_on_ice_seconds = 3600;
        assert!(analyzer.line_offense(&strong, &players) <= STRENGTH_CEILING);
    }

    #[test]
    fn defense_pairs_amplified() {
        let analyzer = MatchupAnalyzer::new();
        let players = PlayerMap::new();
        let forward = line(1, LineType::Forward, 0.6, 0.6);
        let pair = line(1, LineType::Defense, 0.6, 0.6);
        assert!(
            analyzer.line_defense(&pair, &players) > analyzer.line_defense(&forward, &players)
        );
    }

    #[test]
    fn greedy_pick_is_first_best() {
        let analyzer = MatchupAnalyzer::new();
        let players = PlayerMap::new();
        let home = line(1, LineType::Forward, 0.6, 0.6);
        // Two equally weak opponents: encounter order breaks the tie
        let away = vec![
            line(1, LineType::Forward, 0.4, 0.4),
            line(2, LineType::Forward, 0.4, 0.4),
        ];
        let best = analyzer
            .best_line_matchup(&home, &away, &players)
            .expect("matchup");
        assert_eq!(best.away_line_number, 1);
        assert!(best.home_advantage() > 0.0);
    }

    #[test]
    fn zone_advantage_is_antisymmetric() {
        let analyzer = MatchupAnalyzer::new();
        let players = PlayerMap::new();
        let mut home = basic_team(1);
        home.offensive_heat_map.insert(Zone::Slot, 0.8);
        let away = basic_team(2);

        let forward = analyzer.analyze_full_matchup(&home, &away, &players);
        let reversed = analyzer.analyze_full_matchup(&away, &home, &players);
        let fwd = forward.zone_advantages[&Zone::Slot];
        let rev = reversed.zone_advantages[&Zone::Slot];
        assert!((fwd + rev).abs() < 1e-9);
        assert!(fwd > 0.0);
    }

    #[test]
    fn goalie_mismatch_reported() {
        let players: PlayerMap = [
            (
                10,
                Player {
                    goalie_stats: Some(GoalieStats {
                        games_played: 50,
                        save_percentage: 0.925,
                        goals_against_average: 2.3,
                    }),
                    ..Player::new(10, "Home Goalie", Position::Goalie)
                },
            ),
            (
                20,
                Player {
                    goalie_stats: Some(GoalieStats {
                        games_played: 50,
                        save_percentage: 0.895,
                        goals_against_average: 3.2,
                    }),
                    ..Player::new(20, "Away Goalie", Position::Goalie)
                },
            ),
        ]
        .into_iter()
        .collect();

        let mut home = basic_team(1);
        home.starting_goalie_id = Some(10);
        let mut away = basic_team(2);
        away.starting_goalie_id = Some(20);

        let analyzer = MatchupAnalyzer::new();
        let analysis = analyzer.analyze_full_matchup(&home, &away, &players);
        assert!((analysis.goalie_advantage - 0.3).abs() < 1e-9);
        assert!(analysis.key_mismatches.contains_key("home_goalie_advantage"));
    }

    #[test]
    fn overall_advantage_weights() {
        let mut analysis = MatchupAnalysis::neutral(1, 2);
        analysis.early_game_advantage = 0.3;
        analysis.mid_game_advantage = 0.3;
        analysis.late_game_advantage = 0.3;
        analysis.power_play_advantage = 0.1;
        analysis.penalty_kill_advantage = 0.1;
        analysis.goalie_advantage = 0.2;
        let expected = 0.3 * 0.6 + 0.1 * 0.2 + 0.2 * 0.2;
        assert!((analysis.overall_advantage() - expected).abs() < 1e-9);
    }
}
