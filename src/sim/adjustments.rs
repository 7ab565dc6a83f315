//! Segment, situation, and schedule adjustments.
//!
//! Turns the analytics snapshots into per-segment multipliers. The engine
//! computes one [TeamAdjustments] per team per simulation call and freezes
//! it; nothing here mutates during the iteration loop.

use serde::Serialize;

use crate::data::analytics::{AnalyticsInputs, ScheduleContext};
use crate::data::player::{PlayerId, PlayerMap};
use crate::data::team::{Team, TeamId};
use crate::sim::config::SegmentWeights;
use crate::sim::models::Segment;

// Clutch score bands (roughly 0-4 scale)
const CLUTCH_ELITE: f64 = 1.15;
const CLUTCH_STRONG: f64 = 1.08;
const CLUTCH_AVERAGE: f64 = 1.00;
const CLUTCH_BELOW_AVERAGE: f64 = 0.95;
const CLUTCH_POOR: f64 = 0.90;

// Fatigue indicator bands (late/early production ratio)
const FATIGUE_MINIMAL: f64 = 1.00;
const FATIGUE_LOW: f64 = 0.97;
const FATIGUE_MODERATE: f64 = 0.93;
const FATIGUE_HIGH: f64 = 0.88;
const FATIGUE_SEVERE: f64 = 0.82;

/// Whole-game fatigue classification from rest and workload combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLevel {
    Fresh,
    Normal,
    Tired,
    Exhausted,
}

/// Schedule-derived multipliers for one team entering one game.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScheduleFactors {
    pub rest_factor: f64,
    pub workload_factor: f64,
    pub streak_factor: f64,
    pub fatigue_level: FatigueLevel,
}

impl ScheduleFactors {
    pub fn from_context(context: &ScheduleContext) -> Self {
        let rest_factor = match context.days_rest {
            Some(0) => 0.92,
            Some(1) => 0.97,
            Some(2) | None => 1.00,
            Some(3) => 1.01,
            Some(_) => 1.00,
        };
        let workload_factor = match context.games_in_7_days {
            0 => 1.00,
            1 => 1.02,
            2 => 1.00,
            3 => 0.98,
            4 => 0.95,
            _ => 0.92,
        };
        let streak_factor = if context.win_streak >= 2 {
            match context.win_streak {
                2 => 1.01,
                3 => 1.02,
                _ => 1.03,
            }
        } else if context.loss_streak >= 2 {
            match context.loss_streak {
                2 => 0.99,
                3 => 0.98,
                _ => 0.96,
            }
        } else {
            1.00
        };

        let combined = rest_factor * workload_factor;
        let fatigue_level = if combined >= 1.01 {
            FatigueLevel::Fresh
        } else if combined >= 0.98 {
            FatigueLevel::Normal
        } else if combined >= 0.94 {
            FatigueLevel::Tired
        } else {
            FatigueLevel::Exhausted
        };

        Self {
            rest_factor,
            workload_factor,
            streak_factor,
            fatigue_level,
        }
    }
}

/// Multipliers for one game segment.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SegmentAdjustment {
    pub segment: Segment,
    pub base_weight: f64,
    pub offensive_modifier: f64,
    pub defensive_modifier: f64,
    pub clutch_factor: f64,
    pub fatigue_factor: f64,
    pub momentum_factor: f64,
    pub schedule_rest_factor: f64,
    pub schedule_workload_factor: f64,
    pub schedule_streak_factor: f64,
}

impl SegmentAdjustment {
    pub fn neutral(segment: Segment) -> Self {
        Self {
            segment,
            base_weight: 1.0,
            offensive_modifier: 1.0,
            defensive_modifier: 1.0,
            clutch_factor: 1.0,
            fatigue_factor: 1.0,
            momentum_factor: 1.0,
            schedule_rest_factor: 1.0,
            schedule_workload_factor: 1.0,
            schedule_streak_factor: 1.0,
        }
    }

    pub fn schedule_combined(&self) -> f64 {
        self.schedule_rest_factor * self.schedule_workload_factor * self.schedule_streak_factor
    }

    pub fn total_modifier(&self) -> f64 {
        self.base_weight
            * self.offensive_modifier
            * self.clutch_factor
            * self.fatigue_factor
            * self.momentum_factor
            * self.schedule_combined()
    }
}

/// Complete frozen adjustments for one team in one simulation call.
#[derive(Debug, Clone, Serialize)]
pub struct TeamAdjustments {
    pub team_id: TeamId,
    pub early_game: SegmentAdjustment,
    pub mid_game: SegmentAdjustment,
    pub late_game: SegmentAdjustment,
    pub overtime: SegmentAdjustment,

    pub overall_clutch_rating: f64,
    pub overall_fatigue_rating: f64,
    pub resilience_factor: f64,

    pub leading_late_modifier: f64,
    pub trailing_late_modifier: f64,
    pub tied_late_modifier: f64,
}

impl TeamAdjustments {
    pub fn neutral(team_id: TeamId) -> Self {
        Self {
            team_id,
            early_game: SegmentAdjustment::neutral(Segment::EarlyGame),
            mid_game: SegmentAdjustment::neutral(Segment::MidGame),
            late_game: SegmentAdjustment::neutral(Segment::LateGame),
            overtime: SegmentAdjustment::neutral(Segment::Overtime),
            overall_clutch_rating: 1.0,
            overall_fatigue_rating: 1.0,
            resilience_factor: 1.0,
            leading_late_modifier: 1.0,
            trailing_late_modifier: 1.0,
            tied_late_modifier: 1.0,
        }
    }

    pub fn segment(&self, segment: Segment) -> &SegmentAdjustment {
        match segment {
            Segment::EarlyGame => &self.early_game,
            Segment::MidGame => &self.mid_game,
            Segment::LateGame => &self.late_game,
            Segment::Overtime => &self.overtime,
        }
    }

    fn segments_mut(&mut self) -> [&mut SegmentAdjustment; 4] {
        [
            &mut self.early_game,
            &mut self.mid_game,
            &mut self.late_game,
            &mut self.overtime,
        ]
    }
}

/// Adjustment calculator over a borrowed analytics bundle. A bundle of
/// null sources yields neutral adjustments everywhere.
pub struct AdjustmentCalculator<'a> {
    analytics: AnalyticsInputs<'a>,
    segment_weights: SegmentWeights,
}

impl<'a> AdjustmentCalculator<'a> {
    pub fn new(analytics: AnalyticsInputs<'a>, segment_weights: SegmentWeights) -> Self {
        Self {
            analytics,
            segment_weights,
        }
    }

    /// Base weights plus clutch, fatigue, and resilience. Schedule and
    /// momentum layers are folded in by [Self::calculate_full_adjustments].
    pub fn calculate_team_adjustments(&self, team: &Team, _players: &PlayerMap) -> TeamAdjustments {
        let mut adjustments = TeamAdjustments::neutral(team.team_id);

        adjustments.early_game.base_weight = self.segment_weights.early_game;
        adjustments.mid_game.base_weight = self.segment_weights.mid_game;
        adjustments.late_game.base_weight = self.segment_weights.late_game;
        adjustments.overtime.base_weight = self.segment_weights.overtime;

        self.apply_clutch(&mut adjustments, team);
        self.apply_fatigue(&mut adjustments, team);
        self.apply_resilience(&mut adjustments, team);

        adjustments.overall_clutch_rating = self.team_clutch_rating(team);
        adjustments.overall_fatigue_rating = self.team_fatigue_rating(team);

        adjustments
    }

    /// Main entry point: base adjustments plus schedule context and player
    /// momentum.
    pub fn calculate_full_adjustments(
        &self,
        team: &Team,
        players: &PlayerMap,
        schedule_context: Option<&ScheduleContext>,
    ) -> TeamAdjustments {
        let mut adjustments = self.calculate_team_adjustments(team, players);
        self.apply_schedule_context(&mut adjustments, schedule_context);
        self.apply_player_momentum(&mut adjustments, team);
        adjustments
    }

    /// Modifier for a concrete in-game situation: segment total plus
    /// late-game leading/trailing/tied behavior and close-game resilience.
    pub fn get_situation_modifier(
        &self,
        adjustments: &TeamAdjustments,
        segment: Segment,
        score_differential: i64,
        time_remaining_minutes: f64,
    ) -> f64 {
        let mut modifier = adjustments.segment(segment).total_modifier();

        if segment == Segment::LateGame {
            if score_differential > 0 {
                modifier *= adjustments.leading_late_modifier;
            } else if score_differential < 0 {
                modifier *= adjustments.trailing_late_modifier;
                // Desperation push with the clock running out
                if time_remaining_minutes < 5.0 {
                    modifier *= 1.05;
                }
            } else {
                modifier *= adjustments.tied_late_modifier;
            }
        }

        if score_differential.abs() <= 1 {
            modifier *= adjustments.resilience_factor;
        }

        modifier
    }

    /// Signed home edge for a segment; the home side gets the ice bonus.
    pub fn calculate_matchup_edge(
        &self,
        home_adjustments: &TeamAdjustments,
        away_adjustments: &TeamAdjustments,
        segment: Segment,
    ) -> f64 {
        let home = home_adjustments.segment(segment).total_modifier() * 1.03;
        let away = away_adjustments.segment(segment).total_modifier();
        home - away
    }

    fn apply_clutch(&self, adjustments: &mut TeamAdjustments, team: &Team) {
        let mut scores = Vec::new();
        for player_id in late_game_players(team) {
            if let Some(score) = self.analytics.clutch.clutch_score(player_id) {
                scores.push(score);
            }
        }
        if scores.is_empty() {
            return;
        }
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;

        let modifier = if avg >= 3.0 {
            CLUTCH_ELITE
        } else if avg >= 2.0 {
            CLUTCH_STRONG
        } else if avg >= 1.0 {
            CLUTCH_AVERAGE
        } else if avg >= 0.5 {
            CLUTCH_BELOW_AVERAGE
        } else {
            CLUTCH_POOR
        };

        adjustments.late_game.clutch_factor = modifier;
        adjustments.overtime.clutch_factor = modifier * 1.05;
        // Slight bleed into the middle frame
        adjustments.mid_game.clutch_factor = 1.0 + (modifier - 1.0) * 0.3;
    }

    fn apply_fatigue(&self, adjustments: &mut TeamAdjustments, team: &Team) {
        let mut indicators = Vec::new();
        for player_id in team.roster.all_skaters() {
            if let Some(indicator) = self.analytics.stamina.fatigue_indicator(player_id) {
                indicators.push(indicator);
            }
        }
        if indicators.is_empty() {
            return;
        }
        let avg = indicators.iter().sum::<f64>() / indicators.len() as f64;

        let modifier = if avg >= 0.95 {
            FATIGUE_MINIMAL
        } else if avg >= 0.85 {
            FATIGUE_LOW
        } else if avg >= 0.75 {
            FATIGUE_MODERATE
        } else if avg >= 0.65 {
            FATIGUE_HIGH
        } else {
            FATIGUE_SEVERE
        };

        adjustments.early_game.fatigue_factor = 1.0;
        adjustments.mid_game.fatigue_factor = 1.0 + (modifier - 1.0) * 0.3;
        adjustments.late_game.fatigue_factor = modifier;
        // Tired legs show most in the extra frame
        adjustments.overtime.fatigue_factor = modifier * 0.95;
    }

    fn apply_resilience(&self, adjustments: &mut TeamAdjustments, team: &Team) {
        let Some(metrics) = self.analytics.resilience.resilience(team.team_id) else {
            return;
        };

        adjustments.leading_late_modifier = 0.9 + metrics.lead_protection_rate * 0.2;
        adjustments.trailing_late_modifier = 0.95 + metrics.comeback_rate * 0.15;

        adjustments.resilience_factor = if metrics.is_resilient {
            1.08
        } else if metrics.is_collapse_prone {
            0.92
        } else {
            1.0
        };

        if metrics.third_period_goal_differential > 0 {
            adjustments.late_game.offensive_modifier *= 1.03;
        } else if metrics.third_period_goal_differential < -5 {
            adjustments.late_game.defensive_modifier *= 0.97;
        }
    }

    fn apply_schedule_context(
        &self,
        adjustments: &mut TeamAdjustments,
        schedule_context: Option<&ScheduleContext>,
    ) {
        let Some(context) = schedule_context else {
            return;
        };
        let factors = ScheduleFactors::from_context(context);

        for segment in adjustments.segments_mut() {
            segment.schedule_rest_factor = factors.rest_factor;
            segment.schedule_workload_factor = factors.workload_factor;
            segment.schedule_streak_factor = factors.streak_factor;
        }

        match factors.fatigue_level {
            FatigueLevel::Tired => {
                adjustments.late_game.fatigue_factor *= 0.97;
                adjustments.overtime.fatigue_factor *= 0.97 * 0.98;
            }
            FatigueLevel::Exhausted => {
                adjustments.late_game.fatigue_factor *= 0.94;
                adjustments.overtime.fatigue_factor *= 0.94 * 0.98;
            }
            FatigueLevel::Fresh | FatigueLevel::Normal => {}
        }
    }

    fn apply_player_momentum(&self, adjustments: &mut TeamAdjustments, team: &Team) {
        let mut effect_sum = 0.0;
        let mut count = 0u32;
        for player_id in skaters_of(team) {
            if let Some(modifier) = self.analytics.momentum.momentum_modifier(player_id) {
                effect_sum += modifier - 1.0;
                count += 1;
            }
        }
        if count == 0 {
            return;
        }

        let team_modifier = 1.0 + effect_sum / f64::from(count);
        for segment in adjustments.segments_mut() {
            segment.momentum_factor *= team_modifier;
        }
    }

    fn team_clutch_rating(&self, team: &Team) -> f64 {
        let mut clutch_sum = 0.0;
        let mut weight_sum = 0.0;

        for (i, line) in team.forward_lines.iter().enumerate() {
            let weight = 1.0 - i as f64 * 0.15;
            for player_id in &line.player_ids {
                if let Some(score) = self.analytics.clutch.clutch_score(*player_id) {
                    clutch_sum += score * weight;
                    weight_sum += weight;
                }
            }
        }
        for (i, pair) in team.defense_pairs.iter().enumerate() {
            let weight = 0.9 - i as f64 * 0.15;
            for player_id in &pair.player_ids {
                if let Some(score) = self.analytics.clutch.clutch_score(*player_id) {
                    clutch_sum += score * weight;
                    weight_sum += weight;
                }
            }
        }

        if weight_sum == 0.0 {
            1.0
        } else {
            0.9 + (clutch_sum / weight_sum) * 0.05
        }
    }

    fn team_fatigue_rating(&self, team: &Team) -> f64 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for player_id in team.roster.all_skaters() {
            if let Some(indicator) = self.analytics.stamina.fatigue_indicator(player_id) {
                sum += indicator;
                count += 1;
            }
        }
        if count == 0 {
            1.0
        } else {
            sum / f64::from(count)
        }
    }
}

/// Skaters a coach leans on when the game is on the line: top two forward
/// lines and top two defense pairs.
fn late_game_players(team: &Team) -> Vec<PlayerId> {
    let mut players = Vec::new();
    for line in team.forward_lines.iter().take(2) {
        players.extend_from_slice(&line.player_ids);
    }
    for pair in team.defense_pairs.iter().take(2) {
        players.extend_from_slice(&pair.player_ids);
    }
    players
}

fn skaters_of(team: &Team) -> Vec<PlayerId> {
    let mut skaters: Vec<PlayerId> = team.roster.all_skaters().collect();
    if skaters.is_empty() {
        for line in &team.forward_lines {
            skaters.extend_from_slice(&line.player_ids);
        }
        for pair in &team.defense_pairs {
            skaters.extend_from_slice(&pair.player_ids);
        }
    }
    skaters
}

/// Tracks in-game momentum swings for a single simulated game.
///
/// Exposed for game-flow consumers; the Monte Carlo engine keeps its
/// per-iteration modifiers frozen and does not feed this back into draws.
#[derive(Debug, Clone)]
pub struct MomentumTracker {
    pub home_momentum: f64,
    pub away_momentum: f64,
    pub recent_home_goals: u32,
    pub recent_away_goals: u32,
    decay_rate: f64,
}

impl Default for MomentumTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MomentumTracker {
    pub fn new() -> Self {
        Self {
            home_momentum: 0.5,
            away_momentum: 0.5,
            recent_home_goals: 0,
            recent_away_goals: 0,
            decay_rate: 0.1,
        }
    }

    pub fn record_goal(&mut self, is_home: bool) {
        if is_home {
            self.recent_home_goals += 1;
            self.home_momentum = (self.home_momentum + 0.15).min(1.0);
            self.away_momentum = (self.away_momentum - 0.10).max(0.0);
        } else {
            self.recent_away_goals += 1;
            self.away_momentum = (self.away_momentum + 0.15).min(1.0);
            self.home_momentum = (self.home_momentum - 0.10).max(0.0);
        }
    }

    pub fn record_power_play(&mut self, is_home: bool, scored: bool) {
        if scored {
            self.record_goal(is_home);
        } else if is_home {
            // Killed penalty swings the other way
            self.away_momentum = (self.away_momentum + 0.05).min(1.0);
        } else {
            self.home_momentum = (self.home_momentum + 0.05).min(1.0);
        }
    }

    pub fn decay(&mut self) {
        self.home_momentum = 0.5 + (self.home_momentum - 0.5) * (1.0 - self.decay_rate);
        self.away_momentum = 0.5 + (self.away_momentum - 0.5) * (1.0 - self.decay_rate);
    }

    pub fn reset_period(&mut self) {
        self.decay();
        self.decay();
        self.recent_home_goals = 0;
        self.recent_away_goals = 0;
    }

    /// Momentum (0-1) mapped to a 0.9-1.1 multiplier.
    pub fn modifier(&self, is_home: bool) -> f64 {
        let momentum = if is_home {
            self.home_momentum
        } else {
            self.away_momentum
        };
        0.9 + momentum * 0.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::analytics::{
        ClutchScores, FatigueIndicators, ResilienceMetrics, ResilienceRatings,
    };
    use crate::data::team::{LineConfiguration, LineType, TeamRoster};

    fn team_with_top_line(players: &[PlayerId]) -> Team {
        let mut team = Team::new(1, "Test");
        let mut line = LineConfiguration::new(1, LineType::Forward);
        line.player_ids = players.to_vec();
        team.forward_lines.push(line);
        team.roster = TeamRoster {
            forwards: players.to_vec(),
            defensemen: Vec::new(),
            goalies: Vec::new(),
        };
        team
    }

    fn calculator_with_clutch(scores: &ClutchScores) -> AdjustmentCalculator<'_> {
        let analytics = AnalyticsInputs::neutral().with_clutch(scores);
        AdjustmentCalculator::new(analytics, SegmentWeights::default())
    }

    #[test]
    fn neutral_sources_give_base_weights_only() {
        let calc = AdjustmentCalculator::new(AnalyticsInputs::neutral(), SegmentWeights::default());
        let team = team_with_top_line(&[1, 2, 3]);
        let adj = calc.calculate_full_adjustments(&team, &PlayerMap::new(), None);

        assert!((adj.late_game.total_modifier() - 1.10).abs() < 1e-9);
        assert!((adj.overtime.total_modifier() - 1.25).abs() < 1e-9);
        assert_eq!(adj.resilience_factor, 1.0);
    }

    #[test]
    fn clutch_bands_are_monotonic() {
        let team = team_with_top_line(&[1, 2, 3]);
        let mut previous = 0.0;
        for score in [0.2, 0.7, 1.5, 2.5, 3.5] {
            let mut scores = ClutchScores::default();
            for id in [1, 2, 3] {
                scores.0.insert(id, score);
            }
            let calc = calculator_with_clutch(&scores);
            let adj = calc.calculate_team_adjustments(&team, &PlayerMap::new());
            let modifier = adj.late_game.total_modifier();
            assert!(
                modifier >= previous,
                "clutch {score} produced {modifier} below {previous}"
            );
            previous = modifier;
        }
    }

    #[test]
    fn clutch_amplified_in_overtime_and_bled_into_mid() {
        let team = team_with_top_line(&[1]);
        let mut scores = ClutchScores::default();
        scores.0.insert(1, 3.5);
        let calc = calculator_with_clutch(&scores);
        let adj = calc.calculate_team_adjustments(&team, &PlayerMap::new());

        assert!((adj.late_game.clutch_factor - 1.15).abs() < 1e-9);
        assert!((adj.overtime.clutch_factor - 1.15 * 1.05).abs() < 1e-9);
        assert!((adj.mid_game.clutch_factor - (1.0 + 0.15 * 0.3)).abs() < 1e-9);
        assert_eq!(adj.early_game.clutch_factor, 1.0);
    }

    #[test]
    fn severe_fatigue_spares_early_game() {
        let team = team_with_top_line(&[1, 2]);
        let mut indicators = FatigueIndicators::default();
        indicators.0.insert(1, 0.5);
        indicators.0.insert(2, 0.6);
        let analytics = AnalyticsInputs::neutral().with_stamina(&indicators);
        let calc = AdjustmentCalculator::new(analytics, SegmentWeights::default());
        let adj = calc.calculate_team_adjustments(&team, &PlayerMap::new());

        assert_eq!(adj.early_game.fatigue_factor, 1.0);
        assert!((adj.late_game.fatigue_factor - 0.82).abs() < 1e-9);
        assert!((adj.overtime.fatigue_factor - 0.82 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn resilient_team_holds_leads() {
        let team = team_with_top_line(&[1]);
        let mut ratings = ResilienceRatings::default();
        ratings.0.insert(
            1,
            ResilienceMetrics {
                lead_protection_rate: 0.8,
                comeback_rate: 0.4,
                third_period_goal_differential: 10,
                is_resilient: true,
                is_collapse_prone: false,
            },
        );
        let analytics = AnalyticsInputs::neutral().with_resilience(&ratings);
        let calc = AdjustmentCalculator::new(analytics, SegmentWeights::default());
        let adj = calc.calculate_team_adjustments(&team, &PlayerMap::new());

        assert!((adj.leading_late_modifier - (0.9 + 0.8 * 0.2)).abs() < 1e-9);
        assert!((adj.trailing_late_modifier - (0.95 + 0.4 * 0.15)).abs() < 1e-9);
        assert_eq!(adj.resilience_factor, 1.08);
        assert!((adj.late_game.offensive_modifier - 1.03).abs() < 1e-9);
    }

    #[test]
    fn back_to_back_heavy_week_reads_exhausted() {
        let context = ScheduleContext {
            days_rest: Some(0),
            games_in_7_days: 5,
            win_streak: 0,
            loss_streak: 0,
        };
        let factors = ScheduleFactors::from_context(&context);
        assert_eq!(factors.fatigue_level, FatigueLevel::Exhausted);

        let calc = AdjustmentCalculator::new(AnalyticsInputs::neutral(), SegmentWeights::default());
        let team = team_with_top_line(&[1]);
        let adj = calc.calculate_full_adjustments(&team, &PlayerMap::new(), Some(&context));
        assert!((adj.late_game.fatigue_factor - 0.94).abs() < 1e-9);
        assert!((adj.overtime.fatigue_factor - 0.94 * 0.98).abs() < 1e-9);
        assert!((adj.late_game.schedule_combined() - 0.92 * 0.92).abs() < 1e-9);
    }

    #[test]
    fn trailing_late_gets_urgency_push() {
        let calc = AdjustmentCalculator::new(AnalyticsInputs::neutral(), SegmentWeights::default());
        let team = team_with_top_line(&[1]);
        let adj = calc.calculate_team_adjustments(&team, &PlayerMap::new());

        let trailing_late = calc.get_situation_modifier(&adj, Segment::LateGame, -1, 3.0);
        let trailing_early_clock = calc.get_situation_modifier(&adj, Segment::LateGame, -1, 10.0);
        assert!((trailing_late / trailing_early_clock - 1.05).abs() < 1e-9);

        // Blowouts skip the close-game resilience factor
        let blowout = calc.get_situation_modifier(&adj, Segment::LateGame, 4, 10.0);
        assert!((blowout - adj.late_game.total_modifier()).abs() < 1e-9);
    }

    #[test]
    fn momentum_tracker_swings_and_decays() {
        let mut tracker = MomentumTracker::new();
        tracker.record_goal(true);
        assert!((tracker.home_momentum - 0.65).abs() < 1e-9);
        assert!((tracker.away_momentum - 0.40).abs() < 1e-9);
        assert!(tracker.modifier(true) > tracker.modifier(false));

        tracker.reset_period();
        assert!(tracker.home_momentum < 0.65);
        assert!(tracker.home_momentum > 0.5);
        assert_eq!(tracker.recent_home_goals, 0);

        // Clamp at the ceiling
        for _ in 0..10 {
            tracker.record_goal(true);
        }
        assert!(tracker.home_momentum <= 1.0);
        assert!((tracker.modifier(true) - 1.1).abs() < 1e-9);
    }
}
