//! Result types for the simulation engine: per-segment and per-game trial
//! outcomes, the running score distribution, and the terminal aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::data::team::TeamId;
use crate::sim::matchups::MatchupAnalysis;

/// One of the four fixed simulation phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    EarlyGame,
    MidGame,
    LateGame,
    Overtime,
}

impl Segment {
    /// The three regulation segments, in play order.
    pub const REGULATION: [Segment; 3] = [Segment::EarlyGame, Segment::MidGame, Segment::LateGame];

    pub fn as_str(self) -> &'static str {
        match self {
            Segment::EarlyGame => "early_game",
            Segment::MidGame => "mid_game",
            Segment::LateGame => "late_game",
            Segment::Overtime => "overtime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// Outcome of a single simulated segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub segment: Segment,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_xg: f64,
    pub away_xg: f64,
    pub home_shots: u32,
    pub away_shots: u32,
    pub dominant_side: Option<Side>,
}

impl SegmentResult {
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            home_goals: 0,
            away_goals: 0,
            home_xg: 0.0,
            away_xg: 0.0,
            home_shots: 0,
            away_shots: 0,
            dominant_side: None,
        }
    }
}

/// One complete trial outcome. Immutable once the engine returns it; only a
/// bounded sample is retained for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedGame {
    pub game_number: u32,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: TeamId,
    pub went_to_overtime: bool,
    pub went_to_shootout: bool,
    pub segments: Vec<SegmentResult>,
    pub home_xg_total: f64,
    pub away_xg_total: f64,
}

impl SimulatedGame {
    pub fn goal_differential(&self) -> i64 {
        i64::from(self.home_score) - i64::from(self.away_score)
    }

    pub fn total_goals(&self) -> u32 {
        self.home_score + self.away_score
    }

    pub fn was_blowout(&self) -> bool {
        self.goal_differential().abs() >= 4
    }

    pub fn was_close(&self) -> bool {
        self.goal_differential().abs() <= 1 || self.went_to_overtime
    }
}

/// Running frequency aggregate over final scores. `add_result` is called
/// once per iteration; queries are order-independent over the result
/// multiset.
#[derive(Debug, Clone, Default)]
pub struct ScoreDistribution {
    score_counts: BTreeMap<(u32, u32), u64>,
    home_goals: BTreeMap<u32, u64>,
    away_goals: BTreeMap<u32, u64>,
    total_goals: BTreeMap<u32, u64>,
}

impl ScoreDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, home_score: u32, away_score: u32) {
        *self.score_counts.entry((home_score, away_score)).or_insert(0) += 1;
        *self.home_goals.entry(home_score).or_insert(0) += 1;
        *self.away_goals.entry(away_score).or_insert(0) += 1;
        *self.total_goals.entry(home_score + away_score).or_insert(0) += 1;
    }

    /// The most frequent final score. Ties break to the lowest score pair so
    /// the answer does not depend on insertion order.
    pub fn most_likely_score(&self) -> (u32, u32) {
        let mut best: Option<((u32, u32), u64)> = None;
        for (&score, &count) in &self.score_counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((score, count)),
            }
        }
        best.map(|(score, _)| score).unwrap_or((0, 0))
    }

    pub fn average_home_goals(&self, total_games: u64) -> f64 {
        Self::average(&self.home_goals, total_games)
    }

    pub fn average_away_goals(&self, total_games: u64) -> f64 {
        Self::average(&self.away_goals, total_games)
    }

    pub fn score_count(&self, home_score: u32, away_score: u32) -> u64 {
        self.score_counts
            .get(&(home_score, away_score))
            .copied()
            .unwrap_or(0)
    }

    pub fn recorded_games(&self) -> u64 {
        self.score_counts.values().sum()
    }

    fn average(histogram: &BTreeMap<u32, u64>, total_games: u64) -> f64 {
        if total_games == 0 {
            return 0.0;
        }
        let sum: f64 = histogram
            .iter()
            .map(|(&goals, &count)| f64::from(goals) * count as f64)
            .sum();
        sum / total_games as f64
    }
}

/// How lopsided the win-probability margin is; close matchups flip on small
/// perturbations and read as high variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceIndicator {
    Low,
    Normal,
    High,
}

impl VarianceIndicator {
    pub fn as_str(self) -> &'static str {
        match self {
            VarianceIndicator::Low => "low",
            VarianceIndicator::Normal => "normal",
            VarianceIndicator::High => "high",
        }
    }
}

/// Terminal aggregate of a simulation call. Constructed exactly once after
/// the iteration loop; win probabilities are derived here and nowhere else.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub total_iterations: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub overtime_games: u32,
    pub shootout_games: u32,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub confidence_score: f64,
    pub variance_indicator: VarianceIndicator,
    pub average_home_xg: f64,
    pub average_away_xg: f64,
    /// Keys like `early_game_home_win_rate`, accumulated over all iterations.
    pub segment_win_rates: BTreeMap<String, f64>,
    pub matchup_analysis: MatchupAnalysis,
    pub score_distribution: ScoreDistribution,
    pub sample_games: Vec<SimulatedGame>,
}

impl SimulationResult {
    /// Games actually simulated. Matches the iteration count in single-game
    /// mode; exceeds it in series mode, where each iteration plays a series.
    pub fn games_recorded(&self) -> u64 {
        self.score_distribution.recorded_games()
    }

    pub fn overtime_rate(&self) -> f64 {
        let games = self.games_recorded();
        if games == 0 {
            0.0
        } else {
            f64::from(self.overtime_games) / games as f64
        }
    }

    pub fn shootout_rate(&self) -> f64 {
        let games = self.games_recorded();
        if games == 0 {
            0.0
        } else {
            f64::from(self.shootout_games) / games as f64
        }
    }

    pub fn predicted_winner(&self) -> TeamId {
        if self.home_win_probability > self.away_win_probability {
            self.home_team_id
        } else {
            self.away_team_id
        }
    }

    pub fn win_margin(&self) -> f64 {
        (self.home_win_probability - self.away_win_probability).abs()
    }

    pub fn is_high_variance(&self) -> bool {
        self.variance_indicator == VarianceIndicator::High
    }

    /// Machine-readable summary for downstream report generators.
    pub fn summary(&self) -> serde_json::Value {
        let (most_likely_home, most_likely_away) = self.score_distribution.most_likely_score();
        let games = self.games_recorded();
        json!({
            "home_team_id": self.home_team_id,
            "away_team_id": self.away_team_id,
            "iterations": self.total_iterations,
            "home_win_probability": self.home_win_probability,
            "away_win_probability": self.away_win_probability,
            "predicted_winner": self.predicted_winner(),
            "confidence_score": self.confidence_score,
            "variance_indicator": self.variance_indicator.as_str(),
            "overtime_rate": self.overtime_rate(),
            "shootout_rate": self.shootout_rate(),
            "most_likely_score": [most_likely_home, most_likely_away],
            "average_home_goals": self.score_distribution.average_home_goals(games),
            "average_away_goals": self.score_distribution.average_away_goals(games),
            "average_home_xg": self.average_home_xg,
            "average_away_xg": self.average_away_xg,
            "segment_win_rates": self.segment_win_rates,
            "overall_advantage": self.matchup_analysis.overall_advantage(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_result_order_independent() {
        let results = [(3, 2), (2, 2), (3, 2), (0, 1), (3, 2), (2, 2)];

        let mut forward = ScoreDistribution::new();
        for &(h, a) in &results {
            forward.add_result(h, a);
        }
        let mut reversed = ScoreDistribution::new();
        for &(h, a) in results.iter().rev() {
            reversed.add_result(h, a);
        }

        assert_eq!(forward.most_likely_score(), (3, 2));
        assert_eq!(reversed.most_likely_score(), (3, 2));
        assert_eq!(forward.score_count(2, 2), reversed.score_count(2, 2));
        assert_eq!(forward.recorded_games(), reversed.recorded_games());
        assert!(
            (forward.average_home_goals(6) - reversed.average_home_goals(6)).abs() < f64::EPSILON
        );
    }

    #[test]
    fn most_likely_score_tie_breaks_low() {
        let mut dist = ScoreDistribution::new();
        dist.add_result(5, 4);
        dist.add_result(1, 0);
        assert_eq!(dist.most_likely_score(), (1, 0));
    }

    #[test]
    fn empty_distribution_defaults() {
        let dist = ScoreDistribution::new();
        assert_eq!(dist.most_likely_score(), (0, 0));
        assert_eq!(dist.average_home_goals(0), 0.0);
    }
}
