//! Monte Carlo game and series simulation.
//!
//! Per simulated game the state machine is early -> mid -> late, then
//! overtime only on a regulation tie, then a shootout only on a scoreless
//! overtime. All matchup analysis, expected goals, and team adjustments are
//! computed once per simulation call and frozen; the iteration loop owns
//! nothing but the generator and the accumulating aggregates.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::data::analytics::{AnalyticsInputs, ScheduleContext, NO_ANALYTICS};
use crate::data::player::PlayerMap;
use crate::data::team::Team;
use crate::sim::adjustments::{AdjustmentCalculator, TeamAdjustments};
use crate::sim::config::{ConfigError, SimulationConfig, SimulationMode};
use crate::sim::matchups::{MatchupAnalysis, MatchupAnalyzer};
use crate::sim::models::{
    ScoreDistribution, Segment, SegmentResult, Side, SimulatedGame, SimulationResult,
    VarianceIndicator,
};
use crate::sim::rng::SimRng;
use crate::sim::xg::{ExpectedGoalsCalculator, TeamExpectedGoals};

const SAMPLE_GAME_LIMIT: usize = 10;
const SHOOTOUT_ROUNDS: u32 = 3;
const SHOOTOUT_SUCCESS_RATE: f64 = 0.33;
/// Sudden death is almost surely finite; the cap only guards degenerate
/// success probabilities.
const MAX_SUDDEN_DEATH_ROUNDS: u32 = 1000;
const OVERTIME_MINUTES: f64 = 5.0;
const OVERTIME_SCORING_BONUS: f64 = 1.5;
const OVERTIME_GOAL_PROBABILITY: f64 = 0.5;

pub type SimResult<T> = Result<T, SimulationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(ConfigError),
    /// The run was cancelled between iterations; no partial aggregates are
    /// returned.
    Cancelled,
    /// Sudden-death shootout hit the round cap without a decision.
    ShootoutStalled,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "invalid configuration: {err}"),
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
            SimulationError::ShootoutStalled => {
                write!(f, "shootout failed to decide within {MAX_SUDDEN_DEATH_ROUNDS} rounds")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

/// Cooperative cancellation flag checked between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-call inputs resolved by the caller before simulation starts. The
/// core performs no data fetches of its own.
#[derive(Clone, Copy, Default)]
pub struct GameContext<'a> {
    pub players: Option<&'a PlayerMap>,
    pub home_schedule: Option<&'a ScheduleContext>,
    pub away_schedule: Option<&'a ScheduleContext>,
    pub cancel: Option<&'a CancelToken>,
}

impl<'a> GameContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(mut self, players: &'a PlayerMap) -> Self {
        self.players = Some(players);
        self
    }

    pub fn with_schedules(
        mut self,
        home: &'a ScheduleContext,
        away: &'a ScheduleContext,
    ) -> Self {
        self.home_schedule = Some(home);
        self.away_schedule = Some(away);
        self
    }

    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Ephemeral per-iteration, per-segment inputs.
struct SegmentContext {
    segment: Segment,
    home_xg_base: f64,
    away_xg_base: f64,
    segment_weight: f64,
    clutch_home: f64,
    clutch_away: f64,
    fatigue_home: f64,
    fatigue_away: f64,
}

/// Everything frozen for the duration of one simulation call.
struct FrozenMatchup<'a> {
    home_team: &'a Team,
    away_team: &'a Team,
    home_xg: TeamExpectedGoals,
    away_xg: TeamExpectedGoals,
    home_adjustments: TeamAdjustments,
    away_adjustments: TeamAdjustments,
}

/// Monte Carlo simulation engine over a borrowed analytics bundle.
pub struct SimulationEngine<'a> {
    xg_calculator: ExpectedGoalsCalculator,
    analytics: AnalyticsInputs<'a>,
}

impl Default for SimulationEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine<'static> {
    pub fn new() -> Self {
        Self {
            xg_calculator: ExpectedGoalsCalculator::new(),
            analytics: AnalyticsInputs::neutral(),
        }
    }
}

impl<'a> SimulationEngine<'a> {
    pub fn with_analytics(analytics: AnalyticsInputs<'a>) -> SimulationEngine<'a> {
        SimulationEngine {
            xg_calculator: ExpectedGoalsCalculator::new(),
            analytics,
        }
    }

    pub fn with_xg_calculator(mut self, calculator: ExpectedGoalsCalculator) -> Self {
        self.xg_calculator = calculator;
        self
    }

    /// Runs a complete simulation. One generator is seeded per call; an
    /// identical seed with identical inputs reproduces the aggregate result
    /// bit for bit.
    pub fn simulate(
        &self,
        config: &SimulationConfig,
        home_team: &Team,
        away_team: &Team,
        context: &GameContext<'_>,
    ) -> SimResult<SimulationResult> {
        config.validate()?;
        let mut rng = SimRng::from_seed(config.random_seed);

        info!(
            "starting simulation: {} vs {} ({} iterations)",
            home_team.name, away_team.name, config.iterations
        );

        let empty_players = PlayerMap::new();
        let players = context.players.unwrap_or(&empty_players);

        let matchup_analyzer = if config.use_synergy_adjustments {
            MatchupAnalyzer::new().with_synergy(self.analytics.synergy)
        } else {
            MatchupAnalyzer::new().with_synergy(&NO_ANALYTICS)
        };
        let analysis = matchup_analyzer.analyze_full_matchup(home_team, away_team, players);

        let (home_xg, away_xg) = self
            .xg_calculator
            .calculate_matchup_xg(home_team, away_team, players);
        debug!(
            "baseline xg: home {:.2} away {:.2}",
            home_xg.total_xg_for, away_xg.total_xg_for
        );

        let adjustment_calculator =
            AdjustmentCalculator::new(self.analytics, config.segment_weights);
        let matchup = FrozenMatchup {
            home_team,
            away_team,
            home_adjustments: adjustment_calculator.calculate_full_adjustments(
                home_team,
                players,
                context.home_schedule,
            ),
            away_adjustments: adjustment_calculator.calculate_full_adjustments(
                away_team,
                players,
                context.away_schedule,
            ),
            home_xg,
            away_xg,
        };

        let result = match config.mode {
            SimulationMode::SingleGame => {
                self.simulate_games(config, &matchup, analysis, players, context, &mut rng)?
            }
            SimulationMode::Series => {
                self.simulate_series(config, &matchup, analysis, players, context, &mut rng)?
            }
        };

        info!(
            "simulation complete: home {:.1}% away {:.1}%",
            result.home_win_probability * 100.0,
            result.away_win_probability * 100.0
        );
        Ok(result)
    }

    fn simulate_games(
        &self,
        config: &SimulationConfig,
        matchup: &FrozenMatchup<'_>,
        analysis: MatchupAnalysis,
        players: &PlayerMap,
        context: &GameContext<'_>,
        rng: &mut SimRng,
    ) -> SimResult<SimulationResult> {
        let mut aggregate = Aggregate::new();

        for i in 0..config.iterations {
            check_cancelled(context)?;
            let game = self.simulate_single_game(i + 1, config, matchup, false, rng)?;
            aggregate.record(&game, matchup.home_team.team_id);
        }

        Ok(self.finish(config, matchup, analysis, players, aggregate))
    }

    fn simulate_series(
        &self,
        config: &SimulationConfig,
        matchup: &FrozenMatchup<'_>,
        analysis: MatchupAnalysis,
        players: &PlayerMap,
        context: &GameContext<'_>,
        rng: &mut SimRng,
    ) -> SimResult<SimulationResult> {
        let games_to_win = config.series_games_to_win;
        let (start_home, start_away) = config.current_series_score;
        let mut aggregate = Aggregate::new();

        for _ in 0..config.iterations {
            check_cancelled(context)?;

            let mut home_series_wins = start_home;
            let mut away_series_wins = start_away;

            while home_series_wins < games_to_win && away_series_wins < games_to_win {
                // 2-2-1-1-1 rotation on the absolute game index, so a
                // resumed series keeps its original venue pattern
                let game_index = home_series_wins + away_series_wins;
                let home_ice = matches!(game_index, 0 | 1 | 4 | 6);

                let game =
                    self.simulate_single_game(game_index + 1, config, matchup, !home_ice, rng)?;
                if game.winner == matchup.home_team.team_id {
                    home_series_wins += 1;
                } else {
                    away_series_wins += 1;
                }
                aggregate.record_series_game(&game);
            }

            aggregate.record_series_outcome(home_series_wins == games_to_win);
        }

        Ok(self.finish(config, matchup, analysis, players, aggregate))
    }

    /// One full trial. With `venue_swapped` the away team carries the
    /// home-ice edge (road game in a series).
    fn simulate_single_game(
        &self,
        game_number: u32,
        config: &SimulationConfig,
        matchup: &FrozenMatchup<'_>,
        venue_swapped: bool,
        rng: &mut SimRng,
    ) -> SimResult<SimulatedGame> {
        let (home_xg, away_xg) = if venue_swapped {
            // Road game: the hosting side's boost moves across
            (&matchup.away_xg, &matchup.home_xg)
        } else {
            (&matchup.home_xg, &matchup.away_xg)
        };
        let (home_adj, away_adj) = if venue_swapped {
            (&matchup.away_adjustments, &matchup.home_adjustments)
        } else {
            (&matchup.home_adjustments, &matchup.away_adjustments)
        };

        let mut game = SimulatedGame {
            game_number,
            home_score: 0,
            away_score: 0,
            winner: 0,
            went_to_overtime: false,
            went_to_shootout: false,
            segments: Vec::with_capacity(4),
            home_xg_total: 0.0,
            away_xg_total: 0.0,
        };

        for segment in Segment::REGULATION {
            let ctx = build_segment_context(segment, config, home_xg, away_xg, home_adj, away_adj);
            let result = simulate_segment(&ctx, config.variance_factor, rng);

            game.home_score += result.home_goals;
            game.away_score += result.away_goals;
            game.home_xg_total += result.home_xg;
            game.away_xg_total += result.away_xg;
            game.segments.push(result);
        }

        if game.home_score == game.away_score {
            simulate_overtime(&mut game, config, home_xg, away_xg, rng)?;
        }

        let (home_id, away_id) = if venue_swapped {
            (matchup.away_team.team_id, matchup.home_team.team_id)
        } else {
            (matchup.home_team.team_id, matchup.away_team.team_id)
        };
        game.winner = if game.home_score > game.away_score {
            home_id
        } else {
            away_id
        };
        Ok(game)
    }

    fn finish(
        &self,
        config: &SimulationConfig,
        matchup: &FrozenMatchup<'_>,
        analysis: MatchupAnalysis,
        players: &PlayerMap,
        aggregate: Aggregate,
    ) -> SimulationResult {
        let confidence =
            self.confidence_score(matchup.home_team, matchup.away_team, players);
        aggregate.into_result(
            config,
            matchup.home_team.team_id,
            matchup.away_team.team_id,
            analysis,
            confidence,
        )
    }

    /// Data-quality confidence, clamped to [0, 1].
    fn confidence_score(&self, home_team: &Team, away_team: &Team, players: &PlayerMap) -> f64 {
        let mut score: f64 = 0.5;

        let home_games = home_team.stats.games_played;
        let away_games = away_team.stats.games_played;
        if home_games >= 20 && away_games >= 20 {
            score += 0.2;
        } else if home_games >= 10 && away_games >= 10 {
            score += 0.1;
        }

        if !home_team.forward_lines.is_empty() && !away_team.forward_lines.is_empty() {
            score += 0.1;
        }

        let covered = |team: &Team| {
            team.roster
                .all_players()
                .filter(|id| players.contains_key(id))
                .count()
        };
        if covered(home_team) >= 15 && covered(away_team) >= 15 {
            score += 0.1;
        }

        if self.analytics.synergy.available() {
            score += 0.05;
        }
        if self.analytics.clutch.available() {
            score += 0.05;
        }

        score.clamp(0.0, 1.0)
    }
}

fn check_cancelled(context: &GameContext<'_>) -> SimResult<()> {
    match context.cancel {
        Some(token) if token.is_cancelled() => Err(SimulationError::Cancelled),
        _ => Ok(()),
    }
}

fn build_segment_context(
    segment: Segment,
    config: &SimulationConfig,
    home_xg: &TeamExpectedGoals,
    away_xg: &TeamExpectedGoals,
    home_adj: &TeamAdjustments,
    away_adj: &TeamAdjustments,
) -> SegmentContext {
    let base = |xg: &TeamExpectedGoals| match segment {
        Segment::EarlyGame => xg.early_game_xg_for,
        Segment::MidGame => xg.mid_game_xg_for,
        Segment::LateGame | Segment::Overtime => xg.late_game_xg_for,
    };
    let segment_weight = match segment {
        Segment::EarlyGame => config.segment_weights.early_game,
        Segment::MidGame => config.segment_weights.mid_game,
        Segment::LateGame => config.segment_weights.late_game,
        Segment::Overtime => config.segment_weights.overtime,
    };

    let (clutch_home, clutch_away) = if config.use_clutch_adjustments {
        (
            home_adj.segment(segment).clutch_factor,
            away_adj.segment(segment).clutch_factor,
        )
    } else {
        (1.0, 1.0)
    };
    let (fatigue_home, fatigue_away) = if config.use_fatigue_adjustments {
        (
            home_adj.segment(segment).fatigue_factor,
            away_adj.segment(segment).fatigue_factor,
        )
    } else {
        (1.0, 1.0)
    };

    SegmentContext {
        segment,
        home_xg_base: base(home_xg),
        away_xg_base: base(away_xg),
        segment_weight,
        clutch_home,
        clutch_away,
        fatigue_home,
        fatigue_away,
    }
}

fn simulate_segment(ctx: &SegmentContext, variance: f64, rng: &mut SimRng) -> SegmentResult {
    let mut result = SegmentResult::new(ctx.segment);

    let home_xg =
        ctx.home_xg_base * ctx.segment_weight * ctx.clutch_home * ctx.fatigue_home;
    let away_xg =
        ctx.away_xg_base * ctx.segment_weight * ctx.clutch_away * ctx.fatigue_away;

    // Draw order is part of the determinism contract: perturb home, perturb
    // away, then goals home, goals away
    let home_xg = rng.perturb(home_xg, variance);
    let away_xg = rng.perturb(away_xg, variance);

    result.home_xg = home_xg;
    result.away_xg = away_xg;
    result.home_goals = rng.poisson(home_xg);
    result.away_goals = rng.poisson(away_xg);
    result.home_shots = result.home_goals.max((home_xg * 10.0) as u32);
    result.away_shots = result.away_goals.max((away_xg * 10.0) as u32);

    result.dominant_side = if result.home_goals > result.away_goals {
        Some(Side::Home)
    } else if result.away_goals > result.home_goals {
        Some(Side::Away)
    } else {
        None
    };

    result
}

fn simulate_overtime(
    game: &mut SimulatedGame,
    config: &SimulationConfig,
    home_xg: &TeamExpectedGoals,
    away_xg: &TeamExpectedGoals,
    rng: &mut SimRng,
) -> SimResult<()> {
    game.went_to_overtime = true;

    // 3-on-3 hockey scores well above the regulation rate
    let per_minute = |xg: &TeamExpectedGoals| xg.total_xg_for / 60.0;
    let home_ot_xg = rng.perturb(
        per_minute(home_xg) * OVERTIME_MINUTES * OVERTIME_SCORING_BONUS,
        config.variance_factor,
    );
    let away_ot_xg = rng.perturb(
        per_minute(away_xg) * OVERTIME_MINUTES * OVERTIME_SCORING_BONUS,
        config.variance_factor,
    );

    if rng.chance(OVERTIME_GOAL_PROBABILITY) {
        let total = home_ot_xg + away_ot_xg;
        let home_prob = if total > 0.0 {
            home_ot_xg / total
        } else {
            0.5
        };

        let home_scored = rng.chance(home_prob);
        if home_scored {
            game.home_score += 1;
        } else {
            game.away_score += 1;
        }

        let mut ot_result = SegmentResult::new(Segment::Overtime);
        ot_result.home_goals = u32::from(home_scored);
        ot_result.away_goals = u32::from(!home_scored);
        ot_result.home_xg = home_ot_xg;
        ot_result.away_xg = away_ot_xg;
        ot_result.dominant_side = Some(if home_scored { Side::Home } else { Side::Away });
        game.segments.push(ot_result);
        Ok(())
    } else {
        simulate_shootout(game, rng)
    }
}

fn simulate_shootout(game: &mut SimulatedGame, rng: &mut SimRng) -> SimResult<()> {
    game.went_to_shootout = true;

    let mut home_goals = 0u32;
    let mut away_goals = 0u32;
    for _ in 0..SHOOTOUT_ROUNDS {
        if rng.chance(SHOOTOUT_SUCCESS_RATE) {
            home_goals += 1;
        }
        if rng.chance(SHOOTOUT_SUCCESS_RATE) {
            away_goals += 1;
        }
    }

    let mut rounds = 0u32;
    while home_goals == away_goals {
        if rounds >= MAX_SUDDEN_DEATH_ROUNDS {
            return Err(SimulationError::ShootoutStalled);
        }
        rounds += 1;

        let home_scores = rng.chance(SHOOTOUT_SUCCESS_RATE);
        let away_scores = rng.chance(SHOOTOUT_SUCCESS_RATE);
        if home_scores && !away_scores {
            home_goals += 1;
        } else if away_scores && !home_scores {
            away_goals += 1;
        }
    }

    // The decided side gets exactly one goal on the scoreboard
    if home_goals > away_goals {
        game.home_score += 1;
    } else {
        game.away_score += 1;
    }
    Ok(())
}

/// Running aggregates for the iteration loop; folded into the final
/// [SimulationResult] exactly once.
struct Aggregate {
    games_recorded: u32,
    home_wins: u32,
    away_wins: u32,
    overtime_games: u32,
    shootout_games: u32,
    home_xg_sum: f64,
    away_xg_sum: f64,
    score_distribution: ScoreDistribution,
    sample_games: Vec<SimulatedGame>,
    // [home, away, tie] per regulation segment
    segment_tallies: BTreeMap<Segment, [u64; 3]>,
}

impl Aggregate {
    fn new() -> Self {
        Self {
            games_recorded: 0,
            home_wins: 0,
            away_wins: 0,
            overtime_games: 0,
            shootout_games: 0,
            home_xg_sum: 0.0,
            away_xg_sum: 0.0,
            score_distribution: ScoreDistribution::new(),
            sample_games: Vec::with_capacity(SAMPLE_GAME_LIMIT),
            segment_tallies: BTreeMap::new(),
        }
    }

    /// Records one single-game-mode trial.
    fn record(&mut self, game: &SimulatedGame, home_team_id: u32) {
        if game.winner == home_team_id {
            self.home_wins += 1;
        } else {
            self.away_wins += 1;
        }
        self.record_game_details(game);
    }

    /// Records one game inside a series trial; series wins are tallied
    /// separately via [Self::record_series_outcome].
    fn record_series_game(&mut self, game: &SimulatedGame) {
        self.record_game_details(game);
    }

    fn record_series_outcome(&mut self, home_won: bool) {
        if home_won {
            self.home_wins += 1;
        } else {
            self.away_wins += 1;
        }
    }

    fn record_game_details(&mut self, game: &SimulatedGame) {
        self.games_recorded += 1;
        if game.went_to_overtime {
            self.overtime_games += 1;
        }
        if game.went_to_shootout {
            self.shootout_games += 1;
        }
        self.score_distribution
            .add_result(game.home_score, game.away_score);
        self.home_xg_sum += game.home_xg_total;
        self.away_xg_sum += game.away_xg_total;

        for segment in &game.segments {
            if segment.segment == Segment::Overtime {
                continue;
            }
            let tally = self.segment_tallies.entry(segment.segment).or_insert([0; 3]);
            match segment.dominant_side {
                Some(Side::Home) => tally[0] += 1,
                Some(Side::Away) => tally[1] += 1,
                None => tally[2] += 1,
            }
        }

        if self.sample_games.len() < SAMPLE_GAME_LIMIT {
            self.sample_games.push(game.clone());
        }
    }

    fn into_result(
        self,
        config: &SimulationConfig,
        home_team_id: u32,
        away_team_id: u32,
        matchup_analysis: MatchupAnalysis,
        confidence_score: f64,
    ) -> SimulationResult {
        let iterations = f64::from(config.iterations);
        let home_win_probability = f64::from(self.home_wins) / iterations;
        let away_win_probability = f64::from(self.away_wins) / iterations;

        let win_margin = (home_win_probability - away_win_probability).abs();
        let variance_indicator = if win_margin < 0.08 {
            VarianceIndicator::High
        } else if win_margin < 0.20 {
            VarianceIndicator::Normal
        } else {
            VarianceIndicator::Low
        };

        let mut segment_win_rates = BTreeMap::new();
        for (segment, [home, away, tie]) in &self.segment_tallies {
            let total = home + away + tie;
            if total > 0 {
                segment_win_rates.insert(
                    format!("{}_home_win_rate", segment.as_str()),
                    *home as f64 / total as f64,
                );
                segment_win_rates.insert(
                    format!("{}_away_win_rate", segment.as_str()),
                    *away as f64 / total as f64,
                );
            }
        }

        let games = self.games_recorded.max(1);
        SimulationResult {
            home_team_id,
            away_team_id,
            total_iterations: config.iterations,
            home_wins: self.home_wins,
            away_wins: self.away_wins,
            overtime_games: self.overtime_games,
            shootout_games: self.shootout_games,
            home_win_probability,
            away_win_probability,
            confidence_score,
            variance_indicator,
            average_home_xg: self.home_xg_sum / f64::from(games),
            average_away_xg: self.away_xg_sum / f64::from(games),
            segment_win_rates,
            matchup_analysis,
            score_distribution: self.score_distribution,
            sample_games: self.sample_games,
        }
    }
}
