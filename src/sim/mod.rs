//! Monte Carlo simulation core: configuration, expected goals, matchup
//! analysis, adjustments, and the game/series engine.

pub mod adjustments;
pub mod config;
pub mod engine;
pub mod matchups;
pub mod models;
pub mod rng;
pub mod xg;

pub use adjustments::{
    AdjustmentCalculator, FatigueLevel, MomentumTracker, ScheduleFactors, SegmentAdjustment,
    TeamAdjustments,
};
pub use config::{ConfigError, SegmentWeights, SimulationConfig, SimulationMode};
pub use engine::{
    CancelToken, GameContext, SimResult, SimulationEngine, SimulationError,
};
pub use matchups::{LineMatchup, MatchupAnalysis, MatchupAnalyzer, MatchupStrength};
pub use models::{
    ScoreDistribution, Segment, SegmentResult, Side, SimulatedGame, SimulationResult,
    VarianceIndicator,
};
pub use rng::SimRng;
pub use xg::{
    ExpectedGoalsCalculator, LineExpectedGoals, TeamExpectedGoals, ZoneExpectedGoals,
    HOME_ICE_MULTIPLIER,
};
