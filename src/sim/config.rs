//! Simulation configuration. Bounds are validated before a run starts; a
//! config that passes [SimulationConfig::validate] cannot fail later for
//! configuration reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::team::TeamId;

pub const MIN_ITERATIONS: u32 = 100;
pub const MAX_ITERATIONS: u32 = 100_000;
pub const MAX_VARIANCE_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    SingleGame,
    /// Best-of-N playoff series.
    Series,
}

/// Base weights for the four game segments. Kept as a struct rather than a
/// map so every config always carries exactly the four defined segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentWeights {
    pub early_game: f64,
    pub mid_game: f64,
    pub late_game: f64,
    pub overtime: f64,
}

impl Default for SegmentWeights {
    fn default() -> Self {
        Self {
            early_game: 0.90,
            mid_game: 1.00,
            late_game: 1.10,
            overtime: 1.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub iterations: u32,
    pub mode: SimulationMode,
    /// Explicit seed for reproducible runs. None seeds from entropy.
    pub random_seed: Option<u64>,

    // Series settings
    pub series_games_to_win: u32,
    /// (home_wins, away_wins) already banked when resuming a live series.
    pub current_series_score: (u32, u32),

    // Feature toggles
    pub use_synergy_adjustments: bool,
    pub use_clutch_adjustments: bool,
    pub use_fatigue_adjustments: bool,

    pub segment_weights: SegmentWeights,
    /// Standard deviation of the per-segment xG perturbation.
    pub variance_factor: f64,
}

impl SimulationConfig {
    pub fn new(home_team_id: TeamId, away_team_id: TeamId) -> Self {
        Self {
            home_team_id,
            away_team_id,
            iterations: 10_000,
            mode: SimulationMode::SingleGame,
            random_seed: None,
            series_games_to_win: 4,
            current_series_score: (0, 0),
            use_synergy_adjustments: true,
            use_clutch_adjustments: true,
            use_fatigue_adjustments: true,
            segment_weights: SegmentWeights::default(),
            variance_factor: 0.15,
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(ConfigError::IterationsOutOfRange(self.iterations));
        }
        if !(0.0..=MAX_VARIANCE_FACTOR).contains(&self.variance_factor)
            || !self.variance_factor.is_finite()
        {
            return Err(ConfigError::VarianceOutOfRange(self.variance_factor));
        }
        if self.mode == SimulationMode::Series {
            if self.series_games_to_win == 0 {
                return Err(ConfigError::SeriesLengthInvalid(self.series_games_to_win));
            }
            let (home, away) = self.current_series_score;
            if home >= self.series_games_to_win && away >= self.series_games_to_win {
                return Err(ConfigError::SeriesAlreadyDecided { home, away });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    IterationsOutOfRange(u32),
    VarianceOutOfRange(f64),
    SeriesLengthInvalid(u32),
    SeriesAlreadyDecided { home: u32, away: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::IterationsOutOfRange(n) => {
                write!(
                    f,
                    "iteration count {n} outside [{MIN_ITERATIONS}, {MAX_ITERATIONS}]"
                )
            }
            ConfigError::VarianceOutOfRange(v) => {
                write!(f, "variance factor {v} outside [0, {MAX_VARIANCE_FACTOR}]")
            }
            ConfigError::SeriesLengthInvalid(n) => {
                write!(f, "series games-to-win must be positive, got {n}")
            }
            ConfigError::SeriesAlreadyDecided { home, away } => {
                write!(f, "series score {home}-{away} already decides both sides")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
