//! Basketball game prediction core
//!
//! A temporal rating engine: Elo variants and Glicko-2 evolved game by game,
//! per-team rolling statistics, and point-in-time feature snapshots for a
//! downstream classifier.

pub mod features;
pub mod model;
pub mod rating;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::rating::elo::RestDayConfig;

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Four-factor box score summary for one team in one game
///
/// The standard basketball efficiency breakdown plus pace and offensive
/// rating, used as rolling-average features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourFactors {
    /// Possessions per 48 minutes
    pub pace: f64,
    /// Effective field goal percentage
    pub efg: f64,
    /// Turnover percentage
    pub tov: f64,
    /// Offensive rebound percentage
    pub orb: f64,
    /// Free throws per field goal attempt
    pub ftfga: f64,
    /// Offensive rating (points per 100 possessions)
    pub ortg: f64,
}

/// A single completed game
///
/// Games carry enough to derive the winner; the four-factor slices are
/// optional because not every upstream source provides box scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub date: NaiveDate,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_points: u32,
    pub away_points: u32,
    pub home_factors: Option<FourFactors>,
    pub away_factors: Option<FourFactors>,
}

impl Game {
    /// Returns the winning team (basketball has no draws)
    pub fn winner(&self) -> TeamId {
        if self.home_points > self.away_points {
            self.home_team
        } else {
            self.away_team
        }
    }

    /// Check if the given team won this game
    pub fn is_winner(&self, team: TeamId) -> bool {
        self.winner() == team
    }

    /// Score margin (positive = home win)
    pub fn margin(&self) -> i32 {
        self.home_points as i32 - self.away_points as i32
    }

    /// Check if a team was playing at home
    pub fn is_home(&self, team: TeamId) -> bool {
        self.home_team == team
    }

    /// Points scored by a specific team
    pub fn points_for(&self, team: TeamId) -> u32 {
        if self.is_home(team) {
            self.home_points
        } else {
            self.away_points
        }
    }

    /// Points conceded by a specific team
    pub fn points_against(&self, team: TeamId) -> u32 {
        if self.is_home(team) {
            self.away_points
        } else {
            self.home_points
        }
    }

    /// Four-factor slice for a specific team, if available
    pub fn factors_for(&self, team: TeamId) -> Option<&FourFactors> {
        if self.is_home(team) {
            self.home_factors.as_ref()
        } else {
            self.away_factors.as_ref()
        }
    }
}

/// Matched betting odds for a game (decimal odds)
///
/// Carried through into feature snapshots untouched; the engine itself
/// never reads them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameOdds {
    pub home: f64,
    pub away: f64,
}

/// A game plus optional odds context, the unit the orchestrator consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub game: Game,
    pub odds: Option<GameOdds>,
}

impl GameInfo {
    pub fn new(game: Game, odds: Option<GameOdds>) -> Self {
        GameInfo { game, odds }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopcastError {
    #[error("Unknown team: {0}")]
    UnknownTeam(TeamId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HoopcastError>;

/// Engine configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub elo: EloConfig,
    pub regression: RegressionConfig,
    pub features: FeatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EloConfig {
    /// K-factor: how much ratings change per game
    pub k: f64,
    /// Home advantage in rating points
    pub home_advantage: f64,
    /// Rest-day rating adjustments
    pub rest_days: RestDayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// League-mean rating that teams revert toward between seasons
    pub mean: f64,
    /// Fraction of the distance from the mean that survives the off-season
    pub factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Minimum prior games per team before a snapshot is usable
    pub min_games: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            elo: EloConfig {
                k: 20.0,
                home_advantage: 80.0,
                rest_days: RestDayConfig::default(),
            },
            regression: RegressionConfig {
                mean: 1500.0,
                factor: 0.75,
            },
            features: FeatureConfig { min_games: 10 },
        }
    }
}

impl EngineConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopcastError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HoopcastError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopcastError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
