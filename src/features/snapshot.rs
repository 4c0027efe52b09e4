//! Point-in-time feature snapshots
//!
//! Flattens the pre-game state of both participants into one record for a
//! downstream classifier. Snapshots must be taken before the model evolves
//! past the game, otherwise the label leaks into the features.

use serde::{Deserialize, Serialize};

use crate::model::HistoricalModel;
use crate::{GameInfo, Result, TeamId};

/// Flat feature record for one game, built from pre-game state
///
/// Odds ride along untouched when the upstream source matched them; they
/// are not part of the dense vector because they are not always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFeatures {
    pub game_id: i64,
    pub home_team: TeamId,
    pub away_team: TeamId,

    pub home_elo_rating: f32,
    pub away_elo_rating: f32,

    pub home_elo_momentum_5: f32,
    pub away_elo_momentum_5: f32,

    pub home_elo_momentum_10: f32,
    pub away_elo_momentum_10: f32,

    pub home_elo_probability: f32,
    pub away_elo_probability: f32,

    pub home_glicko_rating: f32,
    pub away_glicko_rating: f32,

    pub home_glicko_deviation: f32,
    pub away_glicko_deviation: f32,

    pub home_glicko_volatility: f32,
    pub away_glicko_volatility: f32,

    pub home_glicko_probability: f32,
    pub away_glicko_probability: f32,

    pub home_total_win_pct: f32,
    pub away_total_win_pct: f32,

    /// Home team's win percentage in home games
    pub home_win_pct_at_home: f32,
    /// Away team's win percentage in away games
    pub away_win_pct_when_away: f32,

    pub home_last_ten_win_pct: f32,
    pub away_last_ten_win_pct: f32,

    pub home_offensive_rating: f32,
    pub away_offensive_rating: f32,

    pub home_defensive_rating: f32,
    pub away_defensive_rating: f32,

    pub home_streak: f32,
    pub away_streak: f32,

    pub home_rest_days: f32,
    pub away_rest_days: f32,

    pub home_back_to_back: f32,
    pub away_back_to_back: f32,

    pub home_pace: f32,
    pub away_pace: f32,
    pub home_efg: f32,
    pub away_efg: f32,
    pub home_tov: f32,
    pub away_tov: f32,
    pub home_orb: f32,
    pub away_orb: f32,
    pub home_ftfga: f32,
    pub away_ftfga: f32,
    pub home_ortg: f32,
    pub away_ortg: f32,

    pub home_odds: Option<f32>,
    pub away_odds: Option<f32>,

    /// Classification label
    pub home_team_won: bool,
}

impl GameFeatures {
    /// Dimension of the dense feature vector
    pub const DIM: usize = 44;

    /// Build a snapshot from the model's current (pre-game) state
    ///
    /// Call before `HistoricalModel::evolve` for the same game.
    pub fn from_model(info: &GameInfo, model: &HistoricalModel) -> Result<Self> {
        let game = &info.game;
        let home = model.team(game.home_team)?;
        let away = model.team(game.away_team)?;

        let home_elo_probability = model.elo_calculator().predict_win_probability(home, away, game);
        // Complement rather than a swapped call: swapping sides would move
        // the home-advantage and rest adjustments to the wrong team
        let away_elo_probability = 1.0 - home_elo_probability;

        let home_glicko_probability = model
            .glicko_calculator()
            .predict_win_probability(&home.glicko, &away.glicko);
        let away_glicko_probability = model
            .glicko_calculator()
            .predict_win_probability(&away.glicko, &home.glicko);

        let home_factors = home.four_factor_averages();
        let away_factors = away.four_factor_averages();

        Ok(GameFeatures {
            game_id: game.id,
            home_team: game.home_team,
            away_team: game.away_team,

            home_elo_rating: home.elo_rating as f32,
            away_elo_rating: away.elo_rating as f32,

            home_elo_momentum_5: home.elo_momentum_5 as f32,
            away_elo_momentum_5: away.elo_momentum_5 as f32,

            home_elo_momentum_10: home.elo_momentum_10 as f32,
            away_elo_momentum_10: away.elo_momentum_10 as f32,

            home_elo_probability: home_elo_probability as f32,
            away_elo_probability: away_elo_probability as f32,

            home_glicko_rating: home.glicko.rating as f32,
            away_glicko_rating: away.glicko.rating as f32,

            home_glicko_deviation: home.glicko.rating_deviation as f32,
            away_glicko_deviation: away.glicko.rating_deviation as f32,

            home_glicko_volatility: home.glicko.volatility as f32,
            away_glicko_volatility: away.glicko.volatility as f32,

            home_glicko_probability: home_glicko_probability as f32,
            away_glicko_probability: away_glicko_probability as f32,

            home_total_win_pct: home.total_win_pct as f32,
            away_total_win_pct: away.total_win_pct as f32,

            home_win_pct_at_home: home.home_win_pct as f32,
            away_win_pct_when_away: away.away_win_pct as f32,

            home_last_ten_win_pct: home.last_ten_win_pct as f32,
            away_last_ten_win_pct: away.last_ten_win_pct as f32,

            home_offensive_rating: home.last_ten_offensive_rating as f32,
            away_offensive_rating: away.last_ten_offensive_rating as f32,

            home_defensive_rating: home.last_ten_defensive_rating as f32,
            away_defensive_rating: away.last_ten_defensive_rating as f32,

            home_streak: home.streak as f32,
            away_streak: away.streak as f32,

            home_rest_days: home.rest_days_for(game.date) as f32,
            away_rest_days: away.rest_days_for(game.date) as f32,

            home_back_to_back: if home.is_back_to_back(game.date) { 1.0 } else { 0.0 },
            away_back_to_back: if away.is_back_to_back(game.date) { 1.0 } else { 0.0 },

            home_pace: home_factors.pace as f32,
            away_pace: away_factors.pace as f32,
            home_efg: home_factors.efg as f32,
            away_efg: away_factors.efg as f32,
            home_tov: home_factors.tov as f32,
            away_tov: away_factors.tov as f32,
            home_orb: home_factors.orb as f32,
            away_orb: away_factors.orb as f32,
            home_ftfga: home_factors.ftfga as f32,
            away_ftfga: away_factors.ftfga as f32,
            home_ortg: home_factors.ortg as f32,
            away_ortg: away_factors.ortg as f32,

            home_odds: info.odds.map(|o| o.home as f32),
            away_odds: info.odds.map(|o| o.away as f32),

            home_team_won: game.home_points > game.away_points,
        })
    }

    /// Dense vector of the always-present features
    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            self.home_elo_rating,
            self.away_elo_rating,
            self.home_elo_momentum_5,
            self.away_elo_momentum_5,
            self.home_elo_momentum_10,
            self.away_elo_momentum_10,
            self.home_elo_probability,
            self.away_elo_probability,
            self.home_glicko_rating,
            self.away_glicko_rating,
            self.home_glicko_deviation,
            self.away_glicko_deviation,
            self.home_glicko_volatility,
            self.away_glicko_volatility,
            self.home_glicko_probability,
            self.away_glicko_probability,
            self.home_total_win_pct,
            self.away_total_win_pct,
            self.home_win_pct_at_home,
            self.away_win_pct_when_away,
            self.home_last_ten_win_pct,
            self.away_last_ten_win_pct,
            self.home_offensive_rating,
            self.away_offensive_rating,
            self.home_defensive_rating,
            self.away_defensive_rating,
            self.home_streak,
            self.away_streak,
            self.home_rest_days,
            self.away_rest_days,
            self.home_back_to_back,
            self.away_back_to_back,
            self.home_pace,
            self.away_pace,
            self.home_efg,
            self.away_efg,
            self.home_tov,
            self.away_tov,
            self.home_orb,
            self.away_orb,
            self.home_ftfga,
            self.away_ftfga,
            self.home_ortg,
            self.away_ortg,
        ]
    }
}

/// Accumulates feature snapshots for classifier training
///
/// Games where either side has too little history are excluded: early-season
/// windows are mostly empty and poison the training distribution.
#[derive(Debug, Clone)]
pub struct TrainingDataSet {
    min_games: u32,
    games: Vec<GameFeatures>,
}

impl TrainingDataSet {
    pub fn new(min_games: u32) -> Self {
        TrainingDataSet {
            min_games,
            games: Vec::new(),
        }
    }

    /// Snapshot a game if both teams have enough prior history
    ///
    /// Returns whether the game was included. Call before evolving the
    /// model past this game.
    pub fn add_game(&mut self, info: &GameInfo, model: &HistoricalModel) -> Result<bool> {
        let home = model.team(info.game.home_team)?;
        let away = model.team(info.game.away_team)?;

        if home.total_games < self.min_games || away.total_games < self.min_games {
            return Ok(false);
        }

        self.games.push(GameFeatures::from_model(info, model)?);
        Ok(true)
    }

    pub fn games(&self) -> &[GameFeatures] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for TrainingDataSet {
    fn default() -> Self {
        Self::new(10)
    }
}
