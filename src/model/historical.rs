//! Historical model orchestration
//!
//! Owns one `TeamStatistics` per configured team and advances all of them
//! one game at a time. For each game the pre-game state of both sides feeds
//! the rating calculators, and only then do the updates land: snapshots
//! taken before `evolve` are guaranteed to be point-in-time correct.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::team_state::TeamStatistics;
use crate::rating::elo::EloVariant;
use crate::rating::glicko::Glicko2Calculator;
use crate::{EngineConfig, GameInfo, HoopcastError, Result, TeamId};

/// Evolves per-team state over an ordered stream of games
///
/// Games must arrive in non-decreasing date order; this is a caller-enforced
/// precondition. Out-of-order ingestion silently corrupts rolling-window and
/// momentum semantics.
#[derive(Debug, Clone)]
pub struct HistoricalModel {
    elo: EloVariant,
    glicko: Glicko2Calculator,
    teams: HashMap<TeamId, TeamStatistics>,
}

impl HistoricalModel {
    pub fn new(elo: EloVariant, glicko: Glicko2Calculator, team_ids: &HashSet<TeamId>) -> Self {
        let teams = team_ids
            .iter()
            .map(|&id| (id, TeamStatistics::new(id)))
            .collect();

        debug!(teams = team_ids.len(), "historical model created");

        HistoricalModel { elo, glicko, teams }
    }

    /// Build a model with the canonical calculator (margin + rest days)
    /// from an engine configuration
    pub fn from_config(config: &EngineConfig, team_ids: &HashSet<TeamId>) -> Self {
        let elo = EloVariant::MarginRestDays {
            k: config.elo.k,
            home_advantage: config.elo.home_advantage,
            rest: config.elo.rest_days,
        };
        Self::new(elo, Glicko2Calculator::new(), team_ids)
    }

    pub fn elo_calculator(&self) -> &EloVariant {
        &self.elo
    }

    pub fn glicko_calculator(&self) -> &Glicko2Calculator {
        &self.glicko
    }

    pub fn team(&self, id: TeamId) -> Result<&TeamStatistics> {
        self.teams.get(&id).ok_or(HoopcastError::UnknownTeam(id))
    }

    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.teams.keys().copied()
    }

    /// Most recent Elo rating for a team strictly before `date`
    pub fn rating_before(&self, id: TeamId, date: chrono::NaiveDate) -> Result<f64> {
        // The history is seeded at construction, so a baseline always exists
        Ok(self
            .team(id)?
            .rating_before(date)
            .unwrap_or(1500.0))
    }

    /// Advance both participants of a game
    ///
    /// Reads the pre-game state of both teams, computes the Elo pair update
    /// and each side's Glicko update from that state, then applies both.
    pub fn evolve(&mut self, info: &GameInfo) -> Result<()> {
        let game = &info.game;

        let home = self.team(game.home_team)?;
        let away = self.team(game.away_team)?;

        let (new_home_elo, new_away_elo) = self.elo.calculate(home, away, game);
        let new_home_glicko = self.glicko.calculate_rating(&home.glicko, &away.glicko, game);
        let new_away_glicko = self.glicko.calculate_rating(&away.glicko, &home.glicko, game);

        // Pre-game reads are done; apply both updates
        let home = self
            .teams
            .get_mut(&game.home_team)
            .ok_or(HoopcastError::UnknownTeam(game.home_team))?;
        home.add_game(game, new_home_elo, new_home_glicko);

        let away = self
            .teams
            .get_mut(&game.away_team)
            .ok_or(HoopcastError::UnknownTeam(game.away_team))?;
        away.add_game(game, new_away_elo, new_away_glicko);

        Ok(())
    }

    /// Apply season-boundary regression to every team
    pub fn regress(&mut self, mean: f64, factor: f64) {
        debug!(mean, factor, "season regression");
        for team in self.teams.values_mut() {
            team.regress(mean, factor);
        }
    }

    /// Independent deep copy for branch simulation
    ///
    /// Every team's history and windows are copied by value: mutating the
    /// fork never disturbs the source, and vice versa.
    pub fn fork(&self) -> Self {
        self.clone()
    }
}
