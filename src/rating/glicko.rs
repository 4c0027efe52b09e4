//! Glicko-2 rating calculator
//!
//! Extends Elo with an explicit rating deviation (uncertainty) and
//! volatility, updated per the published Glicko-2 algorithm. The volatility
//! step solves f(x) = 0 with the Illinois variant of regula falsi; this is
//! the numerically delicate heart of the module.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Game, TeamId};

/// Glicko-2 internal scale factor
const SCALE: f64 = 173.7178;
/// System constant constraining volatility change per game
const TAU: f64 = 0.5;
/// Convergence tolerance for the volatility solver
const EPSILON: f64 = 1e-6;
/// Deviation of a team we know nothing about
const DEFAULT_RD: f64 = 350.0;
/// Deviation floor: never get more certain than this
const MIN_RD: f64 = 30.0;
/// Solver iteration cap; reaching it is a logic defect, not a runtime error
const MAX_ITERATIONS: usize = 100;

/// Per-team Glicko-2 state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlickoScore {
    pub team: TeamId,
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
    pub last_game_date: Option<NaiveDate>,
}

impl GlickoScore {
    pub fn new(team: TeamId) -> Self {
        GlickoScore {
            team,
            rating: 1500.0,
            rating_deviation: DEFAULT_RD,
            volatility: 0.06,
            last_game_date: None,
        }
    }
}

/// Result of a single Glicko-2 update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlickoRating {
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
}

/// Glicko-2 update and win-probability engine
///
/// Stateless; all inputs are read-only and the inactivity decay is computed
/// internally rather than written back, so the same pre-game scores can be
/// rated from both teams' perspectives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Glicko2Calculator;

impl Glicko2Calculator {
    pub fn new() -> Self {
        Glicko2Calculator
    }

    /// Compute the team's post-game rating against one opponent
    pub fn calculate_rating(
        &self,
        team: &GlickoScore,
        opponent: &GlickoScore,
        game: &Game,
    ) -> GlickoRating {
        // Step 1: inflate deviations for inactivity since each side's last game
        let team_rd = Self::decayed_deviation(team, game.date);
        let opponent_rd = Self::decayed_deviation(opponent, game.date);

        // Step 2: convert to the internal scale
        let mu = (team.rating - 1500.0) / SCALE;
        let phi = team_rd / SCALE;
        let sigma = team.volatility;

        let opponent_mu = (opponent.rating - 1500.0) / SCALE;
        let opponent_phi = opponent_rd / SCALE;

        // Step 3: estimated variance of the team's rating from this game
        let g = Self::g(opponent_phi);
        let e = Self::e(mu, opponent_mu, opponent_phi);
        let v = 1.0 / (g * g * e * (1.0 - e));

        // Step 4: performance difference
        let score = if game.winner() == team.team { 1.0 } else { 0.0 };
        let delta = v * g * (score - e);

        // Step 5: new volatility
        let new_sigma = Self::update_volatility(sigma, phi, v, delta);

        // Steps 6-7: new deviation
        let phi_star = (phi * phi + new_sigma * new_sigma).sqrt();
        let new_phi = 1.0 / ((1.0 / (phi_star * phi_star)) + (1.0 / v)).sqrt();

        // Step 8: new rating, back on the external scale
        let new_mu = mu + new_phi * new_phi * g * (score - e);

        let rating = SCALE * new_mu + 1500.0;
        let rating_deviation = (SCALE * new_phi).max(MIN_RD);

        GlickoRating {
            rating,
            rating_deviation,
            volatility: new_sigma,
        }
    }

    /// Pre-game win probability for `team` over `opponent`
    ///
    /// Uses the larger of the two deviations as the effective uncertainty:
    /// when either side is poorly known, the estimate stays conservative.
    pub fn predict_win_probability(&self, team: &GlickoScore, opponent: &GlickoScore) -> f64 {
        let mu = (team.rating - 1500.0) / SCALE;
        let opponent_mu = (opponent.rating - 1500.0) / SCALE;

        let team_phi = team.rating_deviation / SCALE;
        let opponent_phi = opponent.rating_deviation / SCALE;
        let effective_phi = team_phi.max(opponent_phi);

        let g = Self::g(effective_phi);
        1.0 / (1.0 + (-g * (mu - opponent_mu)).exp())
    }

    /// Deviation after inactivity decay, on the external scale
    ///
    /// One rating period per week of idleness; a team with no recorded game
    /// keeps its stored deviation.
    fn decayed_deviation(score: &GlickoScore, game_date: NaiveDate) -> f64 {
        let Some(last_game_date) = score.last_game_date else {
            return score.rating_deviation;
        };

        let days_idle = (game_date - last_game_date).num_days() as f64;
        let rating_periods = days_idle / 7.0;
        if rating_periods <= 0.0 {
            return score.rating_deviation;
        }

        let phi = score.rating_deviation / SCALE;
        let sigma = score.volatility;

        let new_phi = (phi * phi + rating_periods * sigma * sigma).sqrt();
        (SCALE * new_phi).min(DEFAULT_RD)
    }

    /// Solve for the new volatility with the Illinois algorithm
    fn update_volatility(sigma: f64, phi: f64, v: f64, delta: f64) -> f64 {
        let a = (sigma * sigma).ln();
        let delta_sq = delta * delta;
        let phi_sq = phi * phi;
        let tau_sq = TAU * TAU;

        let f = |x: f64| {
            let ex = x.exp();
            let num1 = ex * (delta_sq - phi_sq - v - ex);
            let denom1 = 2.0 * (phi_sq + v + ex).powi(2);
            (num1 / denom1) - ((x - a) / tau_sq)
        };

        // Initial bracket: the upper bound is a; the lower bound either has
        // a closed form or is found by stepping down in units of tau
        let mut upper = a;
        let mut lower = if delta_sq > phi_sq + v {
            (delta_sq - phi_sq - v).ln()
        } else {
            let mut k = 1.0;
            while f(a - k * TAU) < 0.0 {
                k += 1.0;
            }
            a - k * TAU
        };

        let mut f_upper = f(upper);
        let mut f_lower = f(lower);

        let mut iterations = 0;
        while (lower - upper).abs() > EPSILON {
            let candidate = upper + (upper - lower) * f_upper / (f_lower - f_upper);
            let f_candidate = f(candidate);

            if f_candidate * f_lower <= 0.0 {
                upper = lower;
                f_upper = f_lower;
            } else {
                // Illinois step: halve the retained endpoint's weight so the
                // bracket cannot stall on one side
                f_upper /= 2.0;
            }

            lower = candidate;
            f_lower = f_candidate;

            iterations += 1;
            debug_assert!(
                iterations < MAX_ITERATIONS,
                "volatility solver failed to converge"
            );
            if iterations >= MAX_ITERATIONS {
                break;
            }
        }

        (upper / 2.0).exp()
    }

    fn g(phi: f64) -> f64 {
        1.0 / (1.0 + 3.0 * phi * phi / (std::f64::consts::PI * std::f64::consts::PI)).sqrt()
    }

    fn e(mu: f64, opponent_mu: f64, opponent_phi: f64) -> f64 {
        1.0 / (1.0 + (-Self::g(opponent_phi) * (mu - opponent_mu)).exp())
    }
}
