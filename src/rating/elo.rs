//! Elo rating calculator family
//!
//! A closed set of update strategies, from the plain symmetric update to the
//! canonical margin-of-victory variant with rest-day adjustments. All arms
//! are pure functions over the pre-game state: nothing here mutates a team.

use serde::{Deserialize, Serialize};

use crate::model::TeamStatistics;
use crate::Game;

/// Rating-point adjustment per days of rest
///
/// The 3+ day bonus is deliberately smaller than the 2-day bonus: long
/// layoffs cost sharpness, a single full rest day does not. Tuned against
/// historical seasons, not a monotonic curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestDayConfig {
    /// Playing the second game of a back-to-back
    pub back_to_back: f64,
    /// One full rest day (the league norm)
    pub one_day: f64,
    /// Two rest days
    pub two_days: f64,
    /// Three or more rest days
    pub three_plus_days: f64,
}

impl Default for RestDayConfig {
    fn default() -> Self {
        RestDayConfig {
            back_to_back: -50.0,
            one_day: 0.0,
            two_days: 25.0,
            three_plus_days: 15.0,
        }
    }
}

impl RestDayConfig {
    /// Rating adjustment for a given number of rest days
    ///
    /// Gaps of 10+ days are schedule breaks, not fatigue-relevant: no
    /// adjustment.
    pub fn adjustment(&self, rest_days: u32) -> f64 {
        if rest_days >= 10 {
            return 0.0;
        }

        match rest_days {
            0 => self.back_to_back,
            1 => self.one_day,
            2 => self.two_days,
            _ => self.three_plus_days,
        }
    }
}

/// Elo update strategy
///
/// Dispatch by value over a closed enum; each variant is independently
/// testable and trivially copyable into a forked model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EloVariant {
    /// Symmetric zero-sum update with a constant K
    Standard { k: f64 },
    /// Home rating offset by a fixed bonus before the expected score
    HomeAdvantage { k: f64, home_advantage: f64 },
    /// Home advantage plus a margin-of-victory multiplier on the K-step
    HomeAdvantageMargin { k: f64, home_advantage: f64 },
    /// The canonical variant: home advantage, rest-day adjustments on both
    /// effective ratings, and the margin multiplier
    MarginRestDays {
        k: f64,
        home_advantage: f64,
        rest: RestDayConfig,
    },
}

impl EloVariant {
    /// Expected score for a rating against an opponent rating
    pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf((rating_b - rating_a) / 400.0))
    }

    /// Margin-of-victory multiplier
    ///
    /// Dampens blowouts the favorite was already expected to win and
    /// amplifies surprising results.
    fn margin_multiplier(margin: i32, expected: f64) -> f64 {
        ((margin.abs() as f64) + 1.0).ln() * (2.2 / ((expected - 0.5) * 2.2 + 2.2))
    }

    /// Compute updated (home, away) ratings from pre-game state
    pub fn calculate(&self, home: &TeamStatistics, away: &TeamStatistics, game: &Game) -> (f64, f64) {
        let score = if game.home_points > game.away_points {
            1.0
        } else {
            0.0
        };

        match *self {
            EloVariant::Standard { k } => {
                let expected_home = Self::expected_score(home.elo_rating, away.elo_rating);
                let expected_away = 1.0 - expected_home;

                (
                    home.elo_rating + k * (score - expected_home),
                    away.elo_rating + k * ((1.0 - score) - expected_away),
                )
            }
            EloVariant::HomeAdvantage { k, home_advantage } => {
                let adjusted_home = home.elo_rating + home_advantage;
                let expected_home = Self::expected_score(adjusted_home, away.elo_rating);
                let expected_away = 1.0 - expected_home;

                (
                    home.elo_rating + k * (score - expected_home),
                    away.elo_rating + k * ((1.0 - score) - expected_away),
                )
            }
            EloVariant::HomeAdvantageMargin { k, home_advantage } => {
                let adjusted_home = home.elo_rating + home_advantage;
                let expected_home = Self::expected_score(adjusted_home, away.elo_rating);

                let multiplier = Self::margin_multiplier(game.margin(), expected_home);

                (
                    home.elo_rating + k * multiplier * (score - expected_home),
                    away.elo_rating + k * multiplier * ((1.0 - score) - (1.0 - expected_home)),
                )
            }
            EloVariant::MarginRestDays {
                k,
                home_advantage,
                rest,
            } => {
                let home_rest = home.rest_days_for(game.date);
                let away_rest = away.rest_days_for(game.date);

                let adjusted_home = home.elo_rating + home_advantage + rest.adjustment(home_rest);
                let adjusted_away = away.elo_rating + rest.adjustment(away_rest);

                let expected_home = Self::expected_score(adjusted_home, adjusted_away);

                let multiplier = Self::margin_multiplier(game.margin(), expected_home);

                (
                    home.elo_rating + k * multiplier * (score - expected_home),
                    away.elo_rating + k * multiplier * ((1.0 - score) - (1.0 - expected_home)),
                )
            }
        }
    }

    /// Pre-game home win probability under this strategy
    pub fn predict_win_probability(
        &self,
        home: &TeamStatistics,
        away: &TeamStatistics,
        game: &Game,
    ) -> f64 {
        match *self {
            EloVariant::Standard { .. } => Self::expected_score(home.elo_rating, away.elo_rating),
            EloVariant::HomeAdvantage { home_advantage, .. }
            | EloVariant::HomeAdvantageMargin { home_advantage, .. } => {
                Self::expected_score(home.elo_rating + home_advantage, away.elo_rating)
            }
            EloVariant::MarginRestDays {
                home_advantage,
                rest,
                ..
            } => {
                let home_rest = home.rest_days_for(game.date);
                let away_rest = away.rest_days_for(game.date);

                let adjusted_home = home.elo_rating + home_advantage + rest.adjustment(home_rest);
                let adjusted_away = away.elo_rating + rest.adjustment(away_rest);

                Self::expected_score(adjusted_home, adjusted_away)
            }
        }
    }
}
