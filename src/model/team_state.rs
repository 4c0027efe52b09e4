//! Per-team rolling statistics
//!
//! All mutable team state lives here: Elo history and momentum, Glicko
//! score, streak, win counters, rest tracking, and the last-10 rolling
//! windows. Updates happen through `add_game` in one strictly ordered pass
//! so every step reads only state already finalized by earlier steps.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::window::RollingWindow;
use crate::rating::glicko::{GlickoRating, GlickoScore};
use crate::{FourFactors, Game, TeamId};

/// Elo history retains this many entries; enough for 10-game momentum with
/// room to spare
const ELO_HISTORY_LEN: usize = 20;
/// All last-10 statistics share this window
const ROLLING_WINDOW: usize = 10;
/// Gaps longer than this are schedule breaks, not rest
const MAX_REST_DAYS: i64 = 10;

/// One point of a team's Elo trajectory
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EloSnapshot {
    pub date: NaiveDate,
    pub rating: f64,
}

/// Rolling four-factor averages over the last 10 games
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FourFactorAverages {
    pub pace: f64,
    pub efg: f64,
    pub tov: f64,
    pub orb: f64,
    pub ftfga: f64,
    pub ortg: f64,
}

/// Rolling windows for each four-factor metric
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FourFactorWindows {
    pace: RollingWindow<f64>,
    efg: RollingWindow<f64>,
    tov: RollingWindow<f64>,
    orb: RollingWindow<f64>,
    ftfga: RollingWindow<f64>,
    ortg: RollingWindow<f64>,
}

impl FourFactorWindows {
    fn new() -> Self {
        FourFactorWindows {
            pace: RollingWindow::new(ROLLING_WINDOW),
            efg: RollingWindow::new(ROLLING_WINDOW),
            tov: RollingWindow::new(ROLLING_WINDOW),
            orb: RollingWindow::new(ROLLING_WINDOW),
            ftfga: RollingWindow::new(ROLLING_WINDOW),
            ortg: RollingWindow::new(ROLLING_WINDOW),
        }
    }

    fn push(&mut self, factors: &FourFactors) {
        self.pace.push(factors.pace);
        self.efg.push(factors.efg);
        self.tov.push(factors.tov);
        self.orb.push(factors.orb);
        self.ftfga.push(factors.ftfga);
        self.ortg.push(factors.ortg);
    }

    fn averages(&self) -> FourFactorAverages {
        FourFactorAverages {
            pace: self.pace.mean(),
            efg: self.efg.mean(),
            tov: self.tov.mean(),
            orb: self.orb.mean(),
            ftfga: self.ftfga.mean(),
            ortg: self.ortg.mean(),
        }
    }

    fn clear(&mut self) {
        self.pace.clear();
        self.efg.clear();
        self.tov.clear();
        self.orb.clear();
        self.ftfga.clear();
        self.ortg.clear();
    }
}

/// Full mutable state for one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team: TeamId,
    pub last_game_date: Option<NaiveDate>,

    pub elo_rating: f64,
    pub elo_momentum_5: f64,
    pub elo_momentum_10: f64,
    elo_history: RollingWindow<EloSnapshot>,

    pub glicko: GlickoScore,

    /// Signed streak: positive run of wins or negative run of losses;
    /// never 0 after the first game
    pub streak: i32,

    pub total_games: u32,
    pub total_wins: u32,
    pub total_win_pct: f64,

    pub home_games: u32,
    pub home_wins: u32,
    pub home_win_pct: f64,

    pub away_games: u32,
    pub away_wins: u32,
    pub away_win_pct: f64,

    last_ten_outcomes: RollingWindow<f64>,
    pub last_ten_win_pct: f64,

    last_ten_scored: RollingWindow<f64>,
    /// Average points scored over the last 10 games
    pub last_ten_offensive_rating: f64,

    last_ten_allowed: RollingWindow<f64>,
    /// Average points allowed over the last 10 games
    pub last_ten_defensive_rating: f64,

    four_factors: FourFactorWindows,

    /// Days of rest before the most recent game (0 when none, or when the
    /// gap exceeded 10 days)
    pub rest_days: u32,
}

impl TeamStatistics {
    pub fn new(team: TeamId) -> Self {
        let mut elo_history = RollingWindow::new(ELO_HISTORY_LEN);
        // Seed so the history is never empty and point-in-time queries
        // always find a baseline
        elo_history.push(EloSnapshot {
            date: NaiveDate::MIN,
            rating: 1500.0,
        });

        TeamStatistics {
            team,
            last_game_date: None,
            elo_rating: 1500.0,
            elo_momentum_5: 0.0,
            elo_momentum_10: 0.0,
            elo_history,
            glicko: GlickoScore::new(team),
            streak: 0,
            total_games: 0,
            total_wins: 0,
            total_win_pct: 0.0,
            home_games: 0,
            home_wins: 0,
            home_win_pct: 0.0,
            away_games: 0,
            away_wins: 0,
            away_win_pct: 0.0,
            last_ten_outcomes: RollingWindow::new(ROLLING_WINDOW),
            last_ten_win_pct: 0.0,
            last_ten_scored: RollingWindow::new(ROLLING_WINDOW),
            last_ten_offensive_rating: 0.0,
            last_ten_allowed: RollingWindow::new(ROLLING_WINDOW),
            last_ten_defensive_rating: 0.0,
            four_factors: FourFactorWindows::new(),
            rest_days: 0,
        }
    }

    /// Apply one game this team played, with the externally computed rating
    /// updates
    ///
    /// The step order matters: rest days read the previous game date, so
    /// they are computed before `last_game_date` moves forward.
    pub fn add_game(&mut self, game: &Game, elo_rating: f64, glicko: GlickoRating) {
        self.rest_days = self.rest_days_for(game.date);
        self.last_game_date = Some(game.date);

        self.update_streak(game);
        self.update_elo(game.date, elo_rating);
        self.update_glicko(game.date, glicko);
        self.update_win_counters(game);
        self.update_last_ten_outcomes(game);
        self.update_last_ten_scoring(game);

        if let Some(factors) = game.factors_for(self.team) {
            self.four_factors.push(factors);
        }
    }

    /// Days of rest a game on `date` would come after
    ///
    /// 0 when there is no prior game; gaps over 10 days collapse to 0 (a
    /// schedule break, not a long rest).
    pub fn rest_days_for(&self, date: NaiveDate) -> u32 {
        let Some(last_game_date) = self.last_game_date else {
            return 0;
        };

        let rest_days = (date - last_game_date).num_days().max(0);
        if rest_days > MAX_REST_DAYS {
            0
        } else {
            rest_days as u32
        }
    }

    /// True when the previous game was yesterday
    pub fn is_back_to_back(&self, date: NaiveDate) -> bool {
        self.last_game_date == Some(date - Duration::days(1))
    }

    /// Most recent Elo rating strictly before `date`
    pub fn rating_before(&self, date: NaiveDate) -> Option<f64> {
        self.elo_history
            .iter()
            .filter(|snapshot| snapshot.date < date)
            .last()
            .map(|snapshot| snapshot.rating)
    }

    /// Rolling four-factor averages over the last 10 games with box scores
    pub fn four_factor_averages(&self) -> FourFactorAverages {
        self.four_factors.averages()
    }

    /// Number of games currently in the last-10 outcome window
    pub fn last_ten_len(&self) -> usize {
        self.last_ten_outcomes.len()
    }

    /// Partially revert toward the league mean at a season boundary
    ///
    /// Elo and Glicko ratings keep `factor` of their distance from the mean;
    /// the Glicko deviation moves toward 350 by the same factor (roster
    /// turnover makes us less certain, never more). Streak, rest state,
    /// counters and every rolling window reset so nothing leaks across the
    /// boundary.
    pub fn regress(&mut self, mean: f64, factor: f64) {
        self.elo_rating = mean + factor * (self.elo_rating - mean);
        self.elo_momentum_5 = 0.0;
        self.elo_momentum_10 = 0.0;
        self.elo_history.clear();
        self.elo_history.push(EloSnapshot {
            date: NaiveDate::MIN,
            rating: self.elo_rating,
        });

        self.glicko.rating = mean + factor * (self.glicko.rating - mean);
        self.glicko.rating_deviation =
            (350.0 + factor * (self.glicko.rating_deviation - 350.0)).min(350.0);
        self.glicko.last_game_date = None;

        self.streak = 0;
        self.last_game_date = None;
        self.rest_days = 0;

        self.total_games = 0;
        self.total_wins = 0;
        self.total_win_pct = 0.0;
        self.home_games = 0;
        self.home_wins = 0;
        self.home_win_pct = 0.0;
        self.away_games = 0;
        self.away_wins = 0;
        self.away_win_pct = 0.0;

        self.last_ten_outcomes.clear();
        self.last_ten_win_pct = 0.0;
        self.last_ten_scored.clear();
        self.last_ten_offensive_rating = 0.0;
        self.last_ten_allowed.clear();
        self.last_ten_defensive_rating = 0.0;
        self.four_factors.clear();
    }

    fn update_streak(&mut self, game: &Game) {
        self.streak = if game.is_winner(self.team) {
            (self.streak + 1).max(1)
        } else {
            (self.streak - 1).min(-1)
        };
    }

    fn update_elo(&mut self, date: NaiveDate, elo_rating: f64) {
        self.elo_rating = elo_rating;
        self.elo_history.push(EloSnapshot {
            date,
            rating: elo_rating,
        });

        self.elo_momentum_5 = self
            .elo_history
            .nth_back(5)
            .map(|snapshot| elo_rating - snapshot.rating)
            .unwrap_or(0.0);
        self.elo_momentum_10 = self
            .elo_history
            .nth_back(10)
            .map(|snapshot| elo_rating - snapshot.rating)
            .unwrap_or(0.0);
    }

    fn update_glicko(&mut self, date: NaiveDate, glicko: GlickoRating) {
        self.glicko.rating = glicko.rating;
        self.glicko.rating_deviation = glicko.rating_deviation;
        self.glicko.volatility = glicko.volatility;
        self.glicko.last_game_date = Some(date);
    }

    fn update_win_counters(&mut self, game: &Game) {
        let won = game.is_winner(self.team);

        self.total_games += 1;
        if won {
            self.total_wins += 1;
        }

        if game.is_home(self.team) {
            self.home_games += 1;
            if won {
                self.home_wins += 1;
            }
        } else {
            self.away_games += 1;
            if won {
                self.away_wins += 1;
            }
        }

        self.total_win_pct = percentage(self.total_wins, self.total_games);
        self.home_win_pct = percentage(self.home_wins, self.home_games);
        self.away_win_pct = percentage(self.away_wins, self.away_games);
    }

    fn update_last_ten_outcomes(&mut self, game: &Game) {
        let outcome = if game.is_winner(self.team) { 1.0 } else { 0.0 };
        self.last_ten_outcomes.push(outcome);
        self.last_ten_win_pct = self.last_ten_outcomes.mean();
    }

    fn update_last_ten_scoring(&mut self, game: &Game) {
        self.last_ten_scored.push(game.points_for(self.team) as f64);
        self.last_ten_offensive_rating = self.last_ten_scored.mean();

        self.last_ten_allowed
            .push(game.points_against(self.team) as f64);
        self.last_ten_defensive_rating = self.last_ten_allowed.mean();
    }
}

/// Games-weighted percentage, 0 when no games
fn percentage(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn make_game(home: i64, away: i64, home_points: u32, away_points: u32, d: u32) -> Game {
        Game {
            id: d as i64,
            date: date(d),
            home_team: TeamId(home),
            away_team: TeamId(away),
            home_points,
            away_points,
            home_factors: None,
            away_factors: None,
        }
    }

    fn neutral_glicko(team: &TeamStatistics) -> GlickoRating {
        GlickoRating {
            rating: team.glicko.rating,
            rating_deviation: team.glicko.rating_deviation,
            volatility: team.glicko.volatility,
        }
    }

    fn add_result(team: &mut TeamStatistics, game: &Game) {
        let glicko = neutral_glicko(team);
        team.add_game(game, team.elo_rating, glicko);
    }

    #[test]
    fn test_rest_days_no_prior_game() {
        let team = TeamStatistics::new(TeamId(1));
        assert_eq!(team.rest_days_for(date(15)), 0);
    }

    #[test]
    fn test_rest_days_normal_gap() {
        let mut team = TeamStatistics::new(TeamId(1));
        team.last_game_date = Some(date(10));
        assert_eq!(team.rest_days_for(date(13)), 3);
    }

    #[test]
    fn test_rest_days_long_gap_collapses_to_zero() {
        let mut team = TeamStatistics::new(TeamId(1));
        team.last_game_date = Some(date(1));
        assert_eq!(team.rest_days_for(date(20)), 0);
    }

    #[test]
    fn test_back_to_back() {
        let mut team = TeamStatistics::new(TeamId(1));
        team.last_game_date = Some(date(14));
        assert!(team.is_back_to_back(date(15)));
        assert!(!team.is_back_to_back(date(16)));
    }

    #[test]
    fn test_streak_sign_follows_last_result() {
        let mut team = TeamStatistics::new(TeamId(1));

        // W W W -> +3
        for d in 1..=3 {
            add_result(&mut team, &make_game(1, 2, 100, 90, d));
        }
        assert_eq!(team.streak, 3);

        // L -> -1, L -> -2
        add_result(&mut team, &make_game(1, 2, 90, 100, 4));
        assert_eq!(team.streak, -1);
        add_result(&mut team, &make_game(1, 2, 90, 100, 5));
        assert_eq!(team.streak, -2);

        // W -> +1
        add_result(&mut team, &make_game(1, 2, 100, 90, 6));
        assert_eq!(team.streak, 1);
        assert!(team.streak.abs() >= 1);
    }

    #[test]
    fn test_momentum_requires_history() {
        let mut team = TeamStatistics::new(TeamId(1));
        for d in 1..=3 {
            let game = make_game(1, 2, 100, 90, d);
            let glicko = neutral_glicko(&team);
            team.add_game(&game, team.elo_rating + 10.0, glicko);
        }
        // Only 4 history entries (seed + 3): no 5-back value yet
        assert_eq!(team.elo_momentum_5, 0.0);
        assert_eq!(team.elo_momentum_10, 0.0);
    }

    #[test]
    fn test_momentum_computed_from_entries_back() {
        let mut team = TeamStatistics::new(TeamId(1));
        for d in 1..=12 {
            let game = make_game(1, 2, 100, 90, d);
            let glicko = neutral_glicko(&team);
            team.add_game(&game, team.elo_rating + 10.0, glicko);
        }
        // Ratings climb 10 per game: 5 back = 50 points, 10 back = 100
        assert!((team.elo_momentum_5 - 50.0).abs() < 1e-9);
        assert!((team.elo_momentum_10 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_home_away_counters_split() {
        let mut team = TeamStatistics::new(TeamId(1));

        // Home win, home loss, away win
        add_result(&mut team, &make_game(1, 2, 100, 90, 1));
        add_result(&mut team, &make_game(1, 2, 90, 100, 3));
        add_result(&mut team, &make_game(2, 1, 90, 100, 5));

        assert_eq!(team.total_games, 3);
        assert_eq!(team.total_wins, 2);
        assert_eq!(team.home_games, 2);
        assert_eq!(team.home_wins, 1);
        assert_eq!(team.away_games, 1);
        assert_eq!(team.away_wins, 1);
        assert!((team.total_win_pct - 2.0 / 3.0).abs() < 1e-12);
        assert!((team.home_win_pct - 0.5).abs() < 1e-12);
        assert!((team.away_win_pct - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_last_ten_windows_capped() {
        let mut team = TeamStatistics::new(TeamId(1));
        for d in 1..=25 {
            add_result(&mut team, &make_game(1, 2, 100, 90, d));
        }
        assert_eq!(team.last_ten_len(), 10);
        assert_eq!(team.last_ten_win_pct, 1.0);
        assert!((team.last_ten_offensive_rating - 100.0).abs() < 1e-9);
        assert!((team.last_ten_defensive_rating - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_last_ten_win_pct_over_window_only() {
        let mut team = TeamStatistics::new(TeamId(1));
        // 10 losses, then 10 wins: window forgets the losses
        for d in 1..=10 {
            add_result(&mut team, &make_game(1, 2, 90, 100, d));
        }
        for d in 11..=20 {
            add_result(&mut team, &make_game(1, 2, 100, 90, d));
        }
        assert_eq!(team.last_ten_win_pct, 1.0);
        assert!((team.total_win_pct - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_four_factors_only_when_present() {
        let factors = FourFactors {
            pace: 98.0,
            efg: 0.54,
            tov: 12.0,
            orb: 24.0,
            ftfga: 0.2,
            ortg: 112.0,
        };

        let mut team = TeamStatistics::new(TeamId(1));
        add_result(&mut team, &make_game(1, 2, 100, 90, 1));
        assert_eq!(team.four_factor_averages(), FourFactorAverages::default());

        let mut with_factors = make_game(1, 2, 100, 90, 3);
        with_factors.home_factors = Some(factors);
        add_result(&mut team, &with_factors);

        let averages = team.four_factor_averages();
        assert!((averages.pace - 98.0).abs() < 1e-12);
        assert!((averages.ortg - 112.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_game_reads_rest_before_moving_date() {
        let mut team = TeamStatistics::new(TeamId(1));
        add_result(&mut team, &make_game(1, 2, 100, 90, 1));
        add_result(&mut team, &make_game(1, 2, 100, 90, 4));

        // Rest days reflect the gap before the latest game, not zero
        assert_eq!(team.rest_days, 3);
        assert_eq!(team.last_game_date, Some(date(4)));
    }

    #[test]
    fn test_regress_resets_state_and_keeps_fractional_rating() {
        let mut team = TeamStatistics::new(TeamId(1));
        for d in 1..=12 {
            let game = make_game(1, 2, 100, 90, d);
            let glicko = GlickoRating {
                rating: 1600.0,
                rating_deviation: 60.0,
                volatility: 0.06,
            };
            team.add_game(&game, team.elo_rating + 10.0, glicko);
        }

        let pre_elo = team.elo_rating;
        team.regress(1500.0, 0.75);

        assert!((team.elo_rating - (1500.0 + 0.75 * (pre_elo - 1500.0))).abs() < 1e-9);
        assert!((team.glicko.rating - 1575.0).abs() < 1e-9);
        // Deviation grows toward 350, never past it
        assert!(team.glicko.rating_deviation > 60.0);
        assert!(team.glicko.rating_deviation <= 350.0);

        assert_eq!(team.streak, 0);
        assert_eq!(team.total_games, 0);
        assert_eq!(team.last_game_date, None);
        assert_eq!(team.rest_days, 0);
        assert_eq!(team.last_ten_len(), 0);
        assert_eq!(team.elo_momentum_5, 0.0);
        assert_eq!(team.rating_before(date(1)), Some(team.elo_rating));
    }

    #[test]
    fn test_regress_factor_extremes() {
        let mut team = TeamStatistics::new(TeamId(1));
        team.elo_rating = 1620.0;

        let mut unchanged = team.clone();
        unchanged.regress(1500.0, 1.0);
        assert!((unchanged.elo_rating - 1620.0).abs() < 1e-12);

        let mut collapsed = team.clone();
        collapsed.regress(1500.0, 0.0);
        assert!((collapsed.elo_rating - 1500.0).abs() < 1e-12);
    }

    #[test]
    fn test_rating_before_point_in_time() {
        let mut team = TeamStatistics::new(TeamId(1));
        let glicko = neutral_glicko(&team);
        team.add_game(&make_game(1, 2, 100, 90, 5), 1510.0, glicko);
        team.add_game(&make_game(1, 2, 100, 90, 8), 1520.0, glicko);

        assert_eq!(team.rating_before(date(5)), Some(1500.0));
        assert_eq!(team.rating_before(date(8)), Some(1510.0));
        assert_eq!(team.rating_before(date(9)), Some(1520.0));
    }
}
