//! Per-team state and the historical orchestrator
//!
//! One `TeamStatistics` per team, owned and evolved by `HistoricalModel`
//! strictly in game order.

pub mod historical;
pub mod team_state;
pub mod window;

pub use historical::HistoricalModel;
pub use team_state::{FourFactorAverages, TeamStatistics};
pub use window::RollingWindow;
