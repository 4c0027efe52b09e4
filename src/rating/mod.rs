//! Incremental rating systems
//!
//! Elo variants and Glicko-2, evolved one game at a time.

pub mod elo;
pub mod glicko;

pub use elo::{EloVariant, RestDayConfig};
pub use glicko::{Glicko2Calculator, GlickoRating, GlickoScore};
