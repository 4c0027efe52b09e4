//! Feature extraction
//!
//! Converts pre-game team state into flat, classifier-ready records.

pub mod snapshot;

pub use snapshot::{GameFeatures, TrainingDataSet};
