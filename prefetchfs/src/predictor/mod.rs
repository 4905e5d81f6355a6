//! Access-pattern prediction for prefetching.
//!
//! Consumes the stream of client access events and emits ranked
//! candidates for the next file, which the manager feeds into the
//! hydration queue ahead of demand.

mod config;
mod markov;

pub use config::PredictorConfig;
pub use markov::MarkovPredictor;
