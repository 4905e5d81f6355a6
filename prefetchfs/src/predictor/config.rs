//! Predictor tuning parameters.

/// Tuning for the access-pattern predictor.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Discount old transitions over time instead of counting forever.
    pub adaptive: bool,
    /// Maximum number of prefetch candidates per prediction.
    pub top_k: usize,
    /// Multiplier applied to a path's outgoing weights before each new
    /// observation. Consulted only in adaptive mode.
    pub decay: f64,
    /// Minimum relative probability for a candidate to be emitted.
    /// Consulted only in adaptive mode.
    pub min_confidence: f64,
    /// Number of recent accesses retained for diagnostics.
    pub history_limit: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            adaptive: false,
            top_k: 4,
            decay: 0.9,
            min_confidence: 0.05,
            history_limit: 32,
        }
    }
}

impl PredictorConfig {
    /// Fixed-weight configuration: transition counts only grow.
    pub fn fixed() -> Self {
        Self::default()
    }

    /// Adaptive configuration with the given decay and confidence floor.
    ///
    /// `decay` is clamped to (0, 1] and `min_confidence` to [0, 1].
    pub fn adaptive(decay: f64, min_confidence: f64) -> Self {
        Self {
            adaptive: true,
            decay: decay.clamp(f64::MIN_POSITIVE, 1.0),
            min_confidence: min_confidence.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Set the maximum number of candidates per prediction.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}
