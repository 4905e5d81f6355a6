//! First-order Markov model over file access sequences.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use tracing::trace;

use super::PredictorConfig;

/// Edges below this weight are pruned after decay in adaptive mode.
const PRUNE_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone)]
struct Edge {
    weight: f64,
    /// Observation counter value at the last update, for recency
    /// tie-breaks between equal weights.
    touched: u64,
}

/// Online predictor of the next file access.
///
/// Maintains a weighted directed graph over normalized paths: every
/// observed transition `a -> b` strengthens that edge, and the outgoing
/// weights of the last observed path rank the prefetch candidates. In
/// adaptive mode older transitions decay, so the model tracks workload
/// phases instead of accumulating history forever.
pub struct MarkovPredictor {
    config: PredictorConfig,
    transitions: HashMap<String, HashMap<String, Edge>>,
    last: Option<String>,
    history: VecDeque<String>,
    clock: u64,
}

impl MarkovPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            transitions: HashMap::new(),
            last: None,
            history: VecDeque::new(),
            clock: 0,
        }
    }

    /// Record an access to `path`, updating the transition from the
    /// previously observed path. Self-transitions are ignored.
    pub fn observe(&mut self, path: &str) {
        if let Some(prev) = self.last.as_deref() {
            if prev != path {
                self.clock += 1;
                let clock = self.clock;
                let decay = self.config.adaptive.then_some(self.config.decay);
                let outgoing = self.transitions.entry(prev.to_string()).or_default();

                if let Some(decay) = decay {
                    for edge in outgoing.values_mut() {
                        edge.weight *= decay;
                    }
                    outgoing.retain(|_, edge| edge.weight >= PRUNE_EPSILON);
                }

                let edge = outgoing.entry(path.to_string()).or_insert(Edge {
                    weight: 0.0,
                    touched: 0,
                });
                edge.weight += 1.0;
                edge.touched = clock;

                trace!(from = prev, to = path, weight = edge.weight, "transition observed");
            }
        }

        self.last = Some(path.to_string());
        self.history.push_back(path.to_string());
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }

    /// Rank the successors of the last observed path.
    ///
    /// Candidates are sorted by weight descending, ties broken by most
    /// recent update, truncated to `top_k`. Zero-weight edges are never
    /// emitted. In adaptive mode, candidates whose relative probability
    /// falls below the confidence floor are dropped. Returns an empty
    /// vector when there is no history for the current position.
    pub fn predict(&self) -> Vec<String> {
        let Some(last) = self.last.as_deref() else {
            return Vec::new();
        };
        let Some(outgoing) = self.transitions.get(last) else {
            return Vec::new();
        };

        let total: f64 = outgoing.values().map(|edge| edge.weight).sum();
        let mut ranked: Vec<(&String, &Edge)> = outgoing
            .iter()
            .filter(|(_, edge)| edge.weight > 0.0)
            .collect();

        if self.config.adaptive && total > 0.0 {
            let floor = self.config.min_confidence;
            ranked.retain(|(_, edge)| edge.weight / total >= floor);
        }

        ranked.sort_by(|a, b| {
            b.1.weight
                .partial_cmp(&a.1.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.touched.cmp(&a.1.touched))
        });

        ranked
            .into_iter()
            .take(self.config.top_k)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// The most recently observed path.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// The `n` most recent accesses, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Number of paths with at least one outgoing transition.
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }
}
