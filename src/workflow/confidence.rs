//! Running mean of agent confidence scores.

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfidenceAccumulator {
    total: f64,
    count: usize,
}

impl ConfidenceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one merged result. Scores are clamped to [0, 1]; non-finite scores count as 0.
    pub fn add(&mut self, score: f64) {
        let score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.total += score;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean, or 0 when nothing was counted
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.total / self.count as f64).clamp(0.0, 1.0)
    }
}
