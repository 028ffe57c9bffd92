//! First-order exponential smoother, the primitive under the One-Euro filter.

/// Exponential smoothing filter: `y = alpha * x + (1 - alpha) * y_prev`
///
/// The smoothing factor is supplied per call because the One-Euro filter
/// recomputes it from the elapsed time on every sample.
#[derive(Debug, Default)]
pub struct LowPassFilter {
    last_value: Option<f64>,
}

impl LowPassFilter {
    /// Create a filter with no history
    #[must_use]
    pub fn new() -> Self {
        Self { last_value: None }
    }

    /// Apply the filter to one sample.
    ///
    /// The very first sample passes through unchanged so the filter starts
    /// with no smoothing lag. `alpha` must be in `(0, 1]`; out-of-range
    /// values are a caller error and are not validated here.
    pub fn filter(&mut self, x: f64, alpha: f64) -> f64 {
        let value = match self.last_value {
            Some(last) => alpha * x + (1.0 - alpha) * last,
            None => x,
        };
        self.last_value = Some(value);
        value
    }

    /// Most recent output, if any sample has been seen since the last reset
    #[must_use]
    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }

    /// Clear history; the next call behaves as the first call again
    pub fn reset(&mut self) {
        self.last_value = None;
    }
}
