//! One-Euro adaptive filter (Casiez et al., CHI 2012).

use std::f64::consts::PI;

use super::low_pass::LowPassFilter;
use crate::config::FilterConfig;
use crate::constants::{MAX_SAMPLE_GAP, MIN_SAMPLE_INTERVAL};

/// Adaptive low-pass filter: smooth at rest, responsive during motion.
///
/// The cutoff frequency rises with the estimated signal velocity, so noise
/// rejection costs lag only while the signal is actually moving fast. The
/// published formulation is reproduced exactly.
#[derive(Debug)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    derivative_cutoff: f64,

    signal: LowPassFilter,
    derivative: LowPassFilter,
    last_timestamp: Option<f64>,
}

/// Smoothing factor for a first-order filter at the given cutoff and
/// elapsed time: `alpha = 1 / (1 + tau / te)` with `tau = 1 / (2*pi*fc)`
fn smoothing_alpha(cutoff: f64, te: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / te)
}

impl OneEuroFilter {
    /// Create a filter.
    ///
    /// `min_cutoff` and `derivative_cutoff` are in Hz and must be positive;
    /// `beta` scales the cutoff with the smoothed derivative magnitude.
    #[must_use]
    pub fn new(min_cutoff: f64, beta: f64, derivative_cutoff: f64) -> Self {
        Self {
            min_cutoff,
            beta,
            derivative_cutoff,
            signal: LowPassFilter::new(),
            derivative: LowPassFilter::new(),
            last_timestamp: None,
        }
    }

    /// Create a filter from the shared filter configuration
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.min_cutoff, config.beta, config.derivative_cutoff)
    }

    /// Apply the filter to one timestamped sample (timestamp in seconds).
    ///
    /// The first sample returns unchanged and primes the internal state.
    /// Elapsed time is floored at one 30 fps frame, which also covers
    /// non-monotonic timestamps; a forward gap longer than
    /// [`MAX_SAMPLE_GAP`] restarts the filter so stale state is not
    /// smoothed into the new regime.
    pub fn filter(&mut self, x: f64, timestamp: f64) -> f64 {
        if let Some(last) = self.last_timestamp {
            if timestamp - last > MAX_SAMPLE_GAP {
                self.reset();
            }
        }

        let Some(last) = self.last_timestamp else {
            self.last_timestamp = Some(timestamp);
            self.derivative.filter(0.0, 1.0);
            return self.signal.filter(x, 1.0);
        };

        let te = (timestamp - last).max(MIN_SAMPLE_INTERVAL);
        self.last_timestamp = Some(timestamp);

        let previous = self.signal.last_value().unwrap_or(x);
        let dx = (x - previous) / te;
        let dx_smoothed = self.derivative.filter(dx, smoothing_alpha(self.derivative_cutoff, te));

        let cutoff = self.min_cutoff + self.beta * dx_smoothed.abs();
        self.signal.filter(x, smoothing_alpha(cutoff, te))
    }

    /// Clear all state; the next sample behaves as the first again
    pub fn reset(&mut self) {
        self.signal.reset();
        self.derivative.reset();
        self.last_timestamp = None;
    }
}

/// N independent One-Euro filters sharing a timestamp.
///
/// Used to smooth the `(pitch, yaw, roll)` pose vector jointly in time and
/// independently in value.
#[derive(Debug)]
pub struct MultiChannelFilter {
    channels: Vec<OneEuroFilter>,
}

impl MultiChannelFilter {
    /// Create `channels` filters with identical parameters
    #[must_use]
    pub fn new(channels: usize, min_cutoff: f64, beta: f64, derivative_cutoff: f64) -> Self {
        Self {
            channels: (0..channels)
                .map(|_| OneEuroFilter::new(min_cutoff, beta, derivative_cutoff))
                .collect(),
        }
    }

    /// Create a multi-channel filter from the shared filter configuration
    #[must_use]
    pub fn from_config(channels: usize, config: &FilterConfig) -> Self {
        Self::new(channels, config.min_cutoff, config.beta, config.derivative_cutoff)
    }

    /// Filter one sample per channel under a common timestamp.
    ///
    /// `values` must have one entry per channel.
    pub fn filter(&mut self, values: &[f64], timestamp: f64) -> Vec<f64> {
        debug_assert_eq!(values.len(), self.channels.len());
        self.channels
            .iter_mut()
            .zip(values)
            .map(|(channel, &value)| channel.filter(value, timestamp))
            .collect()
    }

    /// Reset every channel
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }
}
