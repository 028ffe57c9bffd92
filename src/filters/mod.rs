//! Signal filtering for smoothing per-frame measurements.
//!
//! Noisy landmark-derived values (aspect ratios, pose angles) are smoothed
//! with the One-Euro filter, an adaptive low-pass filter whose cutoff rises
//! with estimated signal velocity. Smoothing is strong at rest and lag is
//! traded away only while the signal is actually moving fast.

/// Exponential smoothing primitive
pub mod low_pass;

/// Adaptive One-Euro filter and its multi-channel wrapper
pub mod one_euro;

pub use low_pass::LowPassFilter;
pub use one_euro::{MultiChannelFilter, OneEuroFilter};
