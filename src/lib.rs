//! Driver monitoring core: temporal signal processing and alert detection.
//!
//! This library turns a stream of per-frame facial and hand landmark
//! coordinates into stable, debounced attention/fatigue alerts:
//!
//! 1. Geometric ratio estimators compute eye and mouth aspect ratios from
//!    landmark point sets
//! 2. A perspective-n-point solver recovers head pose (pitch/yaw/roll)
//!    from six facial correspondences
//! 3. One-Euro adaptive filters smooth every measurement with minimal lag
//! 4. Debounce/hysteresis/cooldown state machines convert the smoothed
//!    values into flicker-free boolean alerts
//!
//! Camera capture, the landmark-detection model, rendering and audio
//! playback are external collaborators; the pipeline consumes
//! [`landmarks::FrameObservations`] and produces a [`pipeline::FrameResult`]
//! per frame.
//!
//! # Examples
//!
//! ```
//! use driver_monitoring::config::MonitorConfig;
//! use driver_monitoring::landmarks::FrameObservations;
//! use driver_monitoring::pipeline::FrameAnalysisPipeline;
//!
//! # fn main() -> driver_monitoring::Result<()> {
//! let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default())?;
//!
//! // One frame with nothing detected: everything degrades to defaults.
//! let result = pipeline.analyze(&FrameObservations::empty(640, 480, 0.0));
//! assert!(!result.face_detected);
//! assert!(result.active_alerts().is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! Feeding real landmarks per frame raises the alerts as their conditions
//! hold:
//!
//! ```no_run
//! use driver_monitoring::config::MonitorConfig;
//! use driver_monitoring::landmarks::{FaceObservation, FrameObservations, Landmark2D};
//! use driver_monitoring::pipeline::FrameAnalysisPipeline;
//!
//! # fn main() -> driver_monitoring::Result<()> {
//! # fn face_mesh_from_detector() -> Vec<Landmark2D> { Vec::new() }
//! let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default())?;
//!
//! let observations = FrameObservations {
//!     width: 640,
//!     height: 480,
//!     timestamp: 0.033,
//!     face: Some(FaceObservation { landmarks: face_mesh_from_detector() }),
//!     hands: Vec::new(),
//! };
//! let result = pipeline.analyze(&observations);
//! if result.drowsiness_alert {
//!     eprintln!("ear={:.3} for too many consecutive frames", result.ear);
//! }
//! # Ok(())
//! # }
//! ```

/// Alert state machines: debounce, hysteresis, cooldown, audio dispatch
pub mod alerts;

/// Monitoring configuration: every tunable in one structure
pub mod config;

/// Constants: landmark index sets, the 3D face model, solver limits
pub mod constants;

/// Error types and result handling
pub mod error;

/// Signal filters for smoothing per-frame measurements
pub mod filters;

/// Eye and mouth aspect ratio estimators
pub mod geometry;

/// Landmark provider boundary types
pub mod landmarks;

/// Head pose estimation via the PnP algorithm
pub mod pose_estimation;

/// Per-frame analysis pipeline
pub mod pipeline;

pub use error::{Error, Result};
