//! Configuration management for the driver monitoring core

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Monitoring configuration
///
/// Constructed once and passed to every component that needs thresholds.
/// All tunables are enumerated here; nothing re-creates config objects at
/// runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Drowsiness and yawn detection thresholds
    pub drowsiness: DrowsinessConfig,

    /// Head pose alert thresholds
    pub head_pose: HeadPoseConfig,

    /// Hand-near-face distraction detection
    pub distraction: DistractionConfig,

    /// One-Euro filter parameters
    pub filter: FilterConfig,
}

/// Drowsiness detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrowsinessConfig {
    /// EAR below this value counts as a closed-eye frame
    pub ear_threshold: f64,

    /// Consecutive closed-eye frames required before the alert fires
    /// (15 frames is roughly 0.5 s at 30 fps, enough to skip ordinary blinks)
    pub consecutive_frames: u32,

    /// MAR above this value reports a yawn
    pub mar_threshold: f64,

    /// Continuous drowsiness duration (seconds) before the audio alarm
    /// escalation is requested
    pub sustained_alert_seconds: f64,

    /// Minimum interval (seconds) between repeated audio triggers
    pub audio_cooldown_seconds: f64,
}

/// Head pose alert thresholds (degrees)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadPoseConfig {
    /// Absolute pitch above this reports looking away
    pub pitch_threshold: f64,

    /// Absolute yaw above this reports looking away
    pub yaw_threshold: f64,

    /// Roll is tracked and validated but does not currently contribute to
    /// the alert
    pub roll_threshold: f64,
}

/// Distraction detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistractionConfig {
    /// Continuous hand-near-face duration (seconds) before the alert fires
    pub distraction_seconds: f64,

    /// Fraction by which the face bounding box is expanded on each side
    /// for the hand-near-face test
    pub bbox_expansion_fraction: f64,
}

/// One-Euro filter parameters (Casiez et al., CHI 2012)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum cutoff frequency (Hz); lower is smoother at rest
    pub min_cutoff: f64,

    /// Velocity sensitivity; higher tracks fast motion with less lag
    pub beta: f64,

    /// Cutoff frequency (Hz) applied to the estimated derivative
    pub derivative_cutoff: f64,
}

impl Default for DrowsinessConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.2,
            consecutive_frames: 15,
            mar_threshold: 1.3,
            sustained_alert_seconds: 5.0,
            audio_cooldown_seconds: 2.0,
        }
    }
}

impl Default for HeadPoseConfig {
    fn default() -> Self {
        Self {
            pitch_threshold: 20.0,
            yaw_threshold: 30.0,
            roll_threshold: 25.0,
        }
    }
}

impl Default for DistractionConfig {
    fn default() -> Self {
        Self {
            distraction_seconds: 3.0,
            bbox_expansion_fraction: 0.2,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.007,
            derivative_cutoff: 1.0,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.drowsiness.ear_threshold <= 0.0 {
            return Err(Error::ConfigError("EAR threshold must be positive".to_string()));
        }
        if self.drowsiness.consecutive_frames == 0 {
            return Err(Error::ConfigError(
                "Consecutive frame count must be greater than 0".to_string(),
            ));
        }
        if self.drowsiness.mar_threshold <= 0.0 {
            return Err(Error::ConfigError("MAR threshold must be positive".to_string()));
        }
        if self.drowsiness.sustained_alert_seconds < 0.0 {
            return Err(Error::ConfigError(
                "Sustained alert duration must be non-negative".to_string(),
            ));
        }
        if self.drowsiness.audio_cooldown_seconds < 0.0 {
            return Err(Error::ConfigError(
                "Audio cooldown must be non-negative".to_string(),
            ));
        }

        if self.head_pose.pitch_threshold <= 0.0
            || self.head_pose.yaw_threshold <= 0.0
            || self.head_pose.roll_threshold <= 0.0
        {
            return Err(Error::ConfigError(
                "Head pose thresholds must be positive".to_string(),
            ));
        }

        if self.distraction.distraction_seconds <= 0.0 {
            return Err(Error::ConfigError(
                "Distraction duration must be positive".to_string(),
            ));
        }
        if self.distraction.bbox_expansion_fraction < 0.0 {
            return Err(Error::ConfigError(
                "Bounding box expansion must be non-negative".to_string(),
            ));
        }

        if self.filter.min_cutoff <= 0.0 {
            return Err(Error::ConfigError(
                "Filter minimum cutoff must be positive".to_string(),
            ));
        }
        if self.filter.beta < 0.0 {
            return Err(Error::ConfigError("Filter beta must be non-negative".to_string()));
        }
        if self.filter.derivative_cutoff <= 0.0 {
            return Err(Error::ConfigError(
                "Filter derivative cutoff must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Driver Monitoring Configuration

# Drowsiness and yawn detection
drowsiness:
  ear_threshold: 0.2
  consecutive_frames: 15
  mar_threshold: 1.3
  sustained_alert_seconds: 5.0
  audio_cooldown_seconds: 2.0

# Head pose alert thresholds (degrees)
head_pose:
  pitch_threshold: 20.0
  yaw_threshold: 30.0
  roll_threshold: 25.0

# Hand-near-face distraction
distraction:
  distraction_seconds: 3.0
  bbox_expansion_fraction: 0.2

# One-Euro filter parameters
filter:
  min_cutoff: 1.0
  beta: 0.007
  derivative_cutoff: 1.0
"#;
