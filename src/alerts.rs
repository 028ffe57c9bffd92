//! Alert state machines: debounce, hysteresis, and cooldown logic.
//!
//! Each detector converts noisy per-frame measurements into a stable
//! boolean. The debounced ones require their condition to hold across
//! consecutive frames (drowsiness) or continuous wall-clock time
//! (distraction) before reporting, so single-frame noise and ordinary
//! blinks never flicker an alert.

use std::fmt;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::JoinHandle;

use crate::config::{DistractionConfig, DrowsinessConfig, HeadPoseConfig};
use crate::Result;

/// Alert categories reported by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Drowsiness,
    Yawn,
    HeadPose,
    Distraction,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Drowsiness => "DROWSINESS WARNING",
            Self::Yawn => "YAWN DETECTED",
            Self::HeadPose => "EYES ON THE ROAD",
            Self::Distraction => "DISTRACTION WARNING",
        };
        f.write_str(label)
    }
}

/// Shared per-alert timer state: one owner, mutated once per frame
#[derive(Debug, Clone, Default)]
pub struct AlertTimer {
    pub active: bool,
    pub start_timestamp: Option<f64>,
    pub last_trigger_timestamp: Option<f64>,
}

/// Frame-count debounce over the eye aspect ratio.
///
/// Counts consecutive frames with `ear` below the threshold; the alert is
/// true once the count reaches the configured minimum (about half a second
/// at 30 fps), which filters ordinary blinks. A single open-eye frame
/// resets the count.
#[derive(Debug)]
pub struct DrowsinessDetector {
    ear_threshold: f64,
    required_frames: u32,
    counter: u32,
}

impl DrowsinessDetector {
    #[must_use]
    pub fn new(config: &DrowsinessConfig) -> Self {
        Self {
            ear_threshold: config.ear_threshold,
            required_frames: config.consecutive_frames,
            counter: 0,
        }
    }

    /// Feed this frame's (smoothed) EAR; returns the debounced alert
    pub fn update(&mut self, ear: f64) -> bool {
        if ear < self.ear_threshold {
            self.counter += 1;
            self.counter >= self.required_frames
        } else {
            self.counter = 0;
            false
        }
    }

    /// Clear the consecutive-frame count (detection gap)
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// Threshold-only yawn detector; a single wide-mouth frame triggers it
#[derive(Debug)]
pub struct YawnDetector {
    mar_threshold: f64,
}

impl YawnDetector {
    #[must_use]
    pub fn new(config: &DrowsinessConfig) -> Self {
        Self {
            mar_threshold: config.mar_threshold,
        }
    }

    pub fn update(&self, mar: f64) -> bool {
        mar > self.mar_threshold
    }
}

/// Threshold-only head pose alert on the current frame's smoothed angles.
///
/// Roll is carried in the configuration but intentionally does not
/// contribute here.
#[derive(Debug)]
pub struct HeadPoseAlert {
    pitch_threshold: f64,
    yaw_threshold: f64,
}

impl HeadPoseAlert {
    #[must_use]
    pub fn new(config: &HeadPoseConfig) -> Self {
        Self {
            pitch_threshold: config.pitch_threshold,
            yaw_threshold: config.yaw_threshold,
        }
    }

    pub fn update(&self, pitch: f64, yaw: f64) -> bool {
        pitch.abs() > self.pitch_threshold || yaw.abs() > self.yaw_threshold
    }
}

/// Wall-clock debounce for the hand-near-face distraction alert.
///
/// The first near frame records a start timestamp; later near frames
/// report the elapsed duration and the alert fires once it reaches the
/// configured span. Any single far frame clears the timer immediately.
#[derive(Debug)]
pub struct DistractionTimer {
    required_seconds: f64,
    timer: AlertTimer,
}

impl DistractionTimer {
    #[must_use]
    pub fn new(config: &DistractionConfig) -> Self {
        Self {
            required_seconds: config.distraction_seconds,
            timer: AlertTimer::default(),
        }
    }

    /// Feed this frame's hand-near-face flag; returns `(alert, duration)`
    pub fn update(&mut self, hand_near_face: bool, now: f64) -> (bool, f64) {
        if !hand_near_face {
            self.timer.start_timestamp = None;
            self.timer.active = false;
            return (false, 0.0);
        }

        match self.timer.start_timestamp {
            None => {
                self.timer.start_timestamp = Some(now);
                (false, 0.0)
            }
            Some(start) => {
                let duration = now - start;
                self.timer.active = duration >= self.required_seconds;
                (self.timer.active, duration)
            }
        }
    }

    /// Clear the timer (detection gap)
    pub fn reset(&mut self) {
        self.timer = AlertTimer::default();
    }
}

/// Rate-limited escalation for a sustained drowsiness alert.
///
/// Tracks how long the drowsiness alert has been continuously true;
/// beyond the sustained threshold an audio trigger is requested, at most
/// once per cooldown interval, producing a repeating alarm while the
/// hazardous state persists.
#[derive(Debug)]
pub struct AudioEscalation {
    sustained_seconds: f64,
    cooldown_seconds: f64,
    timer: AlertTimer,
}

impl AudioEscalation {
    #[must_use]
    pub fn new(config: &DrowsinessConfig) -> Self {
        Self {
            sustained_seconds: config.sustained_alert_seconds,
            cooldown_seconds: config.audio_cooldown_seconds,
            timer: AlertTimer::default(),
        }
    }

    /// Feed this frame's drowsiness alert; returns whether an audio
    /// trigger should fire now
    pub fn update(&mut self, drowsiness_alert: bool, now: f64) -> bool {
        if !drowsiness_alert {
            self.timer.start_timestamp = None;
            self.timer.active = false;
            return false;
        }

        let start = *self.timer.start_timestamp.get_or_insert(now);
        self.timer.active = true;
        if now - start < self.sustained_seconds {
            return false;
        }

        let cooled_down = self
            .timer
            .last_trigger_timestamp
            .map_or(true, |last| now - last >= self.cooldown_seconds);
        if cooled_down {
            self.timer.last_trigger_timestamp = Some(now);
        }
        cooled_down
    }

    /// Clear the escalation timer; the cooldown clock is kept so a reset
    /// cannot be used to bypass rate limiting
    pub fn reset(&mut self) {
        self.timer.start_timestamp = None;
        self.timer.active = false;
    }
}

/// Bounded fire-and-forget dispatch for the audio side effect.
///
/// One worker thread drains a single-slot channel; `trigger` never blocks
/// and silently drops a request while one is already pending, so rapid
/// toggling of the escalation condition cannot accumulate concurrent
/// playback attempts.
pub struct BoundedAudioDispatcher {
    sender: Option<SyncSender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl BoundedAudioDispatcher {
    /// Spawn the worker thread around the playback callback
    pub fn new<F>(mut play: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel::<()>(1);
        let worker = std::thread::Builder::new()
            .name("audio-alarm".to_string())
            .spawn(move || {
                while receiver.recv().is_ok() {
                    play();
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Request one playback; drops the request if one is already pending
    pub fn trigger(&self) {
        if let Some(sender) = &self.sender {
            match sender.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Disconnected(())) => {
                    log::warn!("audio worker is gone; trigger dropped");
                }
            }
        }
    }
}

impl Drop for BoundedAudioDispatcher {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop; join for deterministic
        // teardown on every exit path.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
