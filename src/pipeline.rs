//! Per-frame analysis pipeline.
//!
//! Owns every filter, counter and timer in the system; one instance is
//! driven synchronously, one frame at a time, by the capture loop. None of
//! the state here is safe for concurrent access; the only asynchronous
//! element is the optional bounded audio dispatcher.

use std::collections::VecDeque;

use crate::alerts::{
    AlertType, AudioEscalation, BoundedAudioDispatcher, DistractionTimer, DrowsinessDetector, HeadPoseAlert,
    YawnDetector,
};
use crate::config::MonitorConfig;
use crate::constants::{
    FPS_WINDOW, LEFT_EYE_INDICES, OUTER_MOUTH_INDICES, POSE_CHANNELS, POSE_INDICES, RIGHT_EYE_INDICES,
};
use crate::filters::{MultiChannelFilter, OneEuroFilter};
use crate::geometry::{eye_aspect_ratio, mouth_aspect_ratio};
use crate::landmarks::{BoundingBox, FrameObservations};
use crate::pose_estimation::PoseEstimator;
use crate::Result;
use nalgebra::Vector3;

/// Aggregate result for one analyzed frame.
///
/// Created fresh each frame; a read-only snapshot with no identity beyond
/// the frame that produced it.
#[derive(Debug, Clone, Default)]
pub struct FrameResult {
    /// A face was detected this frame
    pub face_detected: bool,
    /// Number of hands detected this frame
    pub hands_detected: usize,

    /// Smoothed eye aspect ratio, averaged over both eyes
    pub ear: f64,
    /// Smoothed mouth aspect ratio
    pub mar: f64,
    /// Smoothed head pose angles (degrees)
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,

    /// Debounced eye-closure alert
    pub drowsiness_alert: bool,
    /// Wide-open-mouth alert for the current frame
    pub yawn_alert: bool,
    /// Looking-away alert for the current frame
    pub head_pose_alert: bool,
    /// Debounced hand-near-face alert
    pub distraction_alert: bool,

    /// Whether a hand center was inside the expanded face box this frame
    pub hand_near_face: bool,
    /// Elapsed continuous hand-near-face time (seconds)
    pub distraction_duration: f64,
    /// An audio escalation trigger fired this frame
    pub audio_requested: bool,

    /// Face bounding box, normalized coordinates
    pub face_bbox: Option<BoundingBox>,
    /// Per-hand bounding boxes, pixel coordinates
    pub hand_bboxes: Vec<BoundingBox>,

    /// Raw pose solver output for the optional 3D axis overlay
    pub rotation_vector: Option<Vector3<f64>>,
    pub translation_vector: Option<Vector3<f64>>,

    /// Moving-average frames per second
    pub fps: f64,
}

impl FrameResult {
    /// The alert categories active this frame, for display consumers
    #[must_use]
    pub fn active_alerts(&self) -> Vec<AlertType> {
        let mut alerts = Vec::new();
        if self.drowsiness_alert {
            alerts.push(AlertType::Drowsiness);
        }
        if self.yawn_alert {
            alerts.push(AlertType::Yawn);
        }
        if self.head_pose_alert {
            alerts.push(AlertType::HeadPose);
        }
        if self.distraction_alert {
            alerts.push(AlertType::Distraction);
        }
        alerts
    }
}

/// Moving-average FPS over a fixed window of inter-frame gaps
#[derive(Debug)]
pub struct FpsCounter {
    window: usize,
    history: VecDeque<f64>,
    last_timestamp: Option<f64>,
}

impl FpsCounter {
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window,
            history: VecDeque::with_capacity(window),
            last_timestamp: None,
        }
    }

    /// Record a frame timestamp (seconds) and return the current estimate
    pub fn update(&mut self, now: f64) -> f64 {
        if let Some(last) = self.last_timestamp {
            let gap = (now - last).max(1e-6);
            if self.history.len() >= self.window {
                self.history.pop_front();
            }
            self.history.push_back(1.0 / gap);
        }
        self.last_timestamp = Some(now);

        if self.history.is_empty() {
            0.0
        } else {
            self.history.iter().sum::<f64>() / self.history.len() as f64
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_timestamp = None;
    }
}

/// Frame analysis pipeline: metrics, smoothing, and alert state machines.
///
/// All mutable state lives here as fields; there are no process-wide
/// globals. Construct once with a validated configuration and feed frames
/// in capture order.
pub struct FrameAnalysisPipeline {
    config: MonitorConfig,
    pose_estimator: PoseEstimator,

    ear_filter: OneEuroFilter,
    mar_filter: OneEuroFilter,
    pose_filter: MultiChannelFilter,

    drowsiness: DrowsinessDetector,
    yawn: YawnDetector,
    head_pose: HeadPoseAlert,
    distraction: DistractionTimer,
    escalation: AudioEscalation,

    audio: Option<BoundedAudioDispatcher>,
    fps: FpsCounter,
}

impl FrameAnalysisPipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "monitoring pipeline ready (ear<{} for {} frames, mar>{}, pose {}/{} deg)",
            config.drowsiness.ear_threshold,
            config.drowsiness.consecutive_frames,
            config.drowsiness.mar_threshold,
            config.head_pose.pitch_threshold,
            config.head_pose.yaw_threshold,
        );

        Ok(Self {
            pose_estimator: PoseEstimator::new(),
            ear_filter: OneEuroFilter::from_config(&config.filter),
            mar_filter: OneEuroFilter::from_config(&config.filter),
            pose_filter: MultiChannelFilter::from_config(POSE_CHANNELS, &config.filter),
            drowsiness: DrowsinessDetector::new(&config.drowsiness),
            yawn: YawnDetector::new(&config.drowsiness),
            head_pose: HeadPoseAlert::new(&config.head_pose),
            distraction: DistractionTimer::new(&config.distraction),
            escalation: AudioEscalation::new(&config.drowsiness),
            audio: None,
            fps: FpsCounter::new(FPS_WINDOW),
            config,
        })
    }

    /// Attach a bounded audio dispatcher for escalation triggers.
    ///
    /// Without one the pipeline still reports `audio_requested` and the
    /// caller can dispatch however it likes.
    #[must_use]
    pub fn with_audio_dispatcher(mut self, dispatcher: BoundedAudioDispatcher) -> Self {
        self.audio = Some(dispatcher);
        self
    }

    /// The configuration this pipeline was built with
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Analyze one frame's observations and produce the aggregate result.
    ///
    /// Frames must arrive in capture order; timestamps are seconds from
    /// any consistent monotonic origin.
    pub fn analyze(&mut self, observations: &FrameObservations) -> FrameResult {
        let timestamp = observations.timestamp;
        let width = f64::from(observations.width);
        let height = f64::from(observations.height);

        let mut result = FrameResult {
            fps: self.fps.update(timestamp),
            ..FrameResult::default()
        };

        if let Some(face) = &observations.face {
            result.face_detected = true;
            result.face_bbox = face.bounding_box();

            let right_eye = face.pixel_points(&RIGHT_EYE_INDICES, width, height);
            let left_eye = face.pixel_points(&LEFT_EYE_INDICES, width, height);
            let raw_ear = (eye_aspect_ratio(&right_eye) + eye_aspect_ratio(&left_eye)) / 2.0;
            result.ear = self.ear_filter.filter(raw_ear, timestamp);
            result.drowsiness_alert = self.drowsiness.update(result.ear);

            let mouth = face.pixel_points(&OUTER_MOUTH_INDICES, width, height);
            result.mar = self.mar_filter.filter(mouth_aspect_ratio(&mouth), timestamp);
            result.yawn_alert = self.yawn.update(result.mar);

            let pose_points = face.pixel_points(&POSE_INDICES, width, height);
            let pose = self.pose_estimator.estimate(&pose_points, width, height);
            if pose.is_resolved() {
                let smoothed = self.pose_filter.filter(&[pose.pitch, pose.yaw, pose.roll], timestamp);
                result.pitch = smoothed[0];
                result.yaw = smoothed[1];
                result.roll = smoothed[2];
            }
            // On solver failure the zero pose is reported as-is and the
            // pose filter state is deliberately left untouched, so one bad
            // frame cannot bias the next estimate.
            result.rotation_vector = pose.rotation_vector;
            result.translation_vector = pose.translation_vector;
            result.head_pose_alert = self.head_pose.update(result.pitch, result.yaw);
        } else {
            // Detection gap: no alert survives it.
            self.drowsiness.reset();
        }

        result.hands_detected = observations.hands.len();
        let mut hand_near_face = false;
        for hand in &observations.hands {
            if let Some(bbox) = hand.bounding_box_px(width, height) {
                result.hand_bboxes.push(bbox);
            }
            if let (Some(face_bbox), Some(center)) = (result.face_bbox, hand.center()) {
                if face_bbox.contains(center.x, center.y, self.config.distraction.bbox_expansion_fraction) {
                    hand_near_face = true;
                }
            }
        }
        result.hand_near_face = hand_near_face;
        let (distraction_alert, duration) = self.distraction.update(hand_near_face, timestamp);
        result.distraction_alert = distraction_alert;
        result.distraction_duration = duration;

        result.audio_requested = self.escalation.update(result.drowsiness_alert, timestamp);
        if result.audio_requested {
            log::warn!(
                "{}: eyes closed beyond {:.1}s, requesting alarm",
                AlertType::Drowsiness,
                self.config.drowsiness.sustained_alert_seconds
            );
            if let Some(audio) = &self.audio {
                audio.trigger();
            }
        }

        result
    }

    /// Reset every filter, counter and timer to the just-constructed state
    pub fn reset(&mut self) {
        self.ear_filter.reset();
        self.mar_filter.reset();
        self.pose_filter.reset();
        self.drowsiness.reset();
        self.distraction.reset();
        self.escalation.reset();
        self.fps.reset();
    }
}
