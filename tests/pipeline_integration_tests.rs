//! End-to-end pipeline tests over synthetic landmark streams

use driver_monitoring::config::MonitorConfig;
use driver_monitoring::constants::{FACE_MODEL_3D, HAND_LANDMARK_COUNT, POSE_INDICES};
use driver_monitoring::landmarks::{FaceObservation, FrameObservations, HandObservation, Landmark2D};
use driver_monitoring::pipeline::FrameAnalysisPipeline;
use driver_monitoring::pose_estimation::rodrigues;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;

const FRAME_PX: f64 = 1000.0;
const DT: f64 = 1.0 / 30.0;
const MESH_LEN: usize = 478;

/// Pixel projection of one model point under the given head rotation,
/// using the pipeline's intrinsics approximation
fn project(rotation: &Matrix3<f64>, model: [f64; 3]) -> (f64, f64) {
    let tvec = Vector3::new(0.0, 0.0, 3000.0);
    let camera = rotation * Vector3::new(model[0], model[1], model[2]) + tvec;
    (
        FRAME_PX * camera.x / camera.z + FRAME_PX / 2.0,
        FRAME_PX * camera.y / camera.z + FRAME_PX / 2.0,
    )
}

/// Build a full face mesh whose pose, eye, and mouth point sets are
/// mutually consistent under the given head rotation
fn synthetic_face(rotation: &Matrix3<f64>, eyes_closed: bool, mouth_open: bool) -> FaceObservation {
    let mut landmarks = vec![Landmark2D::new(0.5, 0.5); MESH_LEN];
    let mut set = |idx: usize, x_px: f64, y_px: f64| {
        landmarks[idx] = Landmark2D::new(x_px / FRAME_PX, y_px / FRAME_PX);
    };

    let mut projected = [(0.0, 0.0); 6];
    for (i, &idx) in POSE_INDICES.iter().enumerate() {
        projected[i] = project(rotation, FACE_MODEL_3D[i]);
        set(idx, projected[i].0, projected[i].1);
    }

    // Eye point sets hang off the projected outer corners (mesh 33 / 263);
    // the vertical gap controls the EAR.
    let gap = if eyes_closed { 2.5 } else { 15.0 };
    let (rx, ry) = projected[2];
    set(133, rx + 100.0, ry);
    set(160, rx + 30.0, ry - gap);
    set(144, rx + 30.0, ry + gap);
    set(158, rx + 70.0, ry - gap);
    set(153, rx + 70.0, ry + gap);

    let (lx, ly) = projected[3];
    set(362, lx - 100.0, ly);
    set(385, lx - 70.0, ly - gap);
    set(380, lx - 70.0, ly + gap);
    set(387, lx - 30.0, ly - gap);
    set(373, lx - 30.0, ly + gap);

    // Mouth points around the projected corners (mesh 61 / 291).
    let (mlx, mly) = projected[4];
    let (mrx, mry) = projected[5];
    let (mx, my) = ((mlx + mrx) / 2.0, (mly + mry) / 2.0);
    let lip = if mouth_open { 45.0 } else { 5.0 };
    set(39, mx - 20.0, my - lip);
    set(0, mx, my - lip);
    set(269, mx + 20.0, my - lip);
    set(405, mx + 20.0, my + lip);
    set(17, mx, my + lip);
    set(181, mx - 20.0, my + lip);

    FaceObservation { landmarks }
}

/// Frontal driver prior: canonical model y-up, image y-down
fn frontal() -> Matrix3<f64> {
    rodrigues(&Vector3::new(PI, 0.0, 0.0))
}

fn frame_at(i: u32, face: Option<FaceObservation>, hands: Vec<HandObservation>) -> FrameObservations {
    FrameObservations {
        width: FRAME_PX as u32,
        height: FRAME_PX as u32,
        timestamp: f64::from(i) * DT,
        face,
        hands,
    }
}

fn hand_at(x: f64, y: f64) -> HandObservation {
    HandObservation {
        landmarks: vec![Landmark2D::new(x, y); HAND_LANDMARK_COUNT],
    }
}

#[test]
fn test_attentive_frontal_face_raises_no_alerts() {
    let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default()).unwrap();

    let mut last = None;
    for i in 0..30 {
        let result = pipeline.analyze(&frame_at(i, Some(synthetic_face(&frontal(), false, false)), Vec::new()));
        last = Some(result);
    }
    let result = last.unwrap();

    assert!(result.face_detected);
    assert!(result.active_alerts().is_empty());
    assert!(result.ear > 0.2, "ear {}", result.ear);
    assert!(result.mar < 1.3, "mar {}", result.mar);
    assert!(result.pitch.abs() < 5.0 && result.yaw.abs() < 5.0);
    assert!(result.rotation_vector.is_some());
    assert!(result.face_bbox.is_some());
    assert!(result.fps > 25.0 && result.fps < 35.0, "fps {}", result.fps);
}

#[test]
fn test_closed_eyes_raise_drowsiness_after_debounce() {
    let config = MonitorConfig::default();
    let n = config.drowsiness.consecutive_frames;
    let mut pipeline = FrameAnalysisPipeline::new(config).unwrap();

    for i in 0..n {
        let result = pipeline.analyze(&frame_at(i, Some(synthetic_face(&frontal(), true, false)), Vec::new()));
        assert_eq!(result.drowsiness_alert, i == n - 1, "frame {i}");
        assert!(result.ear < 0.2);
    }
}

#[test]
fn test_detection_gap_resets_the_drowsiness_run() {
    let config = MonitorConfig::default();
    let n = config.drowsiness.consecutive_frames;
    let mut pipeline = FrameAnalysisPipeline::new(config).unwrap();

    for i in 0..(n - 1) {
        pipeline.analyze(&frame_at(i, Some(synthetic_face(&frontal(), true, false)), Vec::new()));
    }
    // One frame with no face detected.
    let gap = pipeline.analyze(&frame_at(n - 1, None, Vec::new()));
    assert!(!gap.drowsiness_alert);

    // The run must start over: n-1 more closed frames stay quiet.
    for i in n..(2 * n - 1) {
        let result = pipeline.analyze(&frame_at(i, Some(synthetic_face(&frontal(), true, false)), Vec::new()));
        assert!(!result.drowsiness_alert, "frame {i}");
    }
}

#[test]
fn test_open_mouth_raises_yawn_immediately() {
    let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default()).unwrap();

    let quiet = pipeline.analyze(&frame_at(0, Some(synthetic_face(&frontal(), false, false)), Vec::new()));
    assert!(!quiet.yawn_alert);

    let yawning = pipeline.analyze(&frame_at(1, Some(synthetic_face(&frontal(), false, true)), Vec::new()));
    assert!(yawning.yawn_alert, "mar {}", yawning.mar);
}

#[test]
fn test_turned_head_raises_pose_alert() {
    let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default()).unwrap();

    // 35 degrees of in-image rotation reads as yaw in the decomposition,
    // against the default 30 degree threshold.
    let turned = frontal() * rodrigues(&Vector3::new(0.0, 0.0, 35.0_f64.to_radians()));
    let result = pipeline.analyze(&frame_at(0, Some(synthetic_face(&turned, false, false)), Vec::new()));

    assert!(result.rotation_vector.is_some());
    assert!(result.yaw.abs() > 30.0, "yaw {}", result.yaw);
    assert!(result.head_pose_alert);
}

#[test]
fn test_degenerate_pose_points_leave_pose_at_zero() {
    let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default()).unwrap();

    let mut face = synthetic_face(&frontal(), false, false);
    for &idx in &POSE_INDICES {
        face.landmarks[idx] = Landmark2D::new(0.5, 0.5);
    }
    let result = pipeline.analyze(&frame_at(0, Some(face), Vec::new()));

    assert!(result.face_detected);
    assert!(result.rotation_vector.is_none());
    assert_eq!((result.pitch, result.yaw, result.roll), (0.0, 0.0, 0.0));
    assert!(!result.head_pose_alert);
}

#[test]
fn test_hand_on_face_raises_distraction_after_three_seconds() {
    let config = MonitorConfig::default();
    let span = config.distraction.distraction_seconds;
    let mut pipeline = FrameAnalysisPipeline::new(config).unwrap();

    let mut fired_at = None;
    let frames = (span / DT) as u32 + 10;
    for i in 0..frames {
        let face = synthetic_face(&frontal(), false, false);
        let result = pipeline.analyze(&frame_at(i, Some(face), vec![hand_at(0.5, 0.5)]));
        assert!(result.hand_near_face, "frame {i}");
        assert_eq!(result.hand_bboxes.len(), 1);
        if result.distraction_alert && fired_at.is_none() {
            fired_at = Some(result.distraction_duration);
        }
    }
    let duration = fired_at.expect("distraction alert never fired");
    assert!((duration - span).abs() < 2.0 * DT, "fired at {duration}");
}

#[test]
fn test_hand_far_from_face_never_distracts() {
    let mut pipeline = FrameAnalysisPipeline::new(MonitorConfig::default()).unwrap();

    for i in 0..120 {
        let face = synthetic_face(&frontal(), false, false);
        let result = pipeline.analyze(&frame_at(i, Some(face), vec![hand_at(0.02, 0.98)]));
        assert!(!result.hand_near_face);
        assert!(!result.distraction_alert);
    }
}

#[test]
fn test_distraction_interruption_restarts_the_span() {
    let config = MonitorConfig::default();
    let span = config.distraction.distraction_seconds;
    let mut pipeline = FrameAnalysisPipeline::new(config).unwrap();

    let near_span = (span / DT) as u32 - 2;
    for i in 0..near_span {
        let face = synthetic_face(&frontal(), false, false);
        let result = pipeline.analyze(&frame_at(i, Some(face), vec![hand_at(0.5, 0.5)]));
        assert!(!result.distraction_alert, "frame {i}");
    }
    // Hand leaves for a single frame just before the threshold.
    let face = synthetic_face(&frontal(), false, false);
    pipeline.analyze(&frame_at(near_span, Some(face), Vec::new()));

    for i in (near_span + 1)..(2 * near_span) {
        let face = synthetic_face(&frontal(), false, false);
        let result = pipeline.analyze(&frame_at(i, Some(face), vec![hand_at(0.5, 0.5)]));
        assert!(!result.distraction_alert, "frame {i}");
    }
}

#[test]
fn test_sustained_drowsiness_requests_audio_with_cooldown() {
    let config = MonitorConfig::default();
    let cooldown = config.drowsiness.audio_cooldown_seconds;
    let mut pipeline = FrameAnalysisPipeline::new(config).unwrap();

    // Eyes closed for 12 s straight.
    let mut triggers = Vec::new();
    for i in 0..360 {
        let face = synthetic_face(&frontal(), true, false);
        let result = pipeline.analyze(&frame_at(i, Some(face), Vec::new()));
        if result.audio_requested {
            triggers.push(f64::from(i) * DT);
        }
    }

    assert!(triggers.len() >= 2, "only {} triggers", triggers.len());
    for pair in triggers.windows(2) {
        assert!(pair[1] - pair[0] >= cooldown - 1e-9, "{pair:?}");
    }
}

#[test]
fn test_reset_restores_construction_state() {
    let config = MonitorConfig::default();
    let n = config.drowsiness.consecutive_frames;
    let mut pipeline = FrameAnalysisPipeline::new(config).unwrap();

    for i in 0..(n - 1) {
        pipeline.analyze(&frame_at(i, Some(synthetic_face(&frontal(), true, false)), Vec::new()));
    }
    pipeline.reset();

    // Post-reset the debounce run starts from zero.
    for i in 0..(n - 1) {
        let result = pipeline.analyze(&frame_at(100 + i, Some(synthetic_face(&frontal(), true, false)), Vec::new()));
        assert!(!result.drowsiness_alert, "frame {i}");
    }
}
