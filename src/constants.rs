//! Constants used throughout the monitoring core

/// Face-mesh indices for the right eye, in EAR point order
/// (outer corner, upper-1, upper-2, inner corner, lower-2, lower-1)
pub const RIGHT_EYE_INDICES: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Face-mesh indices for the left eye, in EAR point order
pub const LEFT_EYE_INDICES: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Face-mesh indices for the outer mouth contour, in MAR point order
/// (left corner, upper-outer-1, upper-outer-2, upper center, right corner,
/// lower center, lower-outer-2, lower-outer-1)
pub const OUTER_MOUTH_INDICES: [usize; 8] = [61, 39, 0, 269, 291, 405, 17, 181];

/// Face-mesh indices of the six pose correspondence points
/// (nose tip, chin, left eye outer, right eye outer, left mouth, right mouth)
pub const POSE_INDICES: [usize; 6] = [1, 152, 33, 263, 61, 291];

/// Hand landmark index of the wrist
pub const WRIST_INDEX: usize = 0;

/// Hand landmark index of the middle-finger base (MCP joint)
pub const MIDDLE_FINGER_MCP_INDEX: usize = 9;

/// Number of landmarks in one hand set
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Canonical 3D face model in millimeters (anthropometric, nose tip at
/// origin), in the same order as [`POSE_INDICES`]
pub const FACE_MODEL_3D: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],          // Nose tip
    [0.0, -330.0, -65.0],     // Chin
    [-225.0, 170.0, -135.0],  // Left eye outer corner
    [225.0, 170.0, -135.0],   // Right eye outer corner
    [-150.0, -150.0, -125.0], // Left mouth corner
    [150.0, -150.0, -125.0],  // Right mouth corner
];

/// Distance between the model's eye outer corners (mm), used to seed the
/// solver's depth estimate from the observed pixel span
pub const MODEL_EYE_SPAN: f64 = 450.0;

/// Number of pose correspondence points
pub const POSE_POINT_COUNT: usize = 6;

/// Pose channels smoothed jointly (pitch, yaw, roll)
pub const POSE_CHANNELS: usize = 3;

/// Elapsed-time floor between filter samples (seconds), one frame at 30 fps
pub const MIN_SAMPLE_INTERVAL: f64 = 1.0 / 30.0;

/// Forward timestamp gap (seconds) above which a One-Euro filter restarts
/// instead of smoothing across the pause
pub const MAX_SAMPLE_GAP: f64 = 1.0;

/// Window size for the moving-average FPS estimate (frames)
pub const FPS_WINDOW: usize = 30;

/// Threshold on `sy` below which the Euler decomposition takes the
/// gimbal-lock branch
pub const GIMBAL_LOCK_EPSILON: f64 = 1e-6;

/// Maximum Levenberg-Marquardt iterations for the PnP solver
pub const PNP_MAX_ITERATIONS: usize = 100;

/// Parameter-step norm below which the PnP solver is considered converged
pub const PNP_STEP_EPSILON: f64 = 1e-10;

/// Mean reprojection error (pixels) above which a PnP solution is rejected
pub const PNP_MAX_REPROJECTION_ERROR: f64 = 30.0;

/// Plausible camera-space depth range for a driver's head (mm)
pub const PNP_DEPTH_RANGE: (f64, f64) = (100.0, 10_000.0);
