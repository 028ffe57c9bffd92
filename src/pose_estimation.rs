//! Head pose estimation from six facial landmark correspondences.
//!
//! Solves the perspective-n-point problem between a canonical 3D face
//! model and its per-frame 2D pixel projections, then decomposes the
//! recovered rotation into pitch/yaw/roll. Camera intrinsics are
//! approximated per frame: focal length = frame width, principal point =
//! frame center, zero lens distortion. Accuracy requirements are loose;
//! the output only has to track human-perceptible pose changes.

use nalgebra::{Matrix3, Point2, Point3, SMatrix, SVector, Vector3};
use std::f64::consts::PI;

use crate::constants::{
    FACE_MODEL_3D, GIMBAL_LOCK_EPSILON, MODEL_EYE_SPAN, PNP_DEPTH_RANGE, PNP_MAX_ITERATIONS,
    PNP_MAX_REPROJECTION_ERROR, PNP_STEP_EPSILON, POSE_POINT_COUNT,
};

/// Index of the nose tip within the pose correspondence set
const NOSE_INDEX: usize = 0;
/// Indices of the eye outer corners within the pose correspondence set
const EYE_CORNER_INDICES: (usize, usize) = (2, 3);
/// Two reprojection residuals (u, v) per correspondence point
const RESIDUAL_DIM: usize = 2 * POSE_POINT_COUNT;

type Residuals = SVector<f64, RESIDUAL_DIM>;
type Params = SVector<f64, 6>;
type Jacobian = SMatrix<f64, RESIDUAL_DIM, 6>;

/// One frame's head pose: Euler angles in degrees plus the raw solver
/// output for the optional 3D axis overlay.
///
/// A solver failure is reported as the zero pose with `None` vectors; it
/// is not an error.
#[derive(Debug, Clone, Default)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub rotation_vector: Option<Vector3<f64>>,
    pub translation_vector: Option<Vector3<f64>>,
}

impl HeadPose {
    /// The reported pose for frames where the solver failed
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether the solver produced this pose (as opposed to a failure
    /// placeholder)
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.rotation_vector.is_some()
    }
}

/// Rodrigues formula: axis-angle rotation vector to rotation matrix
#[must_use]
pub fn rodrigues(rvec: &Vector3<f64>) -> Matrix3<f64> {
    let theta = rvec.norm();
    if theta < 1e-12 {
        return Matrix3::identity();
    }
    let k = rvec / theta;
    let skew = Matrix3::new(0.0, -k.z, k.y, k.z, 0.0, -k.x, -k.y, k.x, 0.0);
    Matrix3::identity() + skew * theta.sin() + skew * skew * (1.0 - theta.cos())
}

/// Head pose estimator over the canonical six-point face model
pub struct PoseEstimator {
    model_points: [Point3<f64>; POSE_POINT_COUNT],
}

impl Default for PoseEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseEstimator {
    /// Create an estimator using the canonical anthropometric face model
    #[must_use]
    pub fn new() -> Self {
        let model_points =
            FACE_MODEL_3D.map(|[x, y, z]| Point3::new(x, y, z));
        Self { model_points }
    }

    /// Estimate the head pose from the six pose landmarks in pixel
    /// coordinates, ordered as [`crate::constants::POSE_INDICES`].
    ///
    /// Returns the zero pose on degenerate input or solver failure;
    /// callers must not treat that as an error.
    #[must_use]
    pub fn estimate(&self, image_points: &[Point2<f64>], frame_width: f64, frame_height: f64) -> HeadPose {
        if image_points.len() != POSE_POINT_COUNT
            || frame_width <= 0.0
            || frame_height <= 0.0
            || image_points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            log::debug!("pose estimation skipped: degenerate input");
            return HeadPose::zero();
        }

        let focal = frame_width;
        let cx = frame_width / 2.0;
        let cy = frame_height / 2.0;

        // Seed translation depth from the observed eye-corner span against
        // the model's 450 mm span; a collapsed span cannot be solved.
        let eye_span = (image_points[EYE_CORNER_INDICES.0] - image_points[EYE_CORNER_INDICES.1]).norm();
        if eye_span < 1e-6 {
            log::debug!("pose estimation skipped: collapsed eye span");
            return HeadPose::zero();
        }
        let z0 = focal * MODEL_EYE_SPAN / eye_span;
        let tx0 = (image_points[NOSE_INDEX].x - cx) * z0 / focal;
        let ty0 = (image_points[NOSE_INDEX].y - cy) * z0 / focal;

        // Camera-facing prior: the model is y-up while image coordinates
        // are y-down, so a frontal face sits near a half turn about X.
        let init = Params::from([PI, 0.0, 0.0, tx0, ty0, z0]);

        match self.solve(init, image_points, focal, cx, cy) {
            Some((rvec, tvec)) => {
                let rotation = rodrigues(&rvec);
                let (pitch, yaw, roll) = Self::rotation_matrix_to_euler(&rotation);
                HeadPose {
                    pitch,
                    yaw,
                    roll,
                    rotation_vector: Some(rvec),
                    translation_vector: Some(tvec),
                }
            }
            None => {
                log::warn!("PnP solver failed; reporting zero pose for this frame");
                HeadPose::zero()
            }
        }
    }

    /// Convert a rotation matrix to Euler angles (pitch, yaw, roll) in
    /// degrees.
    ///
    /// The branching and element indices match the reference
    /// decomposition; downstream consumers depend on this convention.
    #[must_use]
    pub fn rotation_matrix_to_euler(r: &Matrix3<f64>) -> (f64, f64, f64) {
        let sy = (r[(0, 0)].powi(2) + r[(1, 0)].powi(2)).sqrt();

        if sy > GIMBAL_LOCK_EPSILON {
            (
                (-r[(2, 0)]).atan2(sy).to_degrees(),
                r[(1, 0)].atan2(r[(0, 0)]).to_degrees(),
                r[(2, 1)].atan2(r[(2, 2)]).to_degrees(),
            )
        } else {
            (
                (-r[(2, 0)]).atan2(sy).to_degrees(),
                0.0,
                (-r[(1, 2)]).atan2(r[(1, 1)]).to_degrees(),
            )
        }
    }

    /// Reprojection residuals for the parameter vector `[rvec; tvec]`.
    ///
    /// `None` when any model point lands behind the camera.
    fn residuals(
        &self,
        params: &Params,
        image_points: &[Point2<f64>],
        focal: f64,
        cx: f64,
        cy: f64,
    ) -> Option<Residuals> {
        let rvec = Vector3::new(params[0], params[1], params[2]);
        let tvec = Vector3::new(params[3], params[4], params[5]);
        let rotation = rodrigues(&rvec);

        let mut residuals = Residuals::zeros();
        for (i, (model, observed)) in self.model_points.iter().zip(image_points).enumerate() {
            let camera = rotation * model.coords + tvec;
            if camera.z < 1.0 {
                return None;
            }
            let u = focal * camera.x / camera.z + cx;
            let v = focal * camera.y / camera.z + cy;
            residuals[2 * i] = u - observed.x;
            residuals[2 * i + 1] = v - observed.y;
        }
        if residuals.iter().any(|r| !r.is_finite()) {
            return None;
        }
        Some(residuals)
    }

    /// Levenberg-Marquardt minimization of the reprojection error
    fn solve(
        &self,
        init: Params,
        image_points: &[Point2<f64>],
        focal: f64,
        cx: f64,
        cy: f64,
    ) -> Option<(Vector3<f64>, Vector3<f64>)> {
        let mut params = init;
        let mut residuals = self.residuals(&params, image_points, focal, cx, cy)?;
        let mut cost = residuals.norm_squared();
        let mut lambda = 1e-3;

        for _ in 0..PNP_MAX_ITERATIONS {
            let jacobian = self.numeric_jacobian(&params, &residuals, image_points, focal, cx, cy)?;
            let jtj = jacobian.transpose() * jacobian;
            let jtr = jacobian.transpose() * residuals;

            // Retry the step with increasing damping until it improves.
            let mut stepped = false;
            while lambda < 1e12 {
                let mut damped = jtj;
                for i in 0..6 {
                    damped[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
                }
                let Some(delta) = damped.lu().solve(&(-jtr)) else {
                    lambda *= 10.0;
                    continue;
                };

                let candidate = params + delta;
                if let Some(next) = self.residuals(&candidate, image_points, focal, cx, cy) {
                    let next_cost = next.norm_squared();
                    if next_cost < cost {
                        params = candidate;
                        residuals = next;
                        cost = next_cost;
                        lambda = (lambda / 10.0).max(1e-12);
                        stepped = true;
                        if delta.norm() < PNP_STEP_EPSILON {
                            return self.validated(&params, cost);
                        }
                        break;
                    }
                }
                lambda *= 10.0;
            }

            if !stepped {
                break;
            }
        }

        self.validated(&params, cost)
    }

    /// Sanity-gate a candidate solution: finite parameters, plausible
    /// depth, bounded reprojection error
    fn validated(&self, params: &Params, cost: f64) -> Option<(Vector3<f64>, Vector3<f64>)> {
        if params.iter().any(|p| !p.is_finite()) {
            return None;
        }
        let depth = params[5];
        if !(PNP_DEPTH_RANGE.0..=PNP_DEPTH_RANGE.1).contains(&depth) {
            return None;
        }
        let rms = (cost / POSE_POINT_COUNT as f64).sqrt();
        if rms > PNP_MAX_REPROJECTION_ERROR {
            return None;
        }
        Some((
            Vector3::new(params[0], params[1], params[2]),
            Vector3::new(params[3], params[4], params[5]),
        ))
    }

    /// Forward-difference Jacobian of the residual vector
    fn numeric_jacobian(
        &self,
        params: &Params,
        residuals: &Residuals,
        image_points: &[Point2<f64>],
        focal: f64,
        cx: f64,
        cy: f64,
    ) -> Option<Jacobian> {
        let mut jacobian = Jacobian::zeros();
        for i in 0..6 {
            let eps = 1e-6 * params[i].abs().max(1e-3);
            let mut perturbed = *params;
            perturbed[i] += eps;
            let shifted = self.residuals(&perturbed, image_points, focal, cx, cy)?;
            jacobian.set_column(i, &((shifted - residuals) / eps));
        }
        Some(jacobian)
    }
}
