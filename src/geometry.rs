//! Geometric ratio estimators for eye closure and mouth opening.
//!
//! Both ratios are unit-less and frame-size independent as long as the
//! input points share consistent pixel units. Degenerate geometry (zero
//! denominator, wrong point count) is reported as `0.0`, never as an
//! error, so one bad frame cannot halt the pipeline.

use nalgebra::Point2;

/// Eye aspect ratio over six points ordered (outer corner, upper-1,
/// upper-2, inner corner, lower-2, lower-1):
///
/// `EAR = (|p1-p5| + |p2-p4|) / (2 * |p0-p3|)`
///
/// Low values indicate a closed eye.
#[must_use]
pub fn eye_aspect_ratio(points: &[Point2<f64>]) -> f64 {
    if points.len() != 6 {
        return 0.0;
    }
    let a = (points[1] - points[5]).norm();
    let b = (points[2] - points[4]).norm();
    let c = (points[0] - points[3]).norm();
    if c > 0.0 {
        (a + b) / (2.0 * c)
    } else {
        0.0
    }
}

/// Mouth aspect ratio over eight points ordered (left corner, upper-outer-1,
/// upper-outer-2, upper center, right corner, lower center, lower-outer-2,
/// lower-outer-1):
///
/// `MAR = (|p1-p7| + |p2-p6| + |p3-p5|) / (2 * |p0-p4|)`
///
/// High values indicate a wide-open mouth.
#[must_use]
pub fn mouth_aspect_ratio(points: &[Point2<f64>]) -> f64 {
    if points.len() != 8 {
        return 0.0;
    }
    let a = (points[1] - points[7]).norm();
    let b = (points[2] - points[6]).norm();
    let c = (points[3] - points[5]).norm();
    let d = (points[0] - points[4]).norm();
    if d > 0.0 {
        (a + b + c) / (2.0 * d)
    } else {
        0.0
    }
}
