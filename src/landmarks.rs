//! Landmark provider boundary: the types the external detection model
//! supplies per frame, and helpers to derive pixel-space point sets from
//! them.
//!
//! The detection model itself (face mesh / hand pose inference) is an
//! external collaborator; this module only defines the data it hands over.

use nalgebra::Point2;

use crate::constants::{MIDDLE_FINGER_MCP_INDEX, WRIST_INDEX};
use crate::Result;

/// One 2D landmark in normalized `[0, 1]` frame-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark2D {
    pub x: f64,
    pub y: f64,
}

impl Landmark2D {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box; coordinate units follow the points it was
/// built from (normalized for faces, pixels for hands)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Tight box around a set of coordinates; `None` when the set is empty
    #[must_use]
    pub fn from_coords(coords: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let (x0, y0) = iter.next()?;
        let mut bbox = Self {
            x_min: x0,
            x_max: x0,
            y_min: y0,
            y_max: y0,
        };
        for (x, y) in iter {
            bbox.x_min = bbox.x_min.min(x);
            bbox.x_max = bbox.x_max.max(x);
            bbox.y_min = bbox.y_min.min(y);
            bbox.y_max = bbox.y_max.max(y);
        }
        Some(bbox)
    }

    /// Membership test with the box expanded by `expansion` times its own
    /// width/height on each side
    #[must_use]
    pub fn contains(&self, x: f64, y: f64, expansion: f64) -> bool {
        let w = self.x_max - self.x_min;
        let h = self.y_max - self.y_min;
        self.x_min - w * expansion <= x
            && x <= self.x_max + w * expansion
            && self.y_min - h * expansion <= y
            && y <= self.y_max + h * expansion
    }
}

/// Face landmarks for the single tracked face, normalized coordinates.
///
/// The vector is indexed by face-mesh landmark number; it must cover at
/// least the index sets in [`crate::constants`].
#[derive(Debug, Clone, Default)]
pub struct FaceObservation {
    pub landmarks: Vec<Landmark2D>,
}

impl FaceObservation {
    /// Pixel-space points for the given face-mesh indices.
    ///
    /// Returns an empty vector when any index is out of range, which the
    /// ratio estimators and pose solver both report as their zero/default
    /// value.
    #[must_use]
    pub fn pixel_points(&self, indices: &[usize], width: f64, height: f64) -> Vec<Point2<f64>> {
        if indices.iter().any(|&i| i >= self.landmarks.len()) {
            return Vec::new();
        }
        indices
            .iter()
            .map(|&i| {
                let lm = self.landmarks[i];
                Point2::new(lm.x * width, lm.y * height)
            })
            .collect()
    }

    /// Tight bounding box over every landmark, normalized coordinates
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.landmarks.iter().map(|lm| (lm.x, lm.y)))
    }
}

/// One detected hand: 21 landmarks with the wrist at index 0 and the
/// middle-finger base at index 9, normalized coordinates
#[derive(Debug, Clone, Default)]
pub struct HandObservation {
    pub landmarks: Vec<Landmark2D>,
}

impl HandObservation {
    /// Hand center: midpoint of the wrist and middle-finger-base landmarks,
    /// normalized coordinates
    #[must_use]
    pub fn center(&self) -> Option<Landmark2D> {
        let wrist = self.landmarks.get(WRIST_INDEX)?;
        let mcp = self.landmarks.get(MIDDLE_FINGER_MCP_INDEX)?;
        Some(Landmark2D::new((wrist.x + mcp.x) / 2.0, (wrist.y + mcp.y) / 2.0))
    }

    /// Tight bounding box over all hand landmarks, pixel coordinates
    #[must_use]
    pub fn bounding_box_px(&self, width: f64, height: f64) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.landmarks.iter().map(|lm| (lm.x * width, lm.y * height)))
    }
}

/// Everything the landmark provider supplies for one frame
#[derive(Debug, Clone)]
pub struct FrameObservations {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Capture timestamp in seconds (monotonic source preferred)
    pub timestamp: f64,
    /// The tracked face, if one was detected this frame
    pub face: Option<FaceObservation>,
    /// Zero or more detected hands
    pub hands: Vec<HandObservation>,
}

impl FrameObservations {
    /// An empty observation set (nothing detected) for the given frame
    #[must_use]
    pub fn empty(width: u32, height: u32, timestamp: f64) -> Self {
        Self {
            width,
            height,
            timestamp,
            face: None,
            hands: Vec::new(),
        }
    }
}

/// Upstream landmark source.
///
/// Implementations own the detection model handles and must release them
/// in their `Drop` impl so teardown is deterministic on every exit path;
/// the pipeline never holds raw model resources itself.
pub trait LandmarkProvider {
    /// The frame/image type the provider consumes
    type Frame;

    /// Detect landmarks on one frame
    fn observe(&mut self, frame: &Self::Frame, width: u32, height: u32, timestamp: f64) -> Result<FrameObservations>;
}
