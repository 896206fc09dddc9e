use geo::{Line, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a shape or segment by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of the corresponding shape or segment
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Box around a single segment.
    pub(crate) fn of_segment(idx: usize, segment: &Line<f64>) -> Self {
        Self::new(idx, Rect::new(segment.start, segment.end))
    }

    /// Get the index of the corresponding shape or segment.
    pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Envelope of `rect` grown by `pad` on every side.
#[inline]
pub(crate) fn padded_envelope(rect: &Rect<f64>, pad: f64) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [rect.min().x - pad, rect.min().y - pad],
        [rect.max().x + pad, rect.max().y + pad],
    )
}
