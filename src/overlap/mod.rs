mod detect;

use geo::{BoundingRect, Intersects, LineString, MultiPolygon};
use tracing::{debug, trace};

pub use detect::{assert_no_overlaps, find_overlaps};

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::geom::{GeometryOps, PlanarOps};

/// Reconciles pairs of overlapping regions by handing each piece of their
/// overlap to exactly one of them.
///
/// The overlap is split along the points where the two outlines cross, and
/// every piece goes to the region whose centroid is nearer; equidistant
/// pieces go to the second region.
#[derive(Debug, Clone, Default)]
pub struct OverlapResolver<O: GeometryOps = PlanarOps> {
    ops: O,
}

impl OverlapResolver<PlanarOps> {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { ops: PlanarOps::new(config) })
    }
}

impl<O: GeometryOps> OverlapResolver<O> {
    /// Construct a resolver over a custom geometry engine.
    pub fn with_ops(ops: O) -> Self {
        Self { ops }
    }

    /// Get a reference to the geometry engine.
    pub fn ops(&self) -> &O { &self.ops }

    /// Partition the overlap of `a` and `b` between them.
    ///
    /// Returns `(new_a, new_b)`: each input minus the other, plus the overlap
    /// pieces nearer to its own centroid. `new_a` is computed as `a` minus the
    /// pieces handed to `b`, and `new_b` as `b − new_a`. Inputs that share no
    /// area are returned unchanged.
    pub fn resolve(
        &self,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<(MultiPolygon<f64>, MultiPolygon<f64>)> {
        // Separated bounding boxes (or an empty input) cannot share area.
        let separated = match (a.bounding_rect(), b.bounding_rect()) {
            (Some(ra), Some(rb)) => !ra.intersects(&rb),
            _ => true,
        };
        if separated { return Ok((a.clone(), b.clone())) }

        // Points and lines along shared edges are not overlap.
        let overlap = self.ops.intersection(a, b)?;
        if overlap.is_empty() || overlap.dimension() != Some(2) {
            trace!("regions touch without sharing area");
            return Ok((a.clone(), b.clone()));
        }
        let fragments = overlap.into_fragments();
        if fragments.is_empty() {
            trace!("overlap has no area");
            return Ok((a.clone(), b.clone()));
        }

        let centroid_a = self.ops.centroid(a)?;
        let centroid_b = self.ops.centroid(b)?;
        let crossings = self.ops.boundary_crossings(&self.ops.boundary(a), &self.ops.boundary(b));

        debug!(fragments = fragments.len(), crossings = crossings.0.len(), "resolving overlap");

        // Only the pieces handed to B are collected: A keeps everything else.
        let mut to_b_pieces = MultiPolygon::new(vec![]);
        for fragment in fragments {
            let outline = self.ops.boundary(&MultiPolygon::new(vec![fragment.clone()]));
            let cut_points = self.ops.points_on(&outline, &crossings);

            let pieces = if cut_points.0.len() >= 2 {
                let cut = LineString::new(cut_points.0.iter().map(|point| point.0).collect());
                self.ops.split(&fragment, &cut)?
            } else {
                vec![fragment]
            };

            for piece in pieces {
                let to_a = self.ops.distance(&piece, &centroid_a);
                let to_b = self.ops.distance(&piece, &centroid_b);

                if to_a < to_b {
                    trace!(to_a, to_b, "piece assigned to first region");
                } else {
                    trace!(to_a, to_b, "piece assigned to second region");
                    to_b_pieces = self.ops.union(&to_b_pieces, &MultiPolygon::new(vec![piece]))?;
                }
            }
        }

        // new_a ⊆ a and new_b = b − new_a: disjoint, and together a ∪ b.
        let new_a = self.ops.difference(a, &to_b_pieces)?;
        let new_b = self.ops.difference(b, &new_a)?;

        Ok((new_a, new_b))
    }
}
