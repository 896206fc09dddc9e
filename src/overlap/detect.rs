use geo::{BoundingRect, MultiPolygon, Relate};
use rstar::RTree;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::geom::{padded_envelope, BoundingBox, GeometryOps};

use super::OverlapResolver;

/// Overlap in area (including containment/equality) = intersects but not
/// merely touching.
fn overlaps(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    let im = a.relate(b);
    im.is_intersects() && !im.is_touches()
}

fn build_rtree(shapes: &[MultiPolygon<f64>]) -> RTree<BoundingBox> {
    RTree::bulk_load(
        shapes.iter().enumerate()
            .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
            .collect()
    )
}

/// Every unordered pair `(i, j)`, `i < j`, of shapes that overlap in area.
/// Pure boundary touches (edge or point) are not overlaps.
pub fn find_overlaps(shapes: &[MultiPolygon<f64>]) -> Vec<(usize, usize)> {
    let rtree = build_rtree(shapes);
    let mut pairs = Vec::new();

    for (i, shape) in shapes.iter().enumerate() {
        let Some(rect) = shape.bounding_rect() else { continue };

        let mut found = rtree.locate_in_envelope_intersecting(&padded_envelope(&rect, 0.0))
            .map(|cand| cand.idx())
            .filter(|&j| j > i) // check each unordered pair once
            .filter(|&j| overlaps(shape, &shapes[j]))
            .collect::<Vec<_>>();
        found.sort_unstable();
        pairs.extend(found.into_iter().map(|j| (i, j)));
    }

    pairs
}

/// Errors with the first overlapping pair, if any.
pub fn assert_no_overlaps(shapes: &[MultiPolygon<f64>]) -> Result<()> {
    match find_overlaps(shapes).first() {
        Some(&(first, second)) => Err(Error::Overlap { first, second }),
        None => Ok(()),
    }
}

impl<O: GeometryOps> OverlapResolver<O> {
    /// Resolve every overlapping pair in a collection of shapes.
    ///
    /// Pairs are found on the input and processed in index order; each pair
    /// is re-checked against the current shapes first, since an earlier
    /// resolution may already have separated it. Overlap pieces only ever
    /// move between the two shapes of a pair, so a piece can land on a third
    /// shape it was not tested against; run [`assert_no_overlaps`] on the
    /// result when that matters.
    pub fn resolve_all(&self, shapes: &[MultiPolygon<f64>]) -> Result<Vec<MultiPolygon<f64>>> {
        let mut resolved = shapes.to_vec();
        let pairs = find_overlaps(shapes);
        debug!(shapes = shapes.len(), pairs = pairs.len(), "resolving overlapping shapes");

        for (i, j) in pairs {
            if !overlaps(&resolved[i], &resolved[j]) {
                trace!(i, j, "pair already separated");
                continue;
            }
            let (a, b) = self.resolve(&resolved[i], &resolved[j])?;
            resolved[i] = a;
            resolved[j] = b;
        }

        Ok(resolved)
    }
}
