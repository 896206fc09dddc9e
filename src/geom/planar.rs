use geo::{
    Area, BooleanOps, BoundingRect, Centroid, CoordsIter, Distance, Euclidean, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon, Rect,
};

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::geom::{crossings, split, GeometryKind, GeometryOps};

/// Planar [`GeometryOps`] over `geo` types.
///
/// Set operations, areas and centroids come from `geo`; boundary crossings
/// use an R-tree of boundary segments, and splitting uses a half-edge planar
/// graph. Point matching and vertex merging use `snap_tolerance` scaled by
/// the extent of the geometry involved.
#[derive(Debug, Clone, Copy)]
pub struct PlanarOps {
    snap_tolerance: f64,
}

impl Default for PlanarOps {
    fn default() -> Self { Self::new(&ResolverConfig::default()) }
}

impl PlanarOps {
    pub fn new(config: &ResolverConfig) -> Self {
        Self { snap_tolerance: config.snap_tolerance }
    }

    /// Absolute tolerance for geometry bounded by `rect`.
    #[inline]
    fn tolerance(&self, rect: Option<Rect<f64>>) -> f64 {
        rect.map_or(0.0, |r| r.width().max(r.height())) * self.snap_tolerance
    }
}

/// Reject coordinates that no set operation can handle.
fn ensure_finite<G: CoordsIter<Scalar = f64>>(shape: &G, what: &str) -> Result<()> {
    match shape.coords_iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        Some(c) => Err(Error::Geometry(format!("{what} has a non-finite coordinate ({}, {})", c.x, c.y))),
        None => Ok(()),
    }
}

/// Smallest rectangle covering both inputs.
fn merge_rects(a: Option<Rect<f64>>, b: Option<Rect<f64>>) -> Option<Rect<f64>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Rect::new(
            (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
            (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
        )),
        (a, b) => a.or(b),
    }
}

impl GeometryOps for PlanarOps {
    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        ensure_finite(a, "difference operand")?;
        ensure_finite(b, "difference operand")?;
        Ok(a.difference(b))
    }

    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<GeometryKind> {
        ensure_finite(a, "intersection operand")?;
        ensure_finite(b, "intersection operand")?;
        Ok(GeometryKind::MultiPolygon(a.intersection(b)))
    }

    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        ensure_finite(a, "union operand")?;
        ensure_finite(b, "union operand")?;
        Ok(a.union(b))
    }

    fn boundary(&self, shape: &MultiPolygon<f64>) -> MultiLineString<f64> {
        MultiLineString::new(
            shape.0.iter()
                .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
                .cloned()
                .collect()
        )
    }

    fn boundary_crossings(&self, a: &MultiLineString<f64>, b: &MultiLineString<f64>) -> MultiPoint<f64> {
        let tol = self.tolerance(merge_rects(a.bounding_rect(), b.bounding_rect()));
        crossings::boundary_crossings(a, b, tol).into_iter().map(Point::from).collect()
    }

    fn points_on(&self, boundary: &MultiLineString<f64>, points: &MultiPoint<f64>) -> MultiPoint<f64> {
        let tol = self.tolerance(boundary.bounding_rect());
        let coords = points.0.iter().map(|point| point.0).collect::<Vec<_>>();
        crossings::points_on(boundary, &coords, tol).into_iter().map(Point::from).collect()
    }

    fn split(&self, polygon: &Polygon<f64>, cut: &LineString<f64>) -> Result<Vec<Polygon<f64>>> {
        ensure_finite(polygon, "split polygon")?;
        ensure_finite(cut, "cutting line")?;
        let tol = self.tolerance(polygon.bounding_rect());
        Ok(split::split_polygon(polygon, cut, tol))
    }

    fn centroid(&self, shape: &MultiPolygon<f64>) -> Result<Point<f64>> {
        shape.centroid()
            .ok_or_else(|| Error::Geometry("region is empty and has no centroid".into()))
    }

    fn distance(&self, polygon: &Polygon<f64>, point: &Point<f64>) -> f64 {
        Euclidean.distance(polygon, point)
    }

    fn area(&self, shape: &MultiPolygon<f64>) -> f64 {
        shape.unsigned_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use geo::{point, polygon};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]])
    }

    #[test]
    fn boundary_includes_holes() {
        let ops = PlanarOps::default();
        let ring = ops.difference(&square(0.0, 0.0, 4.0, 4.0), &square(1.0, 1.0, 2.0, 2.0)).unwrap();
        assert_eq!(ops.boundary(&ring).0.len(), 2);
    }

    #[test]
    fn distance_is_zero_inside_and_euclidean_outside() {
        let ops = PlanarOps::default();
        let shape = &square(0.0, 0.0, 2.0, 2.0).0[0];
        assert_eq!(ops.distance(shape, &point!(x: 1.0, y: 1.0)), 0.0);
        assert_eq!(ops.distance(shape, &point!(x: 2.0, y: 1.0)), 0.0);
        assert!((ops.distance(shape, &point!(x: 5.0, y: 6.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_region_has_no_centroid() {
        let ops = PlanarOps::default();
        let err = ops.centroid(&MultiPolygon::new(vec![])).unwrap_err();
        assert!(matches!(err, Error::Geometry(_)));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let ops = PlanarOps::default();
        let broken = square(0.0, 0.0, f64::NAN, 1.0);
        let err = ops.intersection(&broken, &square(0.0, 0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::Geometry(_)));
    }

    #[test]
    fn tolerance_scales_with_extent() {
        let ops = PlanarOps::new(&ResolverConfig { snap_tolerance: 1e-3 });
        let rect = Rect::new((0.0, 0.0), (10.0, 2.0));
        assert!((ops.tolerance(Some(rect)) - 1e-2).abs() < 1e-15);
        assert_eq!(ops.tolerance(None), 0.0);
    }
}
