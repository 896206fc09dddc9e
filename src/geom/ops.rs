use geo::{LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::error::Result;
use crate::geom::GeometryKind;

/// The geometric capabilities overlap resolution needs from a geometry engine.
///
/// The resolver is written only against this trait, so an engine can be
/// swapped or wrapped (e.g. to record calls in tests) without touching the
/// algorithm. [`PlanarOps`](crate::PlanarOps) is the default, planar
/// implementation.
pub trait GeometryOps {
    /// `a − b`.
    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>>;

    /// `a ∩ b`, possibly holding lower-dimensional artefacts.
    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<GeometryKind>;

    /// `a ∪ b`.
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>>;

    /// All rings (exteriors and holes) of `shape`.
    fn boundary(&self, shape: &MultiPolygon<f64>) -> MultiLineString<f64>;

    /// Points where boundary `a` meets boundary `b`, without duplicates.
    fn boundary_crossings(&self, a: &MultiLineString<f64>, b: &MultiLineString<f64>) -> MultiPoint<f64>;

    /// The subset of `points` lying on `boundary`, in their original order.
    fn points_on(&self, boundary: &MultiLineString<f64>, points: &MultiPoint<f64>) -> MultiPoint<f64>;

    /// Split `polygon` along the polyline `cut`. Returns the polygon itself
    /// (one piece) when the cut does not divide it.
    fn split(&self, polygon: &Polygon<f64>, cut: &LineString<f64>) -> Result<Vec<Polygon<f64>>>;

    /// Area-weighted centroid of `shape`.
    fn centroid(&self, shape: &MultiPolygon<f64>) -> Result<Point<f64>>;

    /// Distance from `polygon` to `point`; zero when the polygon covers it.
    fn distance(&self, polygon: &Polygon<f64>, point: &Point<f64>) -> f64;

    fn area(&self, shape: &MultiPolygon<f64>) -> f64;
}
