use geo::{MultiPolygon, Polygon};
use tracing::debug;

use crate::geom::GeometryKind;

/// Cleans mixed geometry results into plain polygons or multi-polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeConditioner;

impl ShapeConditioner {
    /// Condition every entry of `entries` in place.
    ///
    /// Collections lose their points and lines; their polygons (including the
    /// parts of multi-polygons and of nested collections) become a single
    /// polygon if there is exactly one, or a multi-polygon otherwise (empty
    /// when there are none). Other entries are left as they are.
    pub fn condition(&self, entries: &mut [GeometryKind]) {
        let mut conditioned = 0;
        for entry in entries.iter_mut() {
            if let GeometryKind::Collection(members) = entry {
                let members = std::mem::take(members);
                *entry = Self::collapse(GeometryKind::Collection(members).into_polygons());
                conditioned += 1;
            }
        }
        debug!(entries = entries.len(), conditioned, "conditioned shapes");
    }

    /// Condition a single entry.
    pub fn condition_one(&self, geometry: GeometryKind) -> GeometryKind {
        match geometry {
            GeometryKind::Collection(_) => Self::collapse(geometry.into_polygons()),
            other => other,
        }
    }

    fn collapse(polygons: Vec<Polygon<f64>>) -> GeometryKind {
        match <[Polygon<f64>; 1]>::try_from(polygons) {
            Ok([polygon]) => GeometryKind::Polygon(polygon),
            Err(polygons) => GeometryKind::MultiPolygon(MultiPolygon::new(polygons)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use geo::{line_string, point, polygon};

    fn square(x0: f64, y0: f64) -> Polygon<f64> {
        polygon![(x: x0, y: y0), (x: x0 + 1.0, y: y0), (x: x0 + 1.0, y: y0 + 1.0), (x: x0, y: y0 + 1.0)]
    }

    #[test]
    fn single_polygon_with_stray_artefacts_collapses_to_polygon() {
        let mut entries = vec![GeometryKind::Collection(vec![
            point!(x: 9.0, y: 9.0).into(),
            square(0.0, 0.0).into(),
            line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0)].into(),
            point!(x: 1.0, y: 1.0).into(),
        ])];
        ShapeConditioner.condition(&mut entries);
        assert_eq!(entries, vec![GeometryKind::Polygon(square(0.0, 0.0))]);
    }

    #[test]
    fn two_multipolygons_flatten_into_one_with_four_parts() {
        let mut entries = vec![GeometryKind::Collection(vec![
            MultiPolygon::new(vec![square(0.0, 0.0), square(2.0, 0.0)]).into(),
            MultiPolygon::new(vec![square(4.0, 0.0), square(6.0, 0.0)]).into(),
        ])];
        ShapeConditioner.condition(&mut entries);
        match &entries[0] {
            GeometryKind::MultiPolygon(multi) => assert_eq!(multi.0.len(), 4),
            other => panic!("expected a multi-polygon, got {other:?}"),
        }
    }

    #[test]
    fn collection_without_polygons_becomes_empty_multipolygon() {
        let mut entries = vec![GeometryKind::Collection(vec![
            point!(x: 0.0, y: 0.0).into(),
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)].into(),
        ])];
        ShapeConditioner.condition(&mut entries);
        assert_eq!(entries, vec![GeometryKind::MultiPolygon(MultiPolygon::new(vec![]))]);
    }

    #[test]
    fn non_collections_pass_through() {
        let mut entries = vec![
            GeometryKind::Polygon(square(0.0, 0.0)),
            GeometryKind::MultiPolygon(MultiPolygon::new(vec![square(3.0, 3.0)])),
            GeometryKind::Point(point!(x: 1.0, y: 2.0)),
        ];
        let before = entries.clone();
        ShapeConditioner.condition(&mut entries);
        assert_eq!(entries, before);
    }

    #[test]
    fn polygon_plus_multipolygon_members_are_combined() {
        let mixed = GeometryKind::Collection(vec![
            square(0.0, 0.0).into(),
            MultiPolygon::new(vec![square(2.0, 0.0)]).into(),
        ]);
        let GeometryKind::MultiPolygon(multi) = ShapeConditioner.condition_one(mixed) else {
            panic!("expected a multi-polygon");
        };
        assert_eq!(multi.0, vec![square(0.0, 0.0), square(2.0, 0.0)]);
    }
}
