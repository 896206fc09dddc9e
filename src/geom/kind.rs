use geo::{Area, Geometry, LineString, MultiPolygon, Point, Polygon};

/// A geometry value tagged by shape.
///
/// Set operations on polygons can produce mixed results (polygons alongside
/// the point and line artefacts of shared vertices and edges). Everything
/// downstream pattern-matches on this enum instead of probing types.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Point(Point<f64>),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// A mixed collection; members may themselves be collections.
    Collection(Vec<GeometryKind>),
}

impl GeometryKind {
    /// Topological dimension: 0 for points, 1 for lines, 2 for areas.
    /// A collection takes the highest dimension of its members; an empty
    /// collection has none.
    pub fn dimension(&self) -> Option<u8> {
        match self {
            Self::Point(_) => Some(0),
            Self::LineString(_) => Some(1),
            Self::Polygon(_) | Self::MultiPolygon(_) => Some(2),
            Self::Collection(members) => members.iter().filter_map(Self::dimension).max(),
        }
    }

    /// Returns true if the geometry holds no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(_) => false,
            Self::LineString(line) => line.0.is_empty(),
            Self::Polygon(polygon) => polygon.exterior().0.is_empty(),
            Self::MultiPolygon(multi) => multi.0.iter().all(|polygon| polygon.exterior().0.is_empty()),
            Self::Collection(members) => members.iter().all(Self::is_empty),
        }
    }

    /// All polygon members, with multi-polygons and nested collections
    /// flattened and points/lines dropped.
    pub fn into_polygons(self) -> Vec<Polygon<f64>> {
        let mut polygons = Vec::new();
        self.collect_polygons(&mut polygons);
        polygons
    }

    fn collect_polygons(self, out: &mut Vec<Polygon<f64>>) {
        match self {
            Self::Point(_) | Self::LineString(_) => {}
            Self::Polygon(polygon) => out.push(polygon),
            Self::MultiPolygon(multi) => out.extend(multi.0),
            Self::Collection(members) => {
                for member in members { member.collect_polygons(out) }
            }
        }
    }

    /// The areal fragments of the geometry: its polygons, excluding
    /// degenerate zero-area rings.
    pub fn into_fragments(self) -> Vec<Polygon<f64>> {
        self.into_polygons().into_iter()
            .filter(|polygon| polygon.unsigned_area() > 0.0)
            .collect()
    }
}

impl From<Point<f64>> for GeometryKind {
    fn from(point: Point<f64>) -> Self { Self::Point(point) }
}

impl From<LineString<f64>> for GeometryKind {
    fn from(line: LineString<f64>) -> Self { Self::LineString(line) }
}

impl From<Polygon<f64>> for GeometryKind {
    fn from(polygon: Polygon<f64>) -> Self { Self::Polygon(polygon) }
}

impl From<MultiPolygon<f64>> for GeometryKind {
    fn from(multi: MultiPolygon<f64>) -> Self { Self::MultiPolygon(multi) }
}

impl From<Geometry<f64>> for GeometryKind {
    fn from(geometry: Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(point) => Self::Point(point),
            Geometry::Line(line) => Self::LineString(LineString::new(vec![line.start, line.end])),
            Geometry::LineString(line) => Self::LineString(line),
            Geometry::Polygon(polygon) => Self::Polygon(polygon),
            Geometry::MultiPoint(points) => Self::Collection(points.0.into_iter().map(Self::Point).collect()),
            Geometry::MultiLineString(lines) => Self::Collection(lines.0.into_iter().map(Self::LineString).collect()),
            Geometry::MultiPolygon(multi) => Self::MultiPolygon(multi),
            Geometry::GeometryCollection(collection) => Self::Collection(collection.0.into_iter().map(Self::from).collect()),
            Geometry::Rect(rect) => Self::Polygon(rect.to_polygon()),
            Geometry::Triangle(triangle) => Self::Polygon(triangle.to_polygon()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use geo::{line_string, point, polygon, GeometryCollection, Rect};

    fn unit_square() -> Polygon<f64> {
        polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]
    }

    #[test]
    fn dimension_of_mixed_collection_is_the_highest_member() {
        let mixed = GeometryKind::Collection(vec![
            point!(x: 0.0, y: 0.0).into(),
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
        ]);
        assert_eq!(mixed.dimension(), Some(1));
        assert_eq!(GeometryKind::Collection(vec![]).dimension(), None);
        assert_eq!(GeometryKind::from(unit_square()).dimension(), Some(2));
    }

    #[test]
    fn fragments_drop_lines_points_and_zero_area_rings() {
        let sliver = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)];
        let mixed = GeometryKind::Collection(vec![
            unit_square().into(),
            sliver.into(),
            line_string![(x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
            point!(x: 5.0, y: 5.0).into(),
        ]);
        assert_eq!(mixed.into_fragments(), vec![unit_square()]);
    }

    #[test]
    fn nested_collections_are_flattened() {
        let nested = GeometryKind::Collection(vec![
            GeometryKind::Collection(vec![unit_square().into()]),
            MultiPolygon::new(vec![unit_square(), unit_square()]).into(),
        ]);
        assert_eq!(nested.into_polygons().len(), 3);
    }

    #[test]
    fn converts_from_geo_geometry() {
        let collection = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Rect(Rect::new((0.0, 0.0), (1.0, 1.0))),
            Geometry::Point(point!(x: 2.0, y: 2.0)),
        ]));
        let GeometryKind::Collection(members) = GeometryKind::from(collection) else {
            panic!("expected a collection");
        };
        assert!(matches!(members[0], GeometryKind::Polygon(_)));
        assert!(matches!(members[1], GeometryKind::Point(_)));
    }

    #[test]
    fn empty_multipolygon_is_empty() {
        assert!(GeometryKind::from(MultiPolygon::<f64>::new(vec![])).is_empty());
        assert!(!GeometryKind::from(unit_square()).is_empty());
    }
}
