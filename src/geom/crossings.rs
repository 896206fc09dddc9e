use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Distance, Euclidean, Line, MultiLineString};
use rstar::RTree;

use super::bbox::{padded_envelope, BoundingBox};

/// Non-degenerate segments of every line in `lines`, in storage order.
pub(crate) fn segments(lines: &MultiLineString<f64>) -> Vec<Line<f64>> {
    lines.0.iter()
        .flat_map(|line| line.lines())
        .filter(|segment| segment.start != segment.end)
        .collect()
}

/// Position of `coord` along `segment`, as a fraction of its length.
#[inline]
pub(crate) fn param(segment: &Line<f64>, coord: &Coord<f64>) -> f64 {
    let d = segment.delta();
    let len2 = d.x * d.x + d.y * d.y;
    if len2 == 0.0 { return 0.0 }
    ((coord.x - segment.start.x) * d.x + (coord.y - segment.start.y) * d.y) / len2
}

/// Points where `a` meets `b`: proper crossings and touching points.
/// Collinear overlaps contribute no points.
///
/// Output order follows `a`: segments in storage order, and crossings along
/// each segment by distance from its start. Points within `tol` of an
/// earlier point are dropped.
pub(crate) fn boundary_crossings(
    a: &MultiLineString<f64>,
    b: &MultiLineString<f64>,
    tol: f64,
) -> Vec<Coord<f64>> {
    let b_segments = segments(b);
    let rtree = RTree::bulk_load(
        b_segments.iter().enumerate()
            .map(|(i, segment)| BoundingBox::of_segment(i, segment))
            .collect()
    );

    let mut crossings: Vec<Coord<f64>> = Vec::new();
    for segment in segments(a) {
        let search = padded_envelope(&geo::Rect::new(segment.start, segment.end), tol);

        let mut hits = rtree.locate_in_envelope_intersecting(&search)
            .filter_map(|cand| match line_intersection(segment, b_segments[cand.idx()]) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => Some(intersection),
                _ => None,
            })
            .collect::<Vec<_>>();
        hits.sort_by(|p, q| param(&segment, p).total_cmp(&param(&segment, q)));

        for hit in hits {
            if !crossings.iter().any(|&seen| Euclidean.distance(seen, hit) <= tol) {
                crossings.push(hit);
            }
        }
    }

    crossings
}

/// The coordinates of `points` lying within `tol` of `boundary`.
pub(crate) fn points_on(
    boundary: &MultiLineString<f64>,
    points: &[Coord<f64>],
    tol: f64,
) -> Vec<Coord<f64>> {
    let edges = segments(boundary);
    points.iter()
        .filter(|&&point| edges.iter().any(|edge| Euclidean.distance(point, edge) <= tol))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use geo::{line_string, coord};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiLineString<f64> {
        MultiLineString::new(vec![line_string![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
        ]])
    }

    #[test]
    fn diagonally_offset_squares_cross_twice() {
        let crossings = boundary_crossings(&square(0.0, 0.0, 4.0, 4.0), &square(2.0, 2.0, 6.0, 6.0), 1e-9);
        assert_eq!(crossings.len(), 2);
        assert!(Euclidean.distance(crossings[0], coord! { x: 4.0, y: 2.0 }) < 1e-12);
        assert!(Euclidean.distance(crossings[1], coord! { x: 2.0, y: 4.0 }) < 1e-12);
    }

    #[test]
    fn nested_squares_do_not_cross() {
        let crossings = boundary_crossings(&square(0.0, 0.0, 4.0, 4.0), &square(1.0, 1.0, 2.0, 2.0), 1e-9);
        assert!(crossings.is_empty());
    }

    #[test]
    fn shared_corner_is_reported_once() {
        // Corner (2, 2) is the end of one segment and the start of the next.
        let crossings = boundary_crossings(&square(0.0, 0.0, 2.0, 2.0), &square(2.0, 2.0, 3.0, 3.0), 1e-9);
        assert_eq!(crossings, vec![coord! { x: 2.0, y: 2.0 }]);
    }

    #[test]
    fn points_on_keeps_only_boundary_points_in_order() {
        let points = [
            coord! { x: 4.0, y: 1.0 },
            coord! { x: 2.0, y: 2.0 },
            coord! { x: 0.0, y: 3.0 },
        ];
        let kept = points_on(&square(0.0, 0.0, 4.0, 4.0), &points, 1e-9);
        assert_eq!(kept, vec![points[0], points[2]]);
    }

    #[test]
    fn points_on_matches_within_tolerance() {
        let points = [coord! { x: 4.0 + 1e-10, y: 1.0 }, coord! { x: 4.0 + 1e-6, y: 1.0 }];
        let kept = points_on(&square(0.0, 0.0, 4.0, 4.0), &points, 1e-9);
        assert_eq!(kept, vec![points[0]]);
    }
}
