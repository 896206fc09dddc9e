use ahash::AHashSet;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BooleanOps, Coord, Distance, Euclidean, Line, LineString, MultiPolygon, Polygon};
use rstar::{primitives::GeomWithData, RTree};

use super::crossings::param;
use super::dcel::{Dcel, VertexId};

/// Merges coordinates closer than a tolerance into a single DCEL vertex.
struct VertexIndex {
    tree: RTree<GeomWithData<[f64; 2], usize>>,
    tol2: f64,
}

impl VertexIndex {
    fn new(tol: f64) -> Self {
        Self { tree: RTree::new(), tol2: tol * tol }
    }

    fn vertex(&mut self, dcel: &mut Dcel<Coord<f64>>, coord: Coord<f64>) -> VertexId {
        let key = [coord.x, coord.y];
        if let Some(found) = self.tree.locate_within_distance(key, self.tol2).next() {
            return VertexId(found.data);
        }
        let id = dcel.add_vertex(coord);
        self.tree.insert(GeomWithData::new(key, id.0));
        id
    }
}

/// Split `polygon` along the polyline `cut`.
///
/// The exterior ring and the cut segments are noded against each other and
/// stored as a planar graph; each bounded face of that graph, clipped back to
/// `polygon` (which restores holes and drops faces outside it), becomes one
/// piece. Cut edges that end without closing a face are pruned first, so a
/// cut that enters but does not cross the polygon leaves it whole.
///
/// Clipping faces against `polygon` leaves vertices a rounding error away
/// from the graph's own, so every piece is snapped back onto the graph and
/// the polygon's vertices and cleared of the slivers and spikes this leaves.
///
/// Returns `vec![polygon.clone()]` when fewer than two pieces result.
pub(crate) fn split_polygon(polygon: &Polygon<f64>, cut: &LineString<f64>, tol: f64) -> Vec<Polygon<f64>> {
    let ring = polygon.exterior().lines()
        .filter(|segment| segment.start != segment.end)
        .collect::<Vec<_>>();
    let blades = cut.lines()
        .filter(|segment| segment.start != segment.end)
        .collect::<Vec<_>>();
    if ring.len() < 3 || blades.is_empty() { return vec![polygon.clone()] }

    let segments = ring.iter().chain(&blades).copied().collect::<Vec<_>>();
    let nodes = node_segments(&segments, ring.len(), tol);

    // Build the noded graph, merging near-coincident vertices.
    let mut dcel = Dcel::new();
    let mut index = VertexIndex::new(tol);
    let mut edges = AHashSet::new();
    for (segment, mut coords) in segments.iter().zip(nodes) {
        coords.sort_by(|p, q| param(segment, p).total_cmp(&param(segment, q)));

        let ids = coords.into_iter()
            .map(|coord| index.vertex(&mut dcel, coord))
            .collect::<Vec<_>>();
        for pair in ids.windows(2) {
            if pair[0] != pair[1] {
                edges.insert((pair[0].min(pair[1]), pair[0].max(pair[1])));
            }
        }
    }

    let mut edges = edges.into_iter().collect::<Vec<_>>();
    edges.sort();
    for (u, v) in prune_dangles(edges, dcel.vertices.len()) {
        dcel.add_edge(u, v);
    }

    dcel.link_by_angle();
    let faces = dcel.label_faces();
    if dcel.num_bounded_faces() < 2 { return vec![polygon.clone()] }

    // Smallest faces first, each carved against what is already emitted, so a
    // face nested inside another is never counted twice.
    let mut faces = faces.into_iter()
        .filter_map(|face| dcel.face_polygon(face))
        .collect::<Vec<_>>();
    faces.sort_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()));

    let min_area = tol * tol;
    let mut covered = MultiPolygon::new(vec![]);
    let mut pieces = Vec::new();
    for face in faces {
        let piece = face.intersection(polygon).difference(&covered);
        if piece.unsigned_area() <= min_area { continue }
        covered = covered.union(&piece);
        pieces.extend(piece.0.into_iter().filter(|part| part.unsigned_area() > min_area));
    }

    let anchors = RTree::bulk_load(
        dcel.vertices.iter().map(|vertex| vertex.coords)
            .chain(polygon.interiors().iter().flat_map(|ring| ring.0.iter().copied()))
            .map(|coord| [coord.x, coord.y])
            .collect()
    );
    let pieces = pieces.iter()
        .filter_map(|piece| clean_piece(piece, &anchors, tol))
        .filter(|piece| piece.unsigned_area() > min_area)
        .collect::<Vec<_>>();

    if pieces.len() < 2 { return vec![polygon.clone()] }
    pieces
}

/// Snap `piece` onto `anchors` and drop degenerate rings. `None` when the
/// exterior collapses.
fn clean_piece(piece: &Polygon<f64>, anchors: &RTree<[f64; 2]>, tol: f64) -> Option<Polygon<f64>> {
    let exterior = clean_ring(piece.exterior(), anchors, tol)?;
    let interiors = piece.interiors().iter()
        .filter_map(|ring| clean_ring(ring, anchors, tol))
        .collect();
    Some(Polygon::new(exterior, interiors))
}

/// Snap every vertex of `ring` to an anchor within `tol`, then remove repeated
/// vertices and zero-width spikes until none are left.
fn clean_ring(ring: &LineString<f64>, anchors: &RTree<[f64; 2]>, tol: f64) -> Option<LineString<f64>> {
    let mut coords = ring.0.iter()
        .map(|&coord| match anchors.nearest_neighbor(&[coord.x, coord.y]) {
            Some(&[x, y]) if Euclidean.distance(coord, Coord { x, y }) <= tol => Coord { x, y },
            _ => coord,
        })
        .collect::<Vec<_>>();
    if coords.len() > 1 && coords.first() == coords.last() { coords.pop(); }

    loop {
        let before = coords.len();
        coords.dedup_by(|next, prev| Euclidean.distance(*next, *prev) <= tol);
        while coords.len() > 1 && Euclidean.distance(coords[0], coords[coords.len() - 1]) <= tol {
            coords.pop();
        }

        let n = coords.len();
        if n < 3 { return None }
        if let Some(i) = (0..n).find(|&i| is_spike(coords[(i + n - 1) % n], coords[i], coords[(i + 1) % n], tol)) {
            coords.remove(i);
        }
        if coords.len() == before { break }
    }

    if coords.len() < 3 { return None }
    coords.push(coords[0]);
    Some(LineString::new(coords))
}

/// Returns true if the path `a → b → c` turns back on itself at `b` within
/// `tol` of a straight line.
fn is_spike(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, tol: f64) -> bool {
    let (u, w) = (b - a, c - b);
    let dot = u.x * w.x + u.y * w.y;
    let cross = u.x * w.y - u.y * w.x;
    dot < 0.0 && cross.abs() <= tol * u.x.hypot(u.y).max(w.x.hypot(w.y))
}

/// Split points for every segment: its own endpoints plus every point where a
/// blade (segments from `first_blade` on) meets another segment, including
/// blade endpoints lying within `tol` of a ring segment and ring vertices
/// lying within `tol` of a blade.
fn node_segments(segments: &[Line<f64>], first_blade: usize, tol: f64) -> Vec<Vec<Coord<f64>>> {
    let mut nodes = segments.iter()
        .map(|segment| vec![segment.start, segment.end])
        .collect::<Vec<_>>();

    for i in first_blade..segments.len() {
        let blade = segments[i];
        for j in 0..i {
            let other = segments[j];
            match line_intersection(blade, other) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    nodes[i].push(intersection);
                    nodes[j].push(intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    nodes[i].extend([intersection.start, intersection.end]);
                    nodes[j].extend([intersection.start, intersection.end]);
                }
                None => {}
            }

            if j < first_blade {
                for end in [blade.start, blade.end] {
                    if Euclidean.distance(end, &other) <= tol { nodes[j].push(end) }
                }
                if Euclidean.distance(other.start, &blade) <= tol { nodes[i].push(other.start) }
            }
        }
    }

    nodes
}

/// Drop edges hanging off the graph by a degree-one vertex, repeatedly, so
/// only edges on closed cycles remain.
fn prune_dangles(edges: Vec<(VertexId, VertexId)>, num_vertices: usize) -> Vec<(VertexId, VertexId)> {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
    for (e, &(u, v)) in edges.iter().enumerate() {
        incident[u.0].push(e);
        incident[v.0].push(e);
    }

    let mut alive = vec![true; edges.len()];
    let mut degree = incident.iter().map(Vec::len).collect::<Vec<_>>();
    let mut stack = (0..num_vertices).filter(|&v| degree[v] == 1).collect::<Vec<_>>();

    while let Some(v) = stack.pop() {
        let Some(&e) = incident[v].iter().find(|&&e| alive[e]) else { continue };
        alive[e] = false;
        let (a, b) = edges[e];
        for w in [a.0, b.0] {
            degree[w] -= 1;
            if degree[w] == 1 { stack.push(w) }
        }
    }

    edges.into_iter().zip(alive)
        .filter_map(|(edge, alive)| alive.then_some(edge))
        .collect()
}
