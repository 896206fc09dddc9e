//! Doubly Connected Edge List (DCEL) — a half-edge structure for the planar
//! graph formed by a polygon ring and the segments cutting it.
//!
//! Every undirected edge is a pair of directed **half-edges** (twins). Each
//! half-edge carries its `origin`, its `twin`, the `next`/`prev` half-edges
//! around the face to its left, and that `face`. Index `0` of `faces` is the
//! unbounded outer face; bounded faces start at `FaceId(1)`.

use std::fmt;

use geo::{Coord, LineString, Polygon};

// ---------------------------------------------------------------------------
// Index types
// ---------------------------------------------------------------------------

macro_rules! idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub(crate) struct $name(pub(crate) usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(VertexId);
idx!(HalfEdgeId);
idx!(FaceId);

/// The unbounded (outer) face — always `FaceId(0)`.
pub(crate) const OUTER_FACE: FaceId = FaceId(0);

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct Vertex<C> {
    pub(crate) coords: C,
}

#[derive(Clone, Debug)]
pub(crate) struct HalfEdge {
    /// Vertex this half-edge leaves from.
    pub(crate) origin: VertexId,
    /// The other half-edge of the same undirected edge.
    pub(crate) twin: HalfEdgeId,
    /// Next half-edge around `face` in CCW order.
    pub(crate) next: HalfEdgeId,
    /// Previous half-edge around `face` in CCW order.
    pub(crate) prev: HalfEdgeId,
    /// Face to the left of this half-edge.
    pub(crate) face: FaceId,
}

#[derive(Clone, Debug)]
pub(crate) struct Face {
    /// Any half-edge on the boundary of this face.
    pub(crate) half_edge: Option<HalfEdgeId>,
}

// ---------------------------------------------------------------------------
// DCEL
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct Dcel<C> {
    pub(crate) vertices: Vec<Vertex<C>>,
    pub(crate) half_edges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl<C> Dcel<C> {
    /// Create an empty DCEL. The outer face (`OUTER_FACE`) is pre-inserted.
    pub(crate) fn new() -> Self {
        Self {
            vertices: Vec::new(),
            half_edges: Vec::new(),
            faces: vec![Face { half_edge: None }],
        }
    }

    #[cfg(test)] pub(crate) fn num_vertices(&self) -> usize { self.vertices.len() }
    #[cfg(test)] pub(crate) fn num_half_edges(&self) -> usize { self.half_edges.len() }
    /// Number of bounded faces (excludes the outer face).
    pub(crate) fn num_bounded_faces(&self) -> usize { self.faces.len().saturating_sub(1) }

    #[cfg(test)] pub(crate) fn vertex(&self, id: VertexId) -> &Vertex<C> { &self.vertices[id.0] }
    #[cfg(test)] pub(crate) fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge { &self.half_edges[id.0] }
    #[cfg(test)] pub(crate) fn face(&self, id: FaceId) -> &Face { &self.faces[id.0] }

    /// Add an isolated vertex with the given coordinates.
    pub(crate) fn add_vertex(&mut self, coords: C) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex { coords });
        id
    }

    /// Add a new bounded face (returns its id).
    pub(crate) fn add_face(&mut self) -> FaceId {
        let id = FaceId(self.faces.len());
        self.faces.push(Face { half_edge: None });
        id
    }

    /// Add a twin pair of half-edges between `u` and `v`, both on the outer
    /// face until faces are labelled. `next`/`prev` are left self-referential
    /// for the caller to link.
    ///
    /// Returns `(uv, vu)` — the half-edge from u to v and its twin.
    pub(crate) fn add_edge(&mut self, u: VertexId, v: VertexId) -> (HalfEdgeId, HalfEdgeId) {
        let uv = HalfEdgeId(self.half_edges.len());
        let vu = HalfEdgeId(self.half_edges.len() + 1);

        self.half_edges.push(HalfEdge { origin: u, twin: vu, next: uv, prev: uv, face: OUTER_FACE });
        self.half_edges.push(HalfEdge { origin: v, twin: uv, next: vu, prev: vu, face: OUTER_FACE });

        (uv, vu)
    }

    /// Set `he.next = next` and `next.prev = he`.
    pub(crate) fn set_next(&mut self, he: HalfEdgeId, next: HalfEdgeId) {
        self.half_edges[he.0].next = next;
        self.half_edges[next.0].prev = he;
    }

    /// Iterate over all half-edges around the face of `start`, starting (and
    /// ending just before returning to) `start`.
    pub(crate) fn face_cycle(&self, start: HalfEdgeId) -> FaceCycle<'_, C> {
        FaceCycle { dcel: self, start, current: start, done: false }
    }

    /// The vertex at the head (destination) of a half-edge.
    pub(crate) fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.half_edges[self.half_edges[he.0].twin.0].origin
    }
}

impl Dcel<Coord<f64>> {
    /// Direction of `he` as an angle in (-π, π].
    fn angle(&self, he: HalfEdgeId) -> f64 {
        let from = self.vertices[self.half_edges[he.0].origin.0].coords;
        let to = self.vertices[self.dest(he).0].coords;
        (to.y - from.y).atan2(to.x - from.x)
    }

    /// Link `next`/`prev` so that every face cycle turns as far clockwise as
    /// possible at each vertex, which traces bounded faces counter-clockwise.
    ///
    /// For `he = u→v`, `next(he)` is the outgoing half-edge at `v` that
    /// immediately precedes `twin(he)` in counter-clockwise angular order.
    pub(crate) fn link_by_angle(&mut self) {
        let mut stars: Vec<Vec<HalfEdgeId>> = vec![Vec::new(); self.vertices.len()];
        for (i, he) in self.half_edges.iter().enumerate() {
            stars[he.origin.0].push(HalfEdgeId(i));
        }
        for star in &mut stars {
            star.sort_by(|&a, &b| self.angle(a).total_cmp(&self.angle(b)));
        }

        let mut position = vec![0; self.half_edges.len()];
        for star in &stars {
            for (p, he) in star.iter().enumerate() { position[he.0] = p }
        }

        for i in 0..self.half_edges.len() {
            let twin = self.half_edges[i].twin;
            let star = &stars[self.half_edges[twin.0].origin.0];
            let next = star[(position[twin.0] + star.len() - 1) % star.len()];
            self.set_next(HalfEdgeId(i), next);
        }
    }

    /// Walk every face cycle and assign faces: counter-clockwise cycles with
    /// positive area become new bounded faces, everything else belongs to the
    /// outer face. Returns the bounded faces in discovery order.
    pub(crate) fn label_faces(&mut self) -> Vec<FaceId> {
        let mut visited = vec![false; self.half_edges.len()];
        let mut bounded = Vec::new();

        for start in 0..self.half_edges.len() {
            if visited[start] { continue }

            let cycle = self.face_cycle(HalfEdgeId(start)).collect::<Vec<_>>();
            for he in &cycle { visited[he.0] = true }

            let face = if self.cycle_area(&cycle) > 0.0 {
                let face = self.add_face();
                bounded.push(face);
                face
            } else {
                OUTER_FACE
            };

            for he in &cycle { self.half_edges[he.0].face = face }
            if self.faces[face.0].half_edge.is_none() {
                self.faces[face.0].half_edge = Some(HalfEdgeId(start));
            }
        }

        bounded
    }

    /// Signed (shoelace) area enclosed by a half-edge cycle.
    fn cycle_area(&self, cycle: &[HalfEdgeId]) -> f64 {
        cycle.iter()
            .map(|&he| {
                let a = self.vertices[self.half_edges[he.0].origin.0].coords;
                let b = self.vertices[self.dest(he).0].coords;
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>() / 2.0
    }

    /// The boundary of a bounded face as a polygon without holes.
    pub(crate) fn face_polygon(&self, face: FaceId) -> Option<Polygon<f64>> {
        let start = self.faces[face.0].half_edge?;
        let mut ring = self.face_cycle(start)
            .map(|he| self.vertices[self.half_edges[he.0].origin.0].coords)
            .collect::<Vec<_>>();
        ring.push(ring[0]);
        Some(Polygon::new(LineString::new(ring), vec![]))
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Iterator over half-edges in a face cycle.
pub(crate) struct FaceCycle<'a, C> {
    dcel: &'a Dcel<C>,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a, C> Iterator for FaceCycle<'a, C> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        if self.done { return None; }
        let he = self.current;
        self.current = self.dcel.half_edges[he.0].next;
        if self.current == self.start { self.done = true; }
        Some(he)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
