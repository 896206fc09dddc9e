use rstar::{primitives::GeomWithData, RTree};
use thiserror::Error;

use crate::sphere::{chord, chord_to_angle, to_unit_vector};

/// Errors raised by a k-th nearest neighbour query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnnError {
    /// Ranks are 1-based; rank 0 names no neighbour.
    #[error("neighbour rank must be at least 1")]
    ZeroRank,
    /// There is no k-th neighbour among fewer than `k` candidates.
    #[error("neighbour rank {k} exceeds the {candidates} available candidates")]
    RankOutOfRange { k: usize, candidates: usize },
}

/// The k-th closest candidate to one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the candidate in the candidate slice.
    pub index: usize,
    /// Great-circle distance to the candidate, in radians.
    pub distance: f64,
}

/// A provider of k-th nearest neighbour queries under the great-circle metric.
///
/// Both `queries` and `candidates` are `[lon, lat]` points in radians. `k` is
/// 1-based: rank 1 is the closest candidate, which is the query itself when
/// the query point also appears among the candidates. The result holds one
/// [`Neighbor`] per query, in query order.
pub trait KthNeighbors {
    fn kth_neighbors(
        &self,
        queries: &[[f64; 2]],
        candidates: &[[f64; 2]],
        k: usize,
    ) -> Result<Vec<Neighbor>, KnnError>;
}

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// R-tree backed [`KthNeighbors`] provider.
///
/// Candidates are lifted onto the unit sphere, where chord length is monotone
/// in great-circle distance, so a Euclidean R-tree yields the great-circle
/// ordering. The tree is built per query batch and dropped afterwards. Ties
/// are broken by the tree's traversal order, which depends only on the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineKnn;

impl KthNeighbors for HaversineKnn {
    fn kth_neighbors(
        &self,
        queries: &[[f64; 2]],
        candidates: &[[f64; 2]],
        k: usize,
    ) -> Result<Vec<Neighbor>, KnnError> {
        if k == 0 { return Err(KnnError::ZeroRank) }
        if k > candidates.len() {
            return Err(KnnError::RankOutOfRange { k, candidates: candidates.len() })
        }

        let tree = RTree::bulk_load(
            candidates.iter().enumerate()
                .map(|(i, &point)| IndexedPoint::new(to_unit_vector(point), i))
                .collect()
        );

        queries.iter()
            .map(|&query| {
                let target = to_unit_vector(query);
                let found = tree.nearest_neighbor_iter(&target)
                    .nth(k - 1)
                    .ok_or(KnnError::RankOutOfRange { k, candidates: candidates.len() })?;

                Ok(Neighbor {
                    index: found.data,
                    distance: chord_to_angle(chord(found.geom(), &target)),
                })
            })
            .collect()
    }
}
