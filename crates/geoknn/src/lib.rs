//! k-th nearest neighbour queries over points on the sphere.
//!
//! Points are `[lon, lat]` pairs in radians. Distances are central angles in
//! radians; multiply by [`EARTH_RADIUS_M`] for metres.

pub mod knn;
pub mod sphere;

pub use knn::{HaversineKnn, KnnError, KthNeighbors, Neighbor};
pub use sphere::{haversine, EARTH_RADIUS_M};
