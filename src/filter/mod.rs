mod frame;
mod stats;

use geo::Point;
use geoknn::{HaversineKnn, KthNeighbors, EARTH_RADIUS_M};
use tracing::debug;

pub use frame::ReferenceFrame;

use crate::config::FilterConfig;
use crate::error::{Error, Result};
use stats::Summary;

/// A set of points together with the frame their coordinates are in.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoints {
    pub frame: ReferenceFrame,
    pub points: Vec<Point<f64>>,
}

impl GeoPoints {
    pub fn new(frame: ReferenceFrame, points: Vec<Point<f64>>) -> Self {
        Self { frame, points }
    }

    /// Points given as WGS84 longitude/latitude degrees.
    pub fn wgs84(points: Vec<Point<f64>>) -> Self {
        Self::new(ReferenceFrame::wgs84(), points)
    }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

/// The points kept by a filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Kept points, in the requested output frame.
    pub points: GeoPoints,
    /// Index of each kept point in the input, ascending.
    pub retained: Vec<usize>,
}

/// Neighbour rank used for a dataset of `count` points,
/// `floor(count * error_fraction) + 1`.
///
/// The extra rank skips the point itself, which is always its own closest
/// neighbour.
pub fn neighbor_rank(count: usize, error_fraction: f64) -> usize {
    (count as f64 * error_fraction).floor() as usize + 1
}

/// Drops points whose distance to their k-th nearest neighbour is unusual.
///
/// For each point the great-circle distance to its k-th nearest neighbour is
/// measured in metres. Points whose distance lies outside
/// `mean ± stdev_multiplier · stdev` of all such distances are removed; the
/// band is inclusive.
#[derive(Debug, Clone, Default)]
pub struct GeolocationFilter<N: KthNeighbors = HaversineKnn> {
    config: FilterConfig,
    neighbors: N,
}

impl GeolocationFilter<HaversineKnn> {
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, neighbors: HaversineKnn })
    }
}

impl<N: KthNeighbors> GeolocationFilter<N> {
    /// Construct a filter over a custom neighbour provider.
    pub fn with_neighbors(config: FilterConfig, neighbors: N) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, neighbors })
    }

    /// Get the filter settings.
    pub fn config(&self) -> &FilterConfig { &self.config }

    /// Filter `points`, returning the kept points in `output_frame`.
    pub fn filter(&self, points: &GeoPoints, output_frame: &ReferenceFrame) -> Result<FilterOutcome> {
        let count = points.len();
        if count < 2 { return Err(Error::StatisticsUndefined { count }) }

        let k = neighbor_rank(count, self.config.error_fraction);
        if k >= count {
            return Err(Error::InvalidParameter(format!(
                "neighbour rank {k} needs more than {count} points (error_fraction {})",
                self.config.error_fraction
            )));
        }

        let lonlat = points.frame.transform(&points.points, &ReferenceFrame::wgs84())?;
        let radians = lonlat.iter()
            .map(|p| [p.x().to_radians(), p.y().to_radians()])
            .collect::<Vec<_>>();

        let distances = self.neighbors.kth_neighbors(&radians, &radians, k)?
            .into_iter()
            .map(|neighbor| neighbor.distance * EARTH_RADIUS_M)
            .collect::<Vec<_>>();
        if distances.len() != count {
            return Err(Error::InvalidParameter(format!(
                "neighbour provider returned {} results for {count} points", distances.len()
            )));
        }

        let summary = Summary::of(&distances)?;
        let (lower, upper) = summary.band(self.config.stdev_multiplier);
        let retained = distances.iter()
            .enumerate()
            .filter(|&(_, &d)| summary.contains(self.config.stdev_multiplier, d))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        debug!(
            count, k, mean = summary.mean, stdev = summary.stdev, lower, upper,
            retained = retained.len(), "geolocation filter"
        );

        let kept = retained.iter().map(|&i| lonlat[i]).collect::<Vec<_>>();
        let kept = ReferenceFrame::wgs84().transform(&kept, output_frame)?;

        Ok(FilterOutcome {
            points: GeoPoints::new(output_frame.clone(), kept),
            retained,
        })
    }
}

/// Filter `points` with the great-circle neighbour provider.
pub fn geolocation_filter(
    points: &GeoPoints,
    error_fraction: f64,
    stdev_multiplier: f64,
    output_frame: &ReferenceFrame,
) -> Result<FilterOutcome> {
    GeolocationFilter::new(FilterConfig { error_fraction, stdev_multiplier })?
        .filter(points, output_frame)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use geoknn::{KnnError, Neighbor};

    use super::*;

    /// Reports fixed distances (in radians) and records the rank it was asked for.
    struct Fixed {
        distances: Vec<f64>,
        rank: Cell<usize>,
    }

    impl Fixed {
        fn metres(distances: &[f64]) -> Self {
            Self {
                distances: distances.iter().map(|d| d / EARTH_RADIUS_M).collect(),
                rank: Cell::new(0),
            }
        }
    }

    impl KthNeighbors for Fixed {
        fn kth_neighbors(&self, queries: &[[f64; 2]], _: &[[f64; 2]], k: usize)
            -> std::result::Result<Vec<Neighbor>, KnnError>
        {
            self.rank.set(k);
            Ok(queries.iter().zip(&self.distances)
                .map(|(_, &distance)| Neighbor { index: 0, distance })
                .collect())
        }
    }

    fn grid(count: usize) -> GeoPoints {
        GeoPoints::wgs84((0..count).map(|i| Point::new(i as f64 * 0.001, 0.0)).collect())
    }

    #[test]
    fn rank_skips_the_point_itself() {
        assert_eq!(neighbor_rank(20, 0.1), 3);
        assert_eq!(neighbor_rank(11, 0.1), 2);
        assert_eq!(neighbor_rank(5, 0.1), 1);
        assert_eq!(neighbor_rank(10, 1.0), 11);
    }

    #[test]
    fn provider_is_asked_for_the_computed_rank() {
        let provider = Fixed::metres(&[10.0; 20]);
        let filter = GeolocationFilter::with_neighbors(FilterConfig::default(), provider).unwrap();
        filter.filter(&grid(20), &ReferenceFrame::wgs84()).unwrap();
        assert_eq!(filter.neighbors.rank.get(), 3);
    }

    #[test]
    fn equal_distances_keep_everything() {
        let provider = Fixed::metres(&[42.0; 6]);
        let config = FilterConfig { error_fraction: 0.1, stdev_multiplier: 0.0 };
        let filter = GeolocationFilter::with_neighbors(config, provider).unwrap();
        let outcome = filter.filter(&grid(6), &ReferenceFrame::wgs84()).unwrap();
        assert_eq!(outcome.retained, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn distant_values_are_dropped() {
        let mut distances = vec![10.0; 9];
        distances.push(1000.0);
        let provider = Fixed::metres(&distances);
        let filter = GeolocationFilter::with_neighbors(FilterConfig::default(), provider).unwrap();
        let outcome = filter.filter(&grid(10), &ReferenceFrame::wgs84()).unwrap();
        assert_eq!(outcome.retained, (0..9).collect::<Vec<_>>());
        assert_eq!(outcome.points.len(), 9);
    }

    #[test]
    fn too_few_points() {
        let err = geolocation_filter(&grid(1), 0.1, 2.0, &ReferenceFrame::wgs84()).unwrap_err();
        assert!(matches!(err, Error::StatisticsUndefined { count: 1 }));
        let err = geolocation_filter(&grid(0), 0.1, 2.0, &ReferenceFrame::wgs84()).unwrap_err();
        assert!(matches!(err, Error::StatisticsUndefined { count: 0 }));
    }

    #[test]
    fn rank_must_leave_a_neighbour() {
        // 10 points at fraction 1.0 asks for rank 11.
        let err = geolocation_filter(&grid(10), 1.0, 2.0, &ReferenceFrame::wgs84()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn out_of_range_parameters() {
        for (fraction, multiplier) in [(0.0, 2.0), (1.5, 2.0), (f64::NAN, 2.0), (0.1, -1.0), (0.1, f64::INFINITY)] {
            let err = geolocation_filter(&grid(10), fraction, multiplier, &ReferenceFrame::wgs84()).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "{fraction} {multiplier}");
        }
    }
}
