use thiserror::Error;

/// Errors surfaced by overlap resolution and geolocation filtering.
///
/// Every operation here is a deterministic function of its input, so none of
/// these are retried; they indicate bad input or bad parameters.
#[derive(Debug, Error)]
pub enum Error {
    /// An input geometry could not be processed (non-finite coordinates,
    /// empty region without a centroid, ...).
    #[error("geometry operation failed: {0}")]
    Geometry(String),

    /// A parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Mean and standard deviation need at least two samples.
    #[error("statistics are undefined for {count} point(s); at least 2 are required")]
    StatisticsUndefined { count: usize },

    /// Two shapes in a collection overlap in area.
    #[error("overlapping geometries found: {first} and {second}")]
    Overlap { first: usize, second: usize },

    /// A PROJ definition could not be built or a transform failed.
    #[error("reprojection failed: {0}")]
    Projection(String),

    #[error(transparent)]
    Neighbors(#[from] geoknn::KnnError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
