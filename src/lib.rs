#![doc = "Overlap resolution for polygon pairs and nearest-neighbour outlier filtering for geolocated points"]
mod condition;
mod config;
mod error;
mod filter;
mod geom;
mod overlap;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use config::{FilterConfig, ResolverConfig};

#[doc(inline)]
pub use geom::{GeometryKind, GeometryOps, PlanarOps};

#[doc(inline)]
pub use overlap::{assert_no_overlaps, find_overlaps, OverlapResolver};

#[doc(inline)]
pub use condition::ShapeConditioner;

#[doc(inline)]
pub use filter::{geolocation_filter, neighbor_rank, FilterOutcome, GeoPoints, GeolocationFilter, ReferenceFrame};
