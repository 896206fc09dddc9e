mod bbox;
mod crossings;
mod dcel;
mod kind;
mod ops;
mod planar;
mod split;

pub(crate) use bbox::{padded_envelope, BoundingBox};
pub use kind::GeometryKind;
pub use ops::GeometryOps;
pub use planar::PlanarOps;
