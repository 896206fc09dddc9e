/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two `[lon, lat]` points (radians), as a
/// central angle in radians.
pub fn haversine(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dlon = b[0] - a[0];
    let dlat = b[1] - a[1];
    let h = (dlat / 2.0).sin().powi(2) + a[1].cos() * b[1].cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Map a `[lon, lat]` point (radians) onto the unit sphere.
#[inline]
pub(crate) fn to_unit_vector(p: [f64; 2]) -> [f64; 3] {
    let (lon, lat) = (p[0], p[1]);
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Central angle subtended by a chord of the unit sphere.
#[inline]
pub(crate) fn chord_to_angle(chord: f64) -> f64 {
    2.0 * (chord / 2.0).min(1.0).asin()
}

#[inline]
pub(crate) fn chord(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}
