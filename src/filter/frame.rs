use geo::Point;
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::error::{Error, Result};

/// A coordinate reference frame, given by its PROJ.4 definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceFrame {
    definition: String,
}

impl ReferenceFrame {
    /// WGS84 longitude/latitude in degrees (EPSG:4326), the frame distances
    /// are measured in.
    pub fn wgs84() -> Self {
        Self::from_proj_string("+proj=longlat +datum=WGS84 +no_defs +type=crs")
    }

    pub fn from_proj_string(definition: impl Into<String>) -> Self {
        Self { definition: definition.into() }
    }

    /// Frame for a supported EPSG code: 4326, 4269, 3857, WGS84 UTM
    /// (32601–32660 north, 32701–32760 south) and NAD83 UTM (26901–26923).
    pub fn from_epsg(code: u32) -> Result<Self> {
        match code {
            4326 => Ok(Self::wgs84()),
            4269 => Ok(Self::from_proj_string("+proj=longlat +datum=NAD83 +no_defs +type=crs")),
            3857 => Ok(Self::from_proj_string(
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs"
            )),
            32601..=32660 => Ok(Self::utm(code - 32600, false, "WGS84")),
            32701..=32760 => Ok(Self::utm(code - 32700, true, "WGS84")),
            26901..=26923 => Ok(Self::utm(code - 26900, false, "NAD83")),
            _ => Err(Error::InvalidParameter(format!("unsupported EPSG code {code}"))),
        }
    }

    fn utm(zone: u32, south: bool, datum: &str) -> Self {
        let south = if south { " +south" } else { "" };
        Self::from_proj_string(format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs"))
    }

    /// Get the PROJ.4 definition string.
    pub fn definition(&self) -> &str { &self.definition }

    /// Returns true if coordinates in this frame are angular (degrees).
    pub fn is_geographic(&self) -> bool {
        self.definition.split_whitespace()
            .any(|token| matches!(token, "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"))
    }

    fn proj(&self) -> Result<Proj4> {
        Proj4::from_proj_string(&self.definition)
            .map_err(|e| Error::Projection(format!("failed to build PROJ.4 `{}`: {e}", self.definition)))
    }

    /// Reproject `points` from this frame into `target`.
    pub fn transform(&self, points: &[Point<f64>], target: &ReferenceFrame) -> Result<Vec<Point<f64>>> {
        if self == target { return Ok(points.to_vec()) }

        let (from, to) = (self.proj()?, target.proj()?);

        // Map coords → radians in for geographic frames, and back out.
        points.iter()
            .map(|point| {
                let mut coord = if self.is_geographic() {
                    (point.x().to_radians(), point.y().to_radians(), 0.0)
                } else {
                    (point.x(), point.y(), 0.0)
                };
                transform(&from, &to, &mut coord).map_err(|e| Error::Projection(format!(
                    "CRS transform failed for ({}, {}): {e}", point.x(), point.y()
                )))?;

                Ok(if target.is_geographic() {
                    Point::new(coord.0.to_degrees(), coord.1.to_degrees())
                } else {
                    Point::new(coord.0, coord.1)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_4326_is_wgs84() {
        assert_eq!(ReferenceFrame::from_epsg(4326).unwrap(), ReferenceFrame::wgs84());
        assert!(ReferenceFrame::wgs84().is_geographic());
    }

    #[test]
    fn utm_codes_build_utm_definitions() {
        let north = ReferenceFrame::from_epsg(32633).unwrap();
        assert!(north.definition().contains("+zone=33 "));
        assert!(!north.definition().contains("+south"));
        assert!(!north.is_geographic());

        let south = ReferenceFrame::from_epsg(32719).unwrap();
        assert!(south.definition().contains("+zone=19 +south"));

        let nad83 = ReferenceFrame::from_epsg(26918).unwrap();
        assert!(nad83.definition().contains("+datum=NAD83"));
    }

    #[test]
    fn unknown_epsg_code_is_rejected() {
        assert!(matches!(ReferenceFrame::from_epsg(2154), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn identical_frames_are_an_identity() {
        let points = vec![Point::new(1.5, -2.25)];
        let out = ReferenceFrame::wgs84().transform(&points, &ReferenceFrame::wgs84()).unwrap();
        assert_eq!(out, points);
    }

    #[test]
    fn utm_round_trip_recovers_degrees() {
        let utm = ReferenceFrame::from_epsg(32618).unwrap();
        let points = vec![Point::new(-74.0060, 40.7128), Point::new(-75.1652, 39.9526)];

        let projected = ReferenceFrame::wgs84().transform(&points, &utm).unwrap();
        // Metres, not degrees.
        assert!(projected[0].x() > 100_000.0 && projected[0].y() > 4_000_000.0);

        let back = utm.transform(&projected, &ReferenceFrame::wgs84()).unwrap();
        for (p, q) in points.iter().zip(&back) {
            assert!((p.x() - q.x()).abs() < 1e-6);
            assert!((p.y() - q.y()).abs() < 1e-6);
        }
    }

    #[test]
    fn malformed_definition_fails_to_project() {
        let broken = ReferenceFrame::from_proj_string("+proj=nonsense");
        let err = ReferenceFrame::wgs84().transform(&[Point::new(0.0, 0.0)], &broken).unwrap_err();
        assert!(matches!(err, Error::Projection(_)));
    }
}
