use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for [`OverlapResolver`](crate::OverlapResolver).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Tolerance used to match crossing points to fragment boundaries and to
    /// merge near-coincident vertices while splitting, as a fraction of the
    /// geometry's bounding-box extent.
    pub snap_tolerance: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { snap_tolerance: 1e-7 }
    }
}

impl ResolverConfig {
    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.snap_tolerance.is_finite() || self.snap_tolerance < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "snap_tolerance must be finite and non-negative, got {}", self.snap_tolerance
            )));
        }
        Ok(())
    }
}

/// Settings for [`GeolocationFilter`](crate::GeolocationFilter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Fraction of the dataset that sets the neighbour rank,
    /// `k = floor(count * error_fraction) + 1`. Must lie in (0, 1].
    pub error_fraction: f64,
    /// Width of the accepted band around the mean, in standard deviations.
    pub stdev_multiplier: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { error_fraction: 0.1, stdev_multiplier: 2.0 }
    }
}

impl FilterConfig {
    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.error_fraction > 0.0 && self.error_fraction <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "error_fraction must lie in (0, 1], got {}", self.error_fraction
            )));
        }
        if !self.stdev_multiplier.is_finite() || self.stdev_multiplier < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "stdev_multiplier must be finite and non-negative, got {}", self.stdev_multiplier
            )));
        }
        Ok(())
    }
}
