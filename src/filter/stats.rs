use statrs::statistics::Statistics;

use crate::error::{Error, Result};

/// Mean and population standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Summary {
    pub(crate) mean: f64,
    pub(crate) stdev: f64,
}

impl Summary {
    pub(crate) fn of(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(Error::StatisticsUndefined { count: values.len() });
        }
        // Running sums can drift an ulp off a constant sample.
        if values.iter().all(|&v| v == values[0]) {
            return Ok(Self { mean: values[0], stdev: 0.0 });
        }
        Ok(Self {
            mean: values.iter().mean(),
            stdev: values.iter().population_std_dev(),
        })
    }

    /// The inclusive band `[mean − m·stdev, mean + m·stdev]`.
    pub(crate) fn band(&self, multiplier: f64) -> (f64, f64) {
        let half_width = multiplier * self.stdev;
        (self.mean - half_width, self.mean + half_width)
    }

    /// Returns true if `value` lies in [`band`](Self::band), bounds included.
    pub(crate) fn contains(&self, multiplier: f64, value: f64) -> bool {
        let (lower, upper) = self.band(multiplier);
        lower <= value && value <= upper
    }
}
