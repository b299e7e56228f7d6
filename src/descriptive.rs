//! Descriptive statistics over magnitudes.

use crate::error::{AnalysisError, Result};
use crate::helpers::{mean, min_max, require_finite, sum_sq_dev};
use crate::observation::Observation;
use serde::{Deserialize, Serialize};

/// Summary statistics for a set of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), 0 for a single value
    pub std_dev: f64,
    /// Standard error of the mean, `std_dev / sqrt(count)`
    pub std_error: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl DescriptiveStats {
    /// Compute statistics for a non-empty slice of finite values.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let mean = mean(values).ok_or(AnalysisError::EmptyInput)?;
        require_finite("value", values)?;

        let count = values.len();
        let std_dev = if count > 1 {
            (sum_sq_dev(values, mean) / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        // min_max cannot fail here: the slice is non-empty
        let (min, max) = min_max(values).unwrap_or((mean, mean));

        Ok(Self {
            count,
            mean,
            std_dev,
            std_error: std_dev / (count as f64).sqrt(),
            min,
            max,
        })
    }

    /// Statistics of the magnitudes of `observations[from..=to]`.
    pub fn magnitudes_in_range(observations: &[Observation], from: usize, to: usize) -> Result<Self> {
        if observations.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        if from > to || to >= observations.len() {
            return Err(AnalysisError::InvalidRange {
                low: from as f64,
                high: to as f64,
            });
        }
        let mags: Vec<f64> = observations[from..=to].iter().map(|ob| ob.magnitude).collect();
        Self::from_values(&mags)
    }

    /// Statistics of the times of `observations[from..=to]`.
    pub fn times_in_range(observations: &[Observation], from: usize, to: usize) -> Result<Self> {
        if observations.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        if from > to || to >= observations.len() {
            return Err(AnalysisError::InvalidRange {
                low: from as f64,
                high: to as f64,
            });
        }
        let times: Vec<f64> = observations[from..=to].iter().map(|ob| ob.time).collect();
        Self::from_values(&times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::NUMERICAL_EPS;

    #[test]
    fn test_known_values() {
        // mean 5, sample variance 32/7
        let stats = DescriptiveStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < NUMERICAL_EPS);
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < NUMERICAL_EPS);
        assert!((stats.std_error - stats.std_dev / 8.0f64.sqrt()).abs() < NUMERICAL_EPS);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_single_value_has_zero_spread() {
        let stats = DescriptiveStats::from_values(&[3.3]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.std_error, 0.0);
    }

    #[test]
    fn test_empty_is_validation_error() {
        let err = DescriptiveStats::from_values(&[]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_magnitudes_in_range() {
        let obs: Vec<Observation> = (0..6).map(|i| Observation::new(i as f64, i as f64 * 2.0)).collect();
        let stats = DescriptiveStats::magnitudes_in_range(&obs, 1, 3).unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 4.0).abs() < NUMERICAL_EPS);

        let times = DescriptiveStats::times_in_range(&obs, 4, 5).unwrap();
        assert!((times.mean - 4.5).abs() < NUMERICAL_EPS);
    }

    #[test]
    fn test_range_out_of_bounds() {
        let obs = vec![Observation::new(0.0, 1.0)];
        assert!(DescriptiveStats::magnitudes_in_range(&obs, 0, 1).is_err());
        assert!(DescriptiveStats::magnitudes_in_range(&obs, 1, 0).is_err());
    }
}
