//! Observation model consumed by every analysis.
//!
//! An [`Observation`] is one photometric measurement: a Julian Date, a
//! magnitude, an optional uncertainty and an opaque band tag. Readers for the
//! various archive formats live outside this crate; they hand over a
//! sequence of these values, optionally already stripped of observations
//! flagged as discrepant.
//!
//! [`ObservationSeries`] owns such a sequence in caller order and
//! dereferences to `&[Observation]`, so it can be passed straight to the
//! analysis functions.

use crate::error::{AnalysisError, Result};
use crate::helpers::require_finite;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A single time-stamped magnitude measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Julian Date of the measurement
    pub time: f64,
    /// Magnitude (smaller is brighter)
    pub magnitude: f64,
    /// Magnitude uncertainty, 0 when unknown
    #[serde(default)]
    pub uncertainty: f64,
    /// Photometric band or series tag
    #[serde(default)]
    pub band: Option<String>,
    /// Excluded from statistics when set
    #[serde(default)]
    pub discrepant: bool,
}

impl Observation {
    pub fn new(time: f64, magnitude: f64) -> Self {
        Self {
            time,
            magnitude,
            uncertainty: 0.0,
            band: None,
            discrepant: false,
        }
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = uncertainty;
        self
    }

    pub fn with_band(mut self, band: impl Into<String>) -> Self {
        self.band = Some(band.into());
        self
    }

    pub fn flagged_discrepant(mut self) -> Self {
        self.discrepant = true;
        self
    }
}

/// An ordered, owned sequence of observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    observations: Vec<Observation>,
}

impl ObservationSeries {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Build from `(time, magnitude)` pairs with zero uncertainty.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            observations: pairs
                .iter()
                .map(|&(t, m)| Observation::new(t, m))
                .collect(),
        }
    }

    /// Build from parallel time and magnitude arrays.
    ///
    /// Fails if the lengths differ or any value is not finite.
    pub fn from_arrays(times: &[f64], magnitudes: &[f64]) -> Result<Self> {
        if times.len() != magnitudes.len() {
            return Err(AnalysisError::LengthMismatch {
                left: times.len(),
                right: magnitudes.len(),
            });
        }
        require_finite("time", times)?;
        require_finite("magnitude", magnitudes)?;

        Ok(Self {
            observations: times
                .iter()
                .zip(magnitudes)
                .map(|(&t, &m)| Observation::new(t, m))
                .collect(),
        })
    }

    /// A new series holding only observations accepted by `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Observation) -> bool,
    {
        Self {
            observations: self
                .observations
                .iter()
                .filter(|ob| keep(ob))
                .cloned()
                .collect(),
        }
    }

    /// A new series with discrepant observations removed.
    pub fn without_discrepant(&self) -> Self {
        self.filtered(|ob| !ob.discrepant)
    }

    /// A new series restricted to one band.
    pub fn in_band(&self, band: &str) -> Self {
        self.filtered(|ob| ob.band.as_deref() == Some(band))
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn times(&self) -> Vec<f64> {
        times(&self.observations)
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        magnitudes(&self.observations)
    }

    /// `(earliest, latest)` time, or `None` when empty.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        crate::helpers::min_max(&self.times())
    }

    /// Latest minus earliest time; 0 for an empty series.
    pub fn time_span(&self) -> f64 {
        self.time_range().map(|(lo, hi)| hi - lo).unwrap_or(0.0)
    }

    pub fn into_inner(self) -> Vec<Observation> {
        self.observations
    }
}

impl Deref for ObservationSeries {
    type Target = [Observation];

    fn deref(&self) -> &[Observation] {
        &self.observations
    }
}

impl From<Vec<Observation>> for ObservationSeries {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

impl FromIterator<Observation> for ObservationSeries {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub(crate) fn times(observations: &[Observation]) -> Vec<f64> {
    observations.iter().map(|ob| ob.time).collect()
}

pub(crate) fn magnitudes(observations: &[Observation]) -> Vec<f64> {
    observations.iter().map(|ob| ob.magnitude).collect()
}

/// Split observations into time and magnitude vectors after checking that
/// the input is non-empty and finite.
pub(crate) fn checked_columns(observations: &[Observation]) -> Result<(Vec<f64>, Vec<f64>)> {
    if observations.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let t = times(observations);
    let y = magnitudes(observations);
    require_finite("time", &t)?;
    require_finite("magnitude", &y)?;
    Ok((t, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObservationSeries {
        ObservationSeries::new(vec![
            Observation::new(2450001.5, 10.2).with_band("V"),
            Observation::new(2450000.5, 10.4).with_band("Vis"),
            Observation::new(2450003.0, 9.9)
                .with_band("V")
                .flagged_discrepant(),
            Observation::new(2450002.25, 10.0).with_uncertainty(0.02),
        ])
    }

    #[test]
    fn test_from_pairs_defaults() {
        let series = ObservationSeries::from_pairs(&[(1.0, 5.0), (2.0, 6.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].uncertainty, 0.0);
        assert!(series[1].band.is_none());
        assert!(!series[1].discrepant);
    }

    #[test]
    fn test_from_arrays_length_mismatch() {
        let err = ObservationSeries::from_arrays(&[1.0, 2.0], &[3.0]).unwrap_err();
        assert_eq!(err, AnalysisError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn test_from_arrays_rejects_nan() {
        let err = ObservationSeries::from_arrays(&[1.0, f64::NAN], &[3.0, 4.0]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_order_is_preserved() {
        let series = sample();
        assert_eq!(series.times(), vec![2450001.5, 2450000.5, 2450003.0, 2450002.25]);
    }

    #[test]
    fn test_without_discrepant() {
        let series = sample().without_discrepant();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|ob| !ob.discrepant));
    }

    #[test]
    fn test_in_band() {
        let v = sample().in_band("V");
        assert_eq!(v.len(), 2);
        assert_eq!(v.magnitudes(), vec![10.2, 9.9]);
    }

    #[test]
    fn test_time_span() {
        let series = sample();
        assert_eq!(series.time_range(), Some((2450000.5, 2450003.0)));
        assert!((series.time_span() - 2.5).abs() < 1e-9);
        assert_eq!(ObservationSeries::default().time_span(), 0.0);
    }

    #[test]
    fn test_checked_columns_empty() {
        assert_eq!(checked_columns(&[]).unwrap_err(), AnalysisError::EmptyInput);
    }

    #[test]
    fn test_serde_defaults() {
        let ob: Observation = serde_json::from_str(r#"{"time": 1.5, "magnitude": 8.25}"#).unwrap();
        assert_eq!(ob, Observation::new(1.5, 8.25));
    }
}
