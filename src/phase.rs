//! Phase folding for a known period.
//!
//! Each observation gets a standard phase in `[0, 1)` and a previous-cycle
//! phase one lower, so a phase plot can show two cycles side by side.

use crate::error::{AnalysisError, Result};
use crate::helpers::require_positive;
use crate::observation::{checked_columns, Observation};
use serde::{Deserialize, Serialize};

/// How the epoch (phase zero) is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EpochStrategy {
    /// Earliest observation time.
    #[default]
    MinimumTime,
    /// Time of the brightest (smallest magnitude) observation; ties keep the
    /// earliest one in input order.
    BrightestObservation,
    /// A caller-supplied Julian Date.
    Explicit(f64),
}

impl EpochStrategy {
    /// Resolve the epoch for `observations`.
    pub fn epoch(&self, observations: &[Observation]) -> Result<f64> {
        let (times, mags) = checked_columns(observations)?;
        match *self {
            EpochStrategy::MinimumTime => Ok(times.iter().cloned().fold(f64::INFINITY, f64::min)),
            EpochStrategy::BrightestObservation => {
                let mut best = 0;
                for (i, &m) in mags.iter().enumerate() {
                    if m < mags[best] {
                        best = i;
                    }
                }
                Ok(times[best])
            }
            EpochStrategy::Explicit(epoch) if epoch.is_finite() => Ok(epoch),
            EpochStrategy::Explicit(epoch) => Err(AnalysisError::InvalidParameter {
                name: "epoch",
                value: epoch,
            }),
        }
    }
}

/// Phase of `time` in `[0, 1)` for `period` and `epoch`.
pub fn standard_phase(time: f64, period: f64, epoch: f64) -> f64 {
    let cycles = (time - epoch) / period;
    let phase = cycles - cycles.floor();
    // rounding can push a value just below an integer up to 1.0
    if phase >= 1.0 {
        0.0
    } else {
        phase
    }
}

/// One phased observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasedObservation {
    pub time: f64,
    pub magnitude: f64,
    /// In `[0, 1)`
    pub standard_phase: f64,
    /// `standard_phase - 1`, in `[-1, 0)`
    pub previous_cycle_phase: f64,
}

/// Observations folded on one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseFoldedSeries {
    pub period: f64,
    pub epoch: f64,
    /// In input order
    pub points: Vec<PhasedObservation>,
}

impl PhaseFoldedSeries {
    /// Points ordered by standard phase.
    pub fn sorted_by_phase(&self) -> Vec<PhasedObservation> {
        let mut points = self.points.clone();
        points.sort_by(|a, b| a.standard_phase.total_cmp(&b.standard_phase));
        points
    }
}

/// Fold `observations` on `period` with the epoch chosen by `strategy`.
pub fn phase_fold(
    observations: &[Observation],
    period: f64,
    strategy: EpochStrategy,
) -> Result<PhaseFoldedSeries> {
    let period = require_positive("period", period)?;
    let epoch = strategy.epoch(observations)?;

    let points: Vec<PhasedObservation> = observations
        .iter()
        .map(|ob| {
            let phase = standard_phase(ob.time, period, epoch);
            PhasedObservation {
                time: ob.time,
                magnitude: ob.magnitude,
                standard_phase: phase,
                previous_cycle_phase: phase - 1.0,
            }
        })
        .collect();

    tracing::debug!(points = points.len(), period, epoch, ?strategy, "phase folded");

    Ok(PhaseFoldedSeries {
        period,
        epoch,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ObservationSeries;

    #[test]
    fn test_standard_phase() {
        assert!((standard_phase(12.5, 10.0, 0.0) - 0.25).abs() < 1e-12);
        assert_eq!(standard_phase(20.0, 10.0, 0.0), 0.0);
        // before the epoch
        assert!((standard_phase(-2.5, 10.0, 0.0) - 0.75).abs() < 1e-12);
        assert!((standard_phase(2_450_003.0, 2.0, 2_450_000.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_phase_range() {
        for i in 0..500 {
            let t = -37.1 + i as f64 * 0.173;
            let p = standard_phase(t, 0.7, 1.3);
            assert!((0.0..1.0).contains(&p), "{} -> {}", t, p);
        }
    }

    #[test]
    fn test_epoch_strategies() {
        let series = ObservationSeries::from_pairs(&[(5.0, 9.0), (2.0, 9.5), (7.0, 8.1), (9.0, 8.1)]);
        assert_eq!(EpochStrategy::MinimumTime.epoch(&series).unwrap(), 2.0);
        assert_eq!(EpochStrategy::BrightestObservation.epoch(&series).unwrap(), 7.0);
        assert_eq!(EpochStrategy::Explicit(1.5).epoch(&series).unwrap(), 1.5);
        assert!(EpochStrategy::Explicit(f64::NAN).epoch(&series).is_err());
    }

    #[test]
    fn test_phase_fold() {
        let series = ObservationSeries::from_pairs(&[(10.0, 1.0), (13.0, 2.0), (11.0, 3.0)]);
        let folded = phase_fold(&series, 4.0, EpochStrategy::MinimumTime).unwrap();
        assert_eq!(folded.epoch, 10.0);
        let phases: Vec<f64> = folded.points.iter().map(|p| p.standard_phase).collect();
        assert_eq!(phases, vec![0.0, 0.75, 0.25]);
        for p in &folded.points {
            assert_eq!(p.previous_cycle_phase, p.standard_phase - 1.0);
        }
        let sorted: Vec<f64> = folded.sorted_by_phase().iter().map(|p| p.magnitude).collect();
        assert_eq!(sorted, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_validation() {
        let series = ObservationSeries::from_pairs(&[(1.0, 1.0)]);
        assert!(phase_fold(&series, 0.0, EpochStrategy::MinimumTime)
            .unwrap_err()
            .is_validation());
        assert_eq!(
            phase_fold(&[], 1.0, EpochStrategy::MinimumTime).unwrap_err(),
            AnalysisError::EmptyInput
        );
    }
}
