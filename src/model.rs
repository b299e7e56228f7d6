//! Multi-periodic sinusoidal model fit.
//!
//! Fits `c + sum_k (a_k cos(2 pi (t - t0) / p_k) + b_k sin(2 pi (t - t0) / p_k))`
//! to the magnitudes by linear least squares for a fixed set of periods,
//! usually the strongest hits of a DC DFT scan. The origin `t0` is the whole
//! day at or before the middle of the observed span (see [`time_origin`]).
//! Fitted values and residuals keep the observation times as given.

use crate::error::{AnalysisError, Result};
use crate::helpers::min_max;
use crate::observation::{checked_columns, Observation};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Relative tolerance on the diagonal of `R` below which the design matrix
/// is treated as rank deficient.
const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted coefficients for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodFitParameters {
    pub period: f64,
    pub frequency: f64,
    /// `sqrt(cosine_coefficient^2 + sine_coefficient^2)`
    pub amplitude: f64,
    pub cosine_coefficient: f64,
    pub sine_coefficient: f64,
    /// Constant term of the whole model, shared by every period of a fit
    pub constant_coefficient: f64,
    /// `atan2(sine_coefficient, cosine_coefficient)` in radians
    pub phase: f64,
    /// Time at which the phase of every harmonic is zero
    pub time_origin: f64,
}

impl PeriodFitParameters {
    /// Value of this period's harmonic term (without the constant) at `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        let (s, c) = (2.0 * PI * (t - self.time_origin) / self.period).sin_cos();
        self.cosine_coefficient * c + self.sine_coefficient * s
    }
}

/// A time and a magnitude; used for both fitted values and residuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPoint {
    pub time: f64,
    pub magnitude: f64,
}

/// Result of [`multi_periodic_fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPeriodicFit {
    /// One entry per requested period, in request order
    pub parameters: Vec<PeriodFitParameters>,
    /// Model value at each observation time, in input order
    pub fit: Vec<ModelPoint>,
    /// Observed minus model at each observation time, in input order
    pub residuals: Vec<ModelPoint>,
}

impl MultiPeriodicFit {
    /// Constant term of the model.
    pub fn constant(&self) -> f64 {
        self.parameters
            .first()
            .map_or(0.0, |p| p.constant_coefficient)
    }

    /// Time origin of the harmonic terms.
    pub fn time_origin(&self) -> f64 {
        self.parameters.first().map_or(0.0, |p| p.time_origin)
    }

    /// Evaluate the full model at `t`.
    pub fn predict(&self, t: f64) -> f64 {
        self.constant() + self.parameters.iter().map(|p| p.value_at(t)).sum::<f64>()
    }

    /// Model curve sampled at `times`.
    pub fn curve(&self, times: &[f64]) -> Vec<ModelPoint> {
        times
            .iter()
            .map(|&time| ModelPoint {
                time,
                magnitude: self.predict(time),
            })
            .collect()
    }

    /// Root mean square of the residuals.
    pub fn residual_rms(&self) -> f64 {
        if self.residuals.is_empty() {
            return 0.0;
        }
        let ss: f64 = self.residuals.iter().map(|r| r.magnitude * r.magnitude).sum();
        (ss / self.residuals.len() as f64).sqrt()
    }
}

impl fmt::Display for MultiPeriodicFit {
    /// The model as a formula in `t`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constant())?;
        for p in &self.parameters {
            write!(
                f,
                " + {a} * cos(2*pi*(t-{t0})/{p}) + {b} * sin(2*pi*(t-{t0})/{p})",
                a = p.cosine_coefficient,
                b = p.sine_coefficient,
                t0 = p.time_origin,
                p = p.period
            )?;
        }
        Ok(())
    }
}

/// Fit a constant plus one sinusoid per period to `observations`.
///
/// # Errors
/// Validation errors for empty observations, an empty period list or a
/// period that is not finite and positive. [`AnalysisError::InsufficientData`]
/// when there are fewer observations than coefficients and
/// [`AnalysisError::SingularFit`] when the design matrix is rank deficient,
/// for instance because a period is repeated.
///
/// # Example
/// ```rust
/// use varstar_core::model::multi_periodic_fit;
/// use varstar_core::observation::ObservationSeries;
/// use std::f64::consts::PI;
///
/// let pairs: Vec<(f64, f64)> = (0..50)
///     .map(|i| {
///         let t = i as f64 * 0.9;
///         (t, 6.0 + 0.3 * (2.0 * PI * t / 7.0).sin())
///     })
///     .collect();
/// let series = ObservationSeries::from_pairs(&pairs);
///
/// let model = multi_periodic_fit(&series, &[7.0]).unwrap();
/// assert!((model.constant() - 6.0).abs() < 1e-9);
/// assert!((model.parameters[0].amplitude - 0.3).abs() < 1e-9);
/// assert!(model.residual_rms() < 1e-9);
/// ```
#[tracing::instrument(level = "debug", skip_all, fields(n = observations.len(), periods = periods.len()))]
pub fn multi_periodic_fit(observations: &[Observation], periods: &[f64]) -> Result<MultiPeriodicFit> {
    let (times, mags) = checked_columns(observations)?;
    if periods.is_empty() {
        return Err(AnalysisError::NoPeriods);
    }
    if let Some(&bad) = periods.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(AnalysisError::InvalidParameter {
            name: "period",
            value: bad,
        });
    }

    let n = times.len();
    let n_coef = 1 + 2 * periods.len();
    if n < n_coef {
        return Err(AnalysisError::InsufficientData {
            needed: n_coef,
            available: n,
        });
    }

    let origin = time_origin(&times);
    let design = build_design_matrix(&times, periods, origin);
    let y = DVector::from_column_slice(&mags);
    let coef = solve_least_squares(design.clone(), &y)?;

    let fitted = &design * &coef;
    let constant = coef[0];
    let parameters: Vec<PeriodFitParameters> = periods
        .iter()
        .enumerate()
        .map(|(k, &period)| {
            let a = coef[1 + 2 * k];
            let b = coef[2 + 2 * k];
            PeriodFitParameters {
                period,
                frequency: 1.0 / period,
                amplitude: a.hypot(b),
                cosine_coefficient: a,
                sine_coefficient: b,
                constant_coefficient: constant,
                phase: b.atan2(a),
                time_origin: origin,
            }
        })
        .collect();

    let fit: Vec<ModelPoint> = times
        .iter()
        .zip(fitted.iter())
        .map(|(&time, &magnitude)| ModelPoint { time, magnitude })
        .collect();
    let residuals: Vec<ModelPoint> = fit
        .iter()
        .zip(&mags)
        .map(|(p, &observed)| ModelPoint {
            time: p.time,
            magnitude: observed - p.magnitude,
        })
        .collect();

    let model = MultiPeriodicFit {
        parameters,
        fit,
        residuals,
    };
    tracing::debug!(
        constant,
        origin,
        residual_rms = model.residual_rms(),
        "multi-periodic fit complete"
    );

    Ok(model)
}

/// Whole day at or before the midpoint of the time span.
///
/// For the T Cas light curve (JD 47003.5684 to 50357.0029) this is 48680.
pub fn time_origin(times: &[f64]) -> f64 {
    min_max(times).map_or(0.0, |(lo, hi)| (0.5 * (lo + hi)).floor())
}

/// Columns `[1, cos(2 pi (t-t0)/p1), sin(2 pi (t-t0)/p1), cos(2 pi (t-t0)/p2), ...]`.
fn build_design_matrix(times: &[f64], periods: &[f64], origin: f64) -> DMatrix<f64> {
    let n_coef = 1 + 2 * periods.len();
    DMatrix::from_fn(times.len(), n_coef, |i, j| {
        if j == 0 {
            return 1.0;
        }
        let period = periods[(j - 1) / 2];
        let arg = 2.0 * PI * (times[i] - origin) / period;
        if j % 2 == 1 {
            arg.cos()
        } else {
            arg.sin()
        }
    })
}

/// Least-squares solution of `design * x = y` via Householder QR.
fn solve_least_squares(design: DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    let qr = design.qr();
    let r = qr.r();

    let diag: Vec<f64> = (0..r.ncols()).map(|i| r[(i, i)].abs()).collect();
    let max_diag = diag.iter().cloned().fold(0.0, f64::max);
    if let Some(column) = diag.iter().position(|&d| d <= RANK_TOLERANCE * max_diag) {
        return Err(AnalysisError::SingularFit { column });
    }

    let qty = qr.q().transpose() * y;
    r.solve_upper_triangular(&qty)
        .ok_or(AnalysisError::SingularFit { column: 0 })
}
