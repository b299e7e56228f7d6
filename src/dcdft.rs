//! Date-Compensated Discrete Fourier Transform (DC DFT).
//!
//! For unevenly sampled light curves a plain DFT leaks power between the
//! constant term and the sinusoid because `cos` and `sin` are not orthogonal
//! over the actual sample times. The DC DFT (Ferraz-Mello 1981) fixes this by
//! orthogonalising `{1, cos wt, sin wt}` over the observed times at every
//! trial frequency, then measuring how much of the magnitude variance the
//! fitted sinusoid explains.
//!
//! The scan evaluates every frequency of a grid independently, which is what
//! makes it embarrassingly parallel; see [`crate::parallel`].

use crate::error::{AnalysisError, Result};
use crate::helpers::{min_max, require_positive, NUMERICAL_EPS};
use crate::iter_maybe_parallel;
use crate::observation::{checked_columns, Observation};
use crate::spectrum::{find_top_hits, PeriodAnalysisDatum, PeriodAnalysisSeries};
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Minimum number of observations for a scan.
pub const MIN_OBSERVATIONS: usize = 4;

/// Default cap on the number of grid points.
pub const DEFAULT_MAX_FREQUENCIES: usize = 1_000_000;

/// Default cap on the number of reported top hits.
pub const DEFAULT_MAX_TOP_HITS: usize = 100;

/// Relative slack on the upper grid bound, so that `low + k * resolution`
/// landing a rounding error above `high` is still included.
const GRID_SLACK: f64 = 1e-9;

/// Which grid to scan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScanRange {
    /// Derived from the data: from one twentieth of a cycle over the time
    /// span up to the mean-rate pseudo-Nyquist frequency.
    ///
    /// With span `T` and `n` observations: `resolution = 0.05 / T`,
    /// `low = resolution`, `high = 0.5 (n - 1) / T`, giving `10 (n - 1)`
    /// frequencies.
    #[default]
    Standard,
    /// Frequencies `low, low + resolution, ...` up to `high` (cycles/day).
    Frequency { low: f64, high: f64, resolution: f64 },
    /// Periods `low, low + resolution, ...` up to `high` (days).
    Period { low: f64, high: f64, resolution: f64 },
}

/// Parameters for [`dcdft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcDftParams {
    pub range: ScanRange,
    /// Maximum number of top hits to report
    pub max_top_hits: usize,
    /// Minimum frequency distance between reported hits (0 disables)
    pub min_hit_separation: f64,
    /// Maximum number of grid points
    pub max_frequencies: usize,
}

impl Default for DcDftParams {
    fn default() -> Self {
        Self {
            range: ScanRange::Standard,
            max_top_hits: DEFAULT_MAX_TOP_HITS,
            min_hit_separation: 0.0,
            max_frequencies: DEFAULT_MAX_FREQUENCIES,
        }
    }
}

impl DcDftParams {
    /// Scan an explicit frequency range.
    pub fn frequency_range(low: f64, high: f64, resolution: f64) -> Self {
        Self {
            range: ScanRange::Frequency {
                low,
                high,
                resolution,
            },
            ..Self::default()
        }
    }

    /// Scan an explicit period range.
    pub fn period_range(low: f64, high: f64, resolution: f64) -> Self {
        Self {
            range: ScanRange::Period {
                low,
                high,
                resolution,
            },
            ..Self::default()
        }
    }

    pub fn with_min_hit_separation(mut self, separation: f64) -> Self {
        self.min_hit_separation = separation;
        self
    }

    pub fn with_max_top_hits(mut self, max_top_hits: usize) -> Self {
        self.max_top_hits = max_top_hits;
        self
    }
}

/// Result of a DC DFT scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcDftResult {
    /// Power and semi-amplitude at every grid point, in grid order
    pub series: PeriodAnalysisSeries,
    /// Local power maxima, strongest first
    pub top_hits: Vec<PeriodAnalysisDatum>,
    /// Smallest frequency scanned
    pub low_frequency: f64,
    /// Largest frequency scanned
    pub high_frequency: f64,
    /// Grid step, in days for period scans and cycles/day otherwise
    pub resolution: f64,
}

impl DcDftResult {
    /// Periods of the `k` strongest hits.
    pub fn top_periods(&self, k: usize) -> Vec<f64> {
        self.top_hits.iter().take(k).map(|h| h.period).collect()
    }

    /// The strongest hit, if any.
    pub fn best(&self) -> Option<&PeriodAnalysisDatum> {
        self.top_hits.first()
    }
}

/// Run a DC DFT scan over `observations`.
///
/// Magnitudes are mean-subtracted and times are taken relative to the
/// earliest observation. At each grid frequency the power is the explained
/// sum of squares of the best-fitting sinusoid scaled by `n - 1` over the
/// total sum of squares, so a perfect sinusoid has power `n - 1`.
///
/// # Errors
/// Validation errors for fewer than four observations, non-finite input,
/// a zero time span with the standard range, an invalid explicit range or
/// an oversized grid. [`AnalysisError::ZeroVariance`] when every magnitude
/// is identical.
///
/// # Example
/// ```rust
/// use varstar_core::dcdft::{dcdft, DcDftParams};
/// use varstar_core::observation::ObservationSeries;
/// use std::f64::consts::PI;
///
/// let period = 5.0;
/// let pairs: Vec<(f64, f64)> = (0..120)
///     .map(|i| {
///         let t = i as f64 * 0.73 + 0.2 * (i as f64).sin();
///         (t, 8.0 + 0.4 * (2.0 * PI * t / period).cos())
///     })
///     .collect();
/// let series = ObservationSeries::from_pairs(&pairs);
///
/// let result = dcdft(&series, &DcDftParams::frequency_range(0.05, 0.5, 0.001)).unwrap();
/// let best = result.best().unwrap();
/// assert!((best.period - period).abs() < 0.1);
/// ```
#[tracing::instrument(level = "debug", skip_all, fields(n = observations.len()))]
pub fn dcdft(observations: &[Observation], params: &DcDftParams) -> Result<DcDftResult> {
    let (times, mags) = checked_columns(observations)?;
    let n = times.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalysisError::TooFewObservations {
            needed: MIN_OBSERVATIONS,
            available: n,
        });
    }
    if !params.min_hit_separation.is_finite() || params.min_hit_separation < 0.0 {
        return Err(AnalysisError::InvalidParameter {
            name: "min_hit_separation",
            value: params.min_hit_separation,
        });
    }

    let (t_min, t_max) = min_max(&times).ok_or(AnalysisError::EmptyInput)?;
    let grid = ScanGrid::build(&params.range, t_max - t_min, n, params.max_frequencies)?;

    let mean_mag = mags.iter().sum::<f64>() / n as f64;
    let y: Vec<f64> = mags.iter().map(|&m| m - mean_mag).collect();
    let sum_y2: f64 = y.iter().map(|v| v * v).sum();
    if sum_y2 <= 0.0 {
        return Err(AnalysisError::ZeroVariance("magnitudes"));
    }
    let t: Vec<f64> = times.iter().map(|&ti| ti - t_min).collect();

    tracing::debug!(
        observations = n,
        points = grid.frequencies.len(),
        low = grid.low_frequency,
        high = grid.high_frequency,
        resolution = grid.resolution,
        "starting DC DFT scan"
    );

    let rows: Vec<(f64, f64)> = iter_maybe_parallel!(0..grid.frequencies.len())
        .map(|k| dcdft_single_freq(&t, &y, sum_y2, grid.frequencies[k]))
        .collect();

    let mut series = PeriodAnalysisSeries::with_capacity(rows.len());
    for (&frequency, &(power, semi_amplitude)) in grid.frequencies.iter().zip(&rows) {
        series.push(PeriodAnalysisDatum {
            frequency,
            period: 1.0 / frequency,
            power,
            semi_amplitude,
        });
    }

    let top_hits = find_top_hits(&series, params.max_top_hits, params.min_hit_separation);

    if let Some(best) = top_hits.first() {
        tracing::debug!(
            hits = top_hits.len(),
            period = best.period,
            power = best.power,
            semi_amplitude = best.semi_amplitude,
            "DC DFT scan complete"
        );
    } else {
        tracing::debug!("DC DFT scan complete without local maxima");
    }

    Ok(DcDftResult {
        series,
        top_hits,
        low_frequency: grid.low_frequency,
        high_frequency: grid.high_frequency,
        resolution: grid.resolution,
    })
}

/// Power and semi-amplitude at one frequency.
///
/// `t` are times relative to the earliest observation and `y` are
/// mean-subtracted magnitudes with `sum_y2 = sum(y^2) > 0`.
fn dcdft_single_freq(t: &[f64], y: &[f64], sum_y2: f64, frequency: f64) -> (f64, f64) {
    let n = t.len() as f64;
    let omega = 2.0 * PI * frequency;

    let mut sum_c = 0.0;
    let mut sum_s = 0.0;
    let mut sum_cc = 0.0;
    let mut sum_ss = 0.0;
    let mut sum_sc = 0.0;
    let mut sum_yc = 0.0;
    let mut sum_ys = 0.0;
    for (&ti, &yi) in t.iter().zip(y) {
        let (s, c) = (omega * ti).sin_cos();
        sum_c += c;
        sum_s += s;
        sum_cc += c * c;
        sum_ss += s * s;
        sum_sc += s * c;
        sum_yc += yi * c;
        sum_ys += yi * s;
    }

    // g1 = cos - mean(cos), orthogonal to the constant
    let cos_mean = sum_c / n;
    let sin_mean = sum_s / n;
    let norm1 = sum_cc - n * cos_mean * cos_mean;
    if norm1 <= NUMERICAL_EPS * n {
        return (0.0, 0.0);
    }

    // g2 = sin - mean(sin) - (<sin, g1> / |g1|^2) g1
    let sin_g1 = sum_sc - n * sin_mean * cos_mean;
    let norm2 = (sum_ss - n * sin_mean * sin_mean) - sin_g1 * sin_g1 / norm1;
    if norm2 <= NUMERICAL_EPS * n {
        return (0.0, 0.0);
    }

    // y has zero mean, so <y, g1> = sum(y cos)
    let proj1 = sum_yc;
    let proj2 = sum_ys - (sin_g1 / norm1) * sum_yc;

    let explained = proj1 * proj1 / norm1 + proj2 * proj2 / norm2;
    let power = (n - 1.0) * explained / sum_y2;

    let sin_coef = proj2 / norm2;
    let cos_coef = proj1 / norm1 - sin_coef * sin_g1 / norm1;
    let semi_amplitude = (cos_coef * cos_coef + sin_coef * sin_coef).sqrt();

    (power, semi_amplitude)
}

/// Frequencies to evaluate plus the effective scan parameters.
#[derive(Debug)]
struct ScanGrid {
    frequencies: Vec<f64>,
    low_frequency: f64,
    high_frequency: f64,
    resolution: f64,
}

impl ScanGrid {
    fn build(range: &ScanRange, time_span: f64, n: usize, limit: usize) -> Result<Self> {
        match *range {
            ScanRange::Standard => {
                if time_span <= 0.0 {
                    return Err(AnalysisError::InvalidParameter {
                        name: "time span",
                        value: time_span,
                    });
                }
                let resolution = 0.05 / time_span;
                let high = 0.5 * (n - 1) as f64 / time_span;
                Self::from_frequencies(arithmetic_grid(resolution, high, resolution, limit)?, resolution)
            }
            ScanRange::Frequency {
                low,
                high,
                resolution,
            } => {
                check_range(low, high, resolution)?;
                Self::from_frequencies(arithmetic_grid(low, high, resolution, limit)?, resolution)
            }
            ScanRange::Period {
                low,
                high,
                resolution,
            } => {
                check_range(low, high, resolution)?;
                let frequencies = arithmetic_grid(low, high, resolution, limit)?
                    .into_iter()
                    .map(|p| 1.0 / p)
                    .collect();
                Self::from_frequencies(frequencies, resolution)
            }
        }
    }

    fn from_frequencies(frequencies: Vec<f64>, resolution: f64) -> Result<Self> {
        let (low_frequency, high_frequency) =
            min_max(&frequencies).ok_or(AnalysisError::EmptyInput)?;
        Ok(Self {
            frequencies,
            low_frequency,
            high_frequency,
            resolution,
        })
    }
}

fn check_range(low: f64, high: f64, resolution: f64) -> Result<()> {
    let low = require_positive("low", low)?;
    if !high.is_finite() || low >= high {
        return Err(AnalysisError::InvalidRange { low, high });
    }
    require_positive("resolution", resolution)?;
    Ok(())
}

/// `low + i * step` for every value not above `high` (with slack).
fn arithmetic_grid(low: f64, high: f64, step: f64, limit: usize) -> Result<Vec<f64>> {
    let steps = ((high * (1.0 + GRID_SLACK) - low) / step).floor();
    if steps >= limit as f64 {
        // float-to-int casts saturate
        return Err(AnalysisError::GridTooLarge {
            points: (steps as usize).saturating_add(1),
            limit,
        });
    }
    let points = steps as usize + 1;
    Ok((0..points).map(|i| low + i as f64 * step).collect())
}
