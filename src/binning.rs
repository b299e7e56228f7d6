//! Time binning of observations.
//!
//! Observations are grouped into bins of a fixed width in days, either
//! left-aligned (each bin opens at the first observation it contains) or
//! symmetric (bins are the fixed intervals `[k * width, (k + 1) * width)`).
//! Each bin carries its raw magnitudes plus mean and standard error, which
//! is what the mean-curve overlay and the bin ANOVA both consume.

use crate::anova::{one_way_anova, AnovaResult};
use crate::descriptive::DescriptiveStats;
use crate::error::{AnalysisError, Result};
use crate::helpers::require_positive;
use crate::observation::{checked_columns, Observation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How bin boundaries are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinningMode {
    /// Bins open at the first observation not covered by the previous bin.
    LeftAligned,
    /// Bins are the intervals `[k * width, (k + 1) * width)`.
    #[default]
    Symmetric,
}

/// One bin of magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeBin {
    /// Time assigned to the bin (member mean for left-aligned bins,
    /// interval midpoint for symmetric bins)
    pub representative_time: f64,
    /// Mean magnitude of the members
    pub mean_magnitude: f64,
    /// Standard error of the mean magnitude (0 for a single member)
    pub standard_error: f64,
    /// Number of members
    pub sample_count: usize,
    /// Member magnitudes in scan order
    pub magnitudes: Vec<f64>,
}

impl MagnitudeBin {
    fn from_members(representative_time: f64, magnitudes: Vec<f64>) -> Result<Self> {
        let stats = DescriptiveStats::from_values(&magnitudes)?;
        Ok(Self {
            representative_time,
            mean_magnitude: stats.mean,
            standard_error: stats.std_error,
            sample_count: stats.count,
            magnitudes,
        })
    }
}

/// Bins together with the ANOVA across them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningResult {
    pub bins: Vec<MagnitudeBin>,
    pub anova: AnovaResult,
}

impl BinningResult {
    pub fn f_value(&self) -> f64 {
        self.anova.f_value
    }

    pub fn p_value(&self) -> f64 {
        self.anova.p_value
    }

    pub fn within_group_df(&self) -> usize {
        self.anova.within_group_df
    }

    pub fn between_group_df(&self) -> usize {
        self.anova.between_group_df
    }
}

/// Group observations into time bins of `width` days.
///
/// The input need not be sorted. Left-aligned binning scans a time-sorted
/// copy (ties keep input order); symmetric binning is order-independent.
pub fn bin_magnitudes(
    observations: &[Observation],
    width: f64,
    mode: BinningMode,
) -> Result<Vec<MagnitudeBin>> {
    let (times, mags) = checked_columns(observations)?;
    let width = require_positive("width", width)?;

    let bins = match mode {
        BinningMode::LeftAligned => left_aligned_bins(&times, &mags, width)?,
        BinningMode::Symmetric => symmetric_bins(&times, &mags, width)?,
    };

    tracing::debug!(
        observations = observations.len(),
        bins = bins.len(),
        width,
        ?mode,
        "binned magnitudes"
    );

    Ok(bins)
}

/// Bin the observations and run a one-way ANOVA with one group per bin.
///
/// # Example
/// ```rust
/// use varstar_core::binning::{binned_anova, BinningMode};
/// use varstar_core::observation::ObservationSeries;
///
/// let series = ObservationSeries::from_pairs(&[
///     (0.5, 3.1), (2.0, 3.0), (4.0, 3.2),
///     (10.5, 2.8), (12.0, 2.9), (15.0, 2.7),
/// ]);
/// let result = binned_anova(&series, 10.0, BinningMode::Symmetric).unwrap();
/// assert_eq!(result.bins.len(), 2);
/// assert_eq!(result.between_group_df(), 1);
/// assert_eq!(result.within_group_df(), 4);
/// ```
#[tracing::instrument(level = "debug", skip_all, fields(n = observations.len(), width = width))]
pub fn binned_anova(
    observations: &[Observation],
    width: f64,
    mode: BinningMode,
) -> Result<BinningResult> {
    let bins = bin_magnitudes(observations, width, mode)?;
    let groups: Vec<&[f64]> = bins.iter().map(|b| b.magnitudes.as_slice()).collect();
    let anova = one_way_anova(&groups)?;
    Ok(BinningResult { bins, anova })
}

fn left_aligned_bins(times: &[f64], mags: &[f64], width: f64) -> Result<Vec<MagnitudeBin>> {
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));

    let mut bins = Vec::new();
    let mut lower = times[order[0]];
    let mut member_times: Vec<f64> = Vec::new();
    let mut member_mags: Vec<f64> = Vec::new();

    for &i in &order {
        if times[i] >= lower + width {
            bins.push(close_left_bin(&member_times, std::mem::take(&mut member_mags))?);
            member_times.clear();
            lower = times[i];
        }
        member_times.push(times[i]);
        member_mags.push(mags[i]);
    }
    bins.push(close_left_bin(&member_times, member_mags)?);

    Ok(bins)
}

fn close_left_bin(member_times: &[f64], member_mags: Vec<f64>) -> Result<MagnitudeBin> {
    let time = DescriptiveStats::from_values(member_times)?.mean;
    MagnitudeBin::from_members(time, member_mags)
}

fn symmetric_bins(times: &[f64], mags: &[f64], width: f64) -> Result<Vec<MagnitudeBin>> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (&t, &m) in times.iter().zip(mags) {
        let index = (t / width).floor();
        // 2^63 is exact in f64; anything at or past it would saturate the cast
        if !(index.is_finite() && index >= i64::MIN as f64 && index < i64::MAX as f64) {
            return Err(AnalysisError::InvalidParameter {
                name: "width",
                value: width,
            });
        }
        groups.entry(index as i64).or_default().push(m);
    }

    groups
        .into_iter()
        .map(|(index, members)| MagnitudeBin::from_members((index as f64 + 0.5) * width, members))
        .collect()
}
