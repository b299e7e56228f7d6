//! One-way analysis of variance.
//!
//! Tests whether the means of several groups (typically the time bins of a
//! light curve) differ by more than the scatter inside the groups explains.

use crate::error::{AnalysisError, Result};
use crate::helpers::{require_finite, sum_sq_dev};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Outcome of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResult {
    /// F statistic, `(SS_between / df_between) / (SS_within / df_within)`
    pub f_value: f64,
    /// Probability of an F at least this large under equal means
    pub p_value: f64,
    /// `k - 1` for `k` non-empty groups
    pub between_group_df: usize,
    /// `N - k` for `N` values in `k` non-empty groups
    pub within_group_df: usize,
    /// Between-group sum of squares
    pub ss_between: f64,
    /// Within-group sum of squares
    pub ss_within: f64,
}

impl AnovaResult {
    /// Whether the equal-means hypothesis is rejected at level `alpha`.
    pub fn rejects_null(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// One-way ANOVA over groups of values.
///
/// Empty groups are skipped. At least two non-empty groups and more values
/// than groups are required, and the within-group scatter must be non-zero.
/// A NaN or infinite value is a [`AnalysisError::NonFiniteValue`] whose index
/// counts within its group.
///
/// # Example
/// ```rust
/// use varstar_core::anova::one_way_anova;
///
/// let groups = vec![vec![3.1, 3.0, 3.2], vec![2.8, 2.9, 2.7], vec![3.0, 3.1, 3.0]];
/// let result = one_way_anova(&groups).unwrap();
/// assert_eq!(result.between_group_df, 2);
/// assert_eq!(result.within_group_df, 6);
/// assert!(result.f_value > 1.0);
/// ```
pub fn one_way_anova<G: AsRef<[f64]>>(groups: &[G]) -> Result<AnovaResult> {
    if groups.iter().all(|g| g.as_ref().is_empty()) {
        return Err(AnalysisError::EmptyInput);
    }
    for g in groups {
        require_finite("value", g.as_ref())?;
    }

    let non_empty: Vec<&[f64]> = groups
        .iter()
        .map(|g| g.as_ref())
        .filter(|g| !g.is_empty())
        .collect();
    let k = non_empty.len();
    if k < 2 {
        return Err(AnalysisError::InsufficientGroups { found: k });
    }

    let n_total: usize = non_empty.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return Err(AnalysisError::InsufficientData {
            needed: k,
            available: n_total,
        });
    }

    let grand_mean = non_empty.iter().flat_map(|g| g.iter()).sum::<f64>() / n_total as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in &non_empty {
        let group_mean = g.iter().sum::<f64>() / g.len() as f64;
        let d = group_mean - grand_mean;
        ss_between += g.len() as f64 * d * d;
        ss_within += sum_sq_dev(g, group_mean);
    }

    if !ss_within.is_finite() || ss_within <= 0.0 {
        return Err(AnalysisError::ZeroVariance("within-group scatter"));
    }

    let between_group_df = k - 1;
    let within_group_df = n_total - k;
    let f_value = (ss_between / between_group_df as f64) / (ss_within / within_group_df as f64);

    let dist = FisherSnedecor::new(between_group_df as f64, within_group_df as f64)
        .map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    let p_value = dist.sf(f_value);

    tracing::debug!(
        groups = k,
        values = n_total,
        f_value,
        p_value,
        "one-way ANOVA"
    );

    Ok(AnovaResult {
        f_value,
        p_value,
        between_group_df,
        within_group_df,
        ss_between,
        ss_within,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textbook_example() {
        // Group means 5, 9, 10 around a grand mean of 8
        let groups = vec![
            vec![4.0, 5.0, 6.0, 5.0],
            vec![8.0, 9.0, 11.0, 8.0],
            vec![10.0, 12.0, 9.0, 9.0],
        ];
        let result = one_way_anova(&groups).unwrap();
        assert_eq!(result.between_group_df, 2);
        assert_eq!(result.within_group_df, 9);
        assert!((result.ss_between - 56.0).abs() < 1e-9, "{}", result.ss_between);
        assert!((result.ss_within - 14.0).abs() < 1e-9, "{}", result.ss_within);
        // F = (56/2) / (14/9) = 18
        assert!((result.f_value - 18.0).abs() < 1e-9);
        assert!(result.p_value > 0.0 && result.p_value < 0.01);
        assert!(result.rejects_null(0.05));
    }

    #[test]
    fn test_identical_means_give_f_zero() {
        let groups = vec![vec![1.0, 3.0], vec![2.0, 2.5, 1.5]];
        let result = one_way_anova(&groups).unwrap();
        assert!(result.f_value.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_groups_skipped() {
        let groups: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![], vec![3.0, 5.0]];
        let result = one_way_anova(&groups).unwrap();
        assert_eq!(result.between_group_df, 1);
        assert_eq!(result.within_group_df, 2);
    }

    #[test]
    fn test_single_sample_groups_add_no_within_scatter() {
        let with = one_way_anova(&[vec![1.0, 2.0], vec![4.0, 6.0], vec![10.0]]).unwrap();
        assert!((with.ss_within - (0.5 + 2.0)).abs() < 1e-12);
        assert_eq!(with.within_group_df, 2);
        assert_eq!(with.between_group_df, 2);
    }

    #[test]
    fn test_no_input_is_validation_error() {
        let groups: Vec<Vec<f64>> = Vec::new();
        assert_eq!(one_way_anova(&groups).unwrap_err(), AnalysisError::EmptyInput);
    }

    #[test]
    fn test_one_group_is_computation_error() {
        let err = one_way_anova(&[vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert_eq!(err, AnalysisError::InsufficientGroups { found: 1 });
        assert!(!err.is_validation());
    }

    #[test]
    fn test_no_within_df() {
        let err = one_way_anova(&[vec![1.0], vec![2.0]]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let err = one_way_anova(&[vec![1.0, 2.0], vec![3.0, f64::NAN, 4.0]]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NonFiniteValue {
                field: "value",
                index: 1
            }
        );
        assert!(err.is_validation());

        let err = one_way_anova(&[vec![f64::INFINITY, 1.0], vec![2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, AnalysisError::NonFiniteValue { index: 0, .. }));
    }

    #[test]
    fn test_zero_within_scatter() {
        let err = one_way_anova(&[vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap_err();
        assert!(matches!(err, AnalysisError::ZeroVariance(_)));
    }
}
