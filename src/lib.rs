//! # varstar-core
//!
//! Numerical core for variable star light curve analysis.
//!
//! This crate provides pure Rust implementations of:
//! - Period search with the Date-Compensated DFT (power, semi-amplitude and
//!   ranked top hits over a frequency or period grid)
//! - Multi-periodic sinusoidal model fits with fitted values and residuals
//! - Time binning (left-aligned and symmetric) with per-bin statistics
//! - One-way ANOVA across bins
//! - Descriptive statistics and phase folding
//!
//! ## Data Layout
//!
//! Every analysis takes a slice of [`Observation`]s (Julian Date, magnitude,
//! uncertainty, band) in caller order and returns an owned, immutable result.
//! Parsing archive formats and plotting are left to the caller.

#![allow(clippy::needless_range_loop)]

pub mod parallel;

pub mod anova;
pub mod binning;
pub mod dcdft;
pub mod descriptive;
pub mod error;
pub mod helpers;
pub mod model;
pub mod observation;
pub mod phase;
pub mod spectrum;

// Re-export commonly used items
pub use error::{AnalysisError, ErrorKind, Result};
pub use helpers::NUMERICAL_EPS;
pub use observation::{Observation, ObservationSeries};

// Re-export period analysis types
pub use dcdft::{dcdft, DcDftParams, DcDftResult, ScanRange};
pub use model::{multi_periodic_fit, ModelPoint, MultiPeriodicFit, PeriodFitParameters};
pub use spectrum::{PeriodAnalysisDatum, PeriodAnalysisSeries};

// Re-export binning and statistics types
pub use anova::{one_way_anova, AnovaResult};
pub use binning::{bin_magnitudes, binned_anova, BinningMode, BinningResult, MagnitudeBin};
pub use descriptive::DescriptiveStats;
pub use phase::{phase_fold, standard_phase, EpochStrategy, PhaseFoldedSeries, PhasedObservation};
