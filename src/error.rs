//! Error type shared by every analysis entry point.
//!
//! Failures fall into two classes. Validation errors mean the caller asked
//! for something that cannot be computed as posed (empty input, a
//! non-positive width, an inverted frequency range). Computation errors mean
//! the request was well-formed but the data cannot support it (a singular
//! design matrix, too few groups for an F test).

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Coarse classification of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad parameters or input shape.
    Validation,
    /// Well-formed request that the data cannot support numerically.
    Computation,
}

/// Errors produced by the analysis routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("no observations supplied")]
    EmptyInput,

    #[error("too few observations: need at least {needed}, have {available}")]
    TooFewObservations { needed: usize, available: usize },

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("invalid range: low {low} must be below high {high}")]
    InvalidRange { low: f64, high: f64 },

    #[error("non-finite {field} at index {index}")]
    NonFiniteValue { field: &'static str, index: usize },

    #[error("no periods supplied")]
    NoPeriods,

    #[error("length mismatch: {left} times vs {right} magnitudes")]
    LengthMismatch { left: usize, right: usize },

    #[error("scan grid of {points} points exceeds the limit of {limit}")]
    GridTooLarge { points: usize, limit: usize },

    #[error("design matrix is singular (column {column} is linearly dependent)")]
    SingularFit { column: usize },

    #[error("insufficient data: {available} values for {needed} parameters")]
    InsufficientData { needed: usize, available: usize },

    #[error("at least two non-empty groups are required, found {found}")]
    InsufficientGroups { found: usize },

    #[error("zero variance in {0}")]
    ZeroVariance(&'static str),

    #[error("distribution error: {0}")]
    Distribution(String),
}

impl AnalysisError {
    /// Which side of the validation/computation split this error is on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::EmptyInput
            | AnalysisError::TooFewObservations { .. }
            | AnalysisError::InvalidParameter { .. }
            | AnalysisError::InvalidRange { .. }
            | AnalysisError::NonFiniteValue { .. }
            | AnalysisError::NoPeriods
            | AnalysisError::LengthMismatch { .. }
            | AnalysisError::GridTooLarge { .. } => ErrorKind::Validation,
            AnalysisError::SingularFit { .. }
            | AnalysisError::InsufficientData { .. }
            | AnalysisError::InsufficientGroups { .. }
            | AnalysisError::ZeroVariance(_)
            | AnalysisError::Distribution(_) => ErrorKind::Computation,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
