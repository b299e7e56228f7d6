//! Optional parallel fan-out over scan grids.
//!
//! With the `parallel` feature (on by default) the DC DFT evaluates its
//! frequency grid with rayon. Without it the same code runs sequentially,
//! which keeps the crate usable on targets without threads. Either way the
//! collected output is in grid order, so results are identical.

/// Iterate a range or owned collection, in parallel when the `parallel`
/// feature is enabled.
///
/// ```ignore
/// use crate::iter_maybe_parallel;
///
/// let rows: Vec<_> = iter_maybe_parallel!(0..frequencies.len())
///     .map(|k| evaluate(frequencies[k]))
///     .collect();
/// ```
#[macro_export]
macro_rules! iter_maybe_parallel {
    ($expr:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::IntoParallelIterator;

            IntoParallelIterator::into_par_iter($expr)
        }
        #[cfg(not(feature = "parallel"))]
        {
            IntoIterator::into_iter($expr)
        }
    }};
}

pub use iter_maybe_parallel;
