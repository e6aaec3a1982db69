//! # u-circstat
//!
//! Hypothesis tests for circular data: compass bearings, times of day,
//! phase angles and anything else measured on a periodic scale.
//!
//! Every test is a pure function from a sample (or its summary statistics)
//! to a named result record carrying the statistic and its p-value.
//!
//! ## Modules
//!
//! - [`stats`] — Trigonometric moments, mean direction, κ estimation
//! - [`sample`] — Validated raw samples, summary statistics, test input
//! - [`special`] — Special functions and reference distribution tails
//! - [`distributions`] — von Mises distribution and null distributions of test statistics
//! - [`random`] — Seeded RNG construction and uniform circular draws
//! - [`simulation`] — Monte Carlo p-values
//! - [`one_sample`] — Uniformity, mean-direction, median and symmetry tests
//! - [`multi_sample`] — Tests comparing two or more samples
//! - [`change_point`] — Change-point detection in an ordered sequence
//!
//! ## Conventions
//!
//! - Angles are radians. Degrees must be converted by the caller
//!   (or through [`Sample::from_degrees`]); units are never guessed.
//! - Randomness is always passed in explicitly as `&mut impl Rng`.
//! - Reduced-reliability situations are reported through the `log` facade
//!   and never change the returned numbers.

// Positional view over a result record: `let (z, pval) = result.into();`
macro_rules! tuple_view {
    ($ty:ty => $($field:ident: $t:ty),+) => {
        impl From<$ty> for ($($t),+) {
            fn from(r: $ty) -> Self {
                ($(r.$field),+)
            }
        }
    };
}

pub mod change_point;
pub mod distributions;
pub mod error;
pub mod multi_sample;
pub mod one_sample;
pub mod random;
pub mod sample;
pub mod simulation;
pub mod special;
pub mod stats;

pub use error::CircularError;
pub use sample::{Input, Sample, Summary};
