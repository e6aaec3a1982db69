//! Circular samples, summary statistics and test input.
//!
//! A test can be fed either the raw angles ([`Sample`]) or precomputed
//! summary statistics ([`Summary`]). Both arrive as an [`Input`], whose
//! accessors yield the same derived quantities for either form, so the
//! two give identical results.

use crate::error::CircularError;
use crate::stats::{self, Resultant};

/// A validated circular sample: angles in radians with optional integer
/// weights (grouped data).
///
/// Angles are wrapped into `[0, 2π)` on construction; 0 and 2π denote
/// the same direction, so wrapping does not change the data.
///
/// # Examples
/// ```
/// use u_circstat::Sample;
/// let s = Sample::from_degrees(&[45.0, 55.0, 81.0]).unwrap();
/// assert_eq!(s.n(), 3);
///
/// let grouped = Sample::weighted(vec![0.0, 1.0], vec![4, 2]).unwrap();
/// assert_eq!(grouped.n(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    alpha: Vec<f64>,
    w: Option<Vec<u32>>,
    n: usize,
}

impl Sample {
    /// Creates an unweighted sample.
    ///
    /// # Errors
    /// - [`CircularError::EmptySample`] if `alpha` is empty.
    /// - [`CircularError::NonFinite`] if an angle is NaN or infinite.
    pub fn new(alpha: impl Into<Vec<f64>>) -> Result<Self, CircularError> {
        let alpha = validate_angles(alpha.into())?;
        let n = alpha.len();
        Ok(Self { alpha, w: None, n })
    }

    /// Creates a grouped sample where `w[i]` observations fall at `alpha[i]`.
    ///
    /// # Errors
    /// - [`CircularError::LengthMismatch`] if the slices differ in length.
    /// - [`CircularError::EmptySample`] if the total weight is zero.
    /// - [`CircularError::NonFinite`] if an angle is NaN or infinite.
    pub fn weighted(
        alpha: impl Into<Vec<f64>>,
        w: impl Into<Vec<u32>>,
    ) -> Result<Self, CircularError> {
        let alpha = alpha.into();
        let w = w.into();
        if alpha.len() != w.len() {
            return Err(CircularError::LengthMismatch {
                alpha: alpha.len(),
                w: w.len(),
            });
        }
        let alpha = validate_angles(alpha)?;
        let n: usize = w.iter().map(|&wi| wi as usize).sum();
        if n == 0 {
            return Err(CircularError::EmptySample);
        }
        Ok(Self {
            alpha,
            w: Some(w),
            n,
        })
    }

    /// Creates an unweighted sample from angles in degrees.
    pub fn from_degrees(degrees: &[f64]) -> Result<Self, CircularError> {
        Self::new(degrees.iter().map(|d| d.to_radians()).collect::<Vec<_>>())
    }

    /// Effective sample size `Σw`.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Angles in `[0, 2π)`, in the order supplied.
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Weights, if the sample is grouped.
    pub fn weights(&self) -> Option<&[u32]> {
        self.w.as_deref()
    }

    pub fn is_weighted(&self) -> bool {
        self.w.is_some()
    }

    /// `(angle, weight)` pairs; weight 1 for ungrouped data.
    pub fn iter(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.alpha.iter().enumerate().map(move |(i, &a)| {
            let weight = self.w.as_ref().map_or(1, |w| w[i] as usize);
            (a, weight)
        })
    }

    /// Resultant vector of the sample.
    pub fn resultant(&self) -> Resultant {
        Resultant::from_angles(&self.alpha, self.weights())
    }

    /// One entry per observation: grouped angles repeated `w` times.
    pub fn expanded(&self) -> Vec<f64> {
        match &self.w {
            Some(w) => self
                .alpha
                .iter()
                .zip(w)
                .flat_map(|(&a, &wi)| std::iter::repeat(a).take(wi as usize))
                .collect(),
            None => self.alpha.clone(),
        }
    }

    /// Expanded observations in ascending order.
    pub fn sorted(&self) -> Vec<f64> {
        let mut v = self.expanded();
        v.sort_by(f64::total_cmp);
        v
    }

    /// Summary statistics of the sample (n, r, mean, median).
    pub fn summary(&self) -> Summary {
        let res = self.resultant();
        Summary {
            n: self.n,
            r: res.mean_resultant_length(),
            mean: res.mean_direction(),
            median: stats::circular_median(&self.expanded()),
            ci: None,
        }
    }
}

fn validate_angles(alpha: Vec<f64>) -> Result<Vec<f64>, CircularError> {
    if alpha.is_empty() {
        return Err(CircularError::EmptySample);
    }
    if let Some(index) = alpha.iter().position(|a| !a.is_finite()) {
        return Err(CircularError::NonFinite { index });
    }
    Ok(alpha.into_iter().map(stats::wrap_angle).collect())
}

/// Precomputed summary statistics of a circular sample.
///
/// Only `n` and `r` are mandatory; tests that need more report the
/// missing field by name.
///
/// # Examples
/// ```
/// use u_circstat::Summary;
/// let s = Summary::new(10, 0.95).unwrap().with_mean(1.64);
/// assert_eq!(s.mean, Some(1.64));
/// assert!(Summary::new(10, 1.2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Effective sample size.
    pub n: usize,
    /// Mean resultant length, `0 ≤ r ≤ 1`.
    pub r: f64,
    /// Mean direction in radians.
    pub mean: Option<f64>,
    /// Circular median in radians.
    pub median: Option<f64>,
    /// Confidence interval `(lower, upper)` of the mean direction.
    pub ci: Option<(f64, f64)>,
}

impl Summary {
    /// Creates a summary from sample size and mean resultant length.
    ///
    /// # Errors
    /// - [`CircularError::EmptySample`] if `n == 0`.
    /// - [`CircularError::InvalidParameter`] if r ∉ [0, 1].
    pub fn new(n: usize, r: f64) -> Result<Self, CircularError> {
        if n == 0 {
            return Err(CircularError::EmptySample);
        }
        if r.is_nan() || !(0.0..=1.0).contains(&r) {
            return Err(CircularError::InvalidParameter(format!(
                "mean resultant length must lie in [0, 1], got {r}"
            )));
        }
        Ok(Self {
            n,
            r,
            mean: None,
            median: None,
            ci: None,
        })
    }

    pub fn with_mean(mut self, mean: f64) -> Self {
        self.mean = Some(stats::wrap_angle(mean));
        self
    }

    pub fn with_median(mut self, median: f64) -> Self {
        self.median = Some(stats::wrap_angle(median));
        self
    }

    /// Attaches a confidence interval of the mean direction.
    pub fn with_confidence_interval(mut self, lower: f64, upper: f64) -> Self {
        self.ci = Some((stats::wrap_angle(lower), stats::wrap_angle(upper)));
        self
    }

    /// Mean direction, or a validation error naming the field.
    pub fn require_mean(&self) -> Result<f64, CircularError> {
        finite_field(self.mean, "mean")
    }

    /// Circular median, or a validation error naming the field.
    pub fn require_median(&self) -> Result<f64, CircularError> {
        finite_field(self.median, "median")
    }

    /// Resultant vector implied by the summary.
    pub fn resultant(&self) -> Result<Resultant, CircularError> {
        let mean = if self.r > 0.0 { self.require_mean()? } else { 0.0 };
        Ok(Resultant::from_summary(self.n as f64, self.r, mean))
    }
}

fn finite_field(value: Option<f64>, name: &'static str) -> Result<f64, CircularError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(CircularError::InvalidParameter(format!(
            "`{name}` must be finite"
        ))),
        None => Err(CircularError::MissingField(name)),
    }
}

/// Test input: raw angles or precomputed summary statistics.
///
/// Built implicitly through `From`, so tests accept `&sample` and
/// `summary` alike.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Raw(&'a Sample),
    Summary(Summary),
}

impl<'a> From<&'a Sample> for Input<'a> {
    fn from(sample: &'a Sample) -> Self {
        Input::Raw(sample)
    }
}

impl From<Summary> for Input<'_> {
    fn from(summary: Summary) -> Self {
        Input::Summary(summary)
    }
}

impl Input<'_> {
    /// Effective sample size.
    pub fn n(&self) -> usize {
        match self {
            Input::Raw(sample) => sample.n(),
            Input::Summary(summary) => summary.n,
        }
    }

    /// Mean resultant length.
    pub fn r(&self) -> f64 {
        match self {
            Input::Raw(sample) => sample.resultant().mean_resultant_length(),
            Input::Summary(summary) => summary.r,
        }
    }

    /// Mean direction.
    ///
    /// # Errors
    /// [`CircularError::MissingField`] for a summary without `mean`;
    /// [`CircularError::Degenerate`] for a raw sample whose resultant
    /// vanishes.
    pub fn mean(&self) -> Result<f64, CircularError> {
        match self {
            Input::Raw(sample) => sample
                .resultant()
                .mean_direction()
                .ok_or(CircularError::Degenerate("mean direction is undefined for r = 0")),
            Input::Summary(summary) => summary.require_mean(),
        }
    }

    /// Circular median.
    pub fn median(&self) -> Result<f64, CircularError> {
        match self {
            Input::Raw(sample) => stats::circular_median(&sample.expanded())
                .ok_or(CircularError::Degenerate("circular median is undefined")),
            Input::Summary(summary) => summary.require_median(),
        }
    }

    /// Resultant vector of the input.
    pub fn resultant(&self) -> Result<Resultant, CircularError> {
        match self {
            Input::Raw(sample) => Ok(sample.resultant()),
            Input::Summary(summary) => summary.resultant(),
        }
    }
}

/// Uniformly spaced angles `2π(i + offset)/n`.
#[cfg(test)]
pub(crate) fn evenly_spaced(n: usize, offset: f64) -> Vec<f64> {
    (0..n)
        .map(|i| stats::wrap_angle(std::f64::consts::TAU * (i as f64 + offset) / n as f64))
        .collect()
}
