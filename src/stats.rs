//! Trigonometric moments and descriptive statistics on the circle.
//!
//! Shared numerical primitives for every test: the resultant vector,
//! mean direction, mean resultant length, higher trigonometric moments,
//! circular median, the concentration estimate κ̂ and the confidence
//! interval of the mean direction.
//!
//! # Algorithms
//!
//! - **Resultant**: cosine and sine sums accumulated with Kahan
//!   compensation, so r stays accurate for large, concentrated samples.
//! - **κ̂**: the piecewise inverse of A₁(κ) = I₁(κ)/I₀(κ) from
//!   Best & Fisher (1981), refined by Newton iteration on A₁.
//! - **Confidence interval**: Zar (2010), eqs. 26.23–26.24.

use std::f64::consts::{PI, TAU};

use crate::error::CircularError;
use crate::special;

/// Wraps an angle into `[0, 2π)`.
///
/// # Examples
/// ```
/// use u_circstat::stats::wrap_angle;
/// use std::f64::consts::PI;
/// assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
/// assert_eq!(wrap_angle(2.0 * PI), 0.0);
/// ```
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid of a tiny negative value rounds up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Signed difference `a − b` wrapped into `(−π, π]`.
pub fn signed_angle_diff(a: f64, b: f64) -> f64 {
    let d = wrap_angle(a - b);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Shortest arc length between two angles, in `[0, π]`.
///
/// # Examples
/// ```
/// use u_circstat::stats::angular_distance;
/// use std::f64::consts::PI;
/// assert!((angular_distance(0.1, 2.0 * PI - 0.1) - 0.2).abs() < 1e-12);
/// ```
pub fn angular_distance(a: f64, b: f64) -> f64 {
    signed_angle_diff(a, b).abs()
}

/// Kahan compensated summation.
///
/// # Examples
/// ```
/// use u_circstat::stats::kahan_sum;
/// let v = vec![0.1; 10];
/// assert!((kahan_sum(&v) - 1.0).abs() < 1e-15);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut acc = Kahan::default();
    for &x in data {
        acc.add(x);
    }
    acc.sum
}

#[derive(Debug, Clone, Copy, Default)]
struct Kahan {
    sum: f64,
    compensation: f64,
}

impl Kahan {
    fn add(&mut self, x: f64) {
        let y = x - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

// ============================================================================
// Resultant vector
// ============================================================================

/// Weighted resultant vector of a circular sample.
///
/// Holds the raw sums `n = Σw`, `C = Σw·cos α`, `S = Σw·sin α`; every
/// first-moment quantity is derived from these three numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resultant {
    /// Total weight (sample size).
    pub n: f64,
    /// Σ w·cos α
    pub c: f64,
    /// Σ w·sin α
    pub s: f64,
}

impl Resultant {
    /// Computes the resultant of `alpha`, optionally weighted by `w`.
    ///
    /// Extra entries in the longer slice are ignored; length agreement is
    /// enforced by [`Sample`](crate::Sample).
    pub fn from_angles(alpha: &[f64], w: Option<&[u32]>) -> Self {
        let mut acc = ResultantAccumulator::new();
        match w {
            Some(w) => {
                for (&a, &wi) in alpha.iter().zip(w) {
                    acc.push_weighted(a, f64::from(wi));
                }
            }
            None => {
                for &a in alpha {
                    acc.push(a);
                }
            }
        }
        acc.resultant()
    }

    /// Rebuilds the resultant from summary statistics.
    pub fn from_summary(n: f64, r: f64, mean: f64) -> Self {
        let length = n * r;
        Self {
            n,
            c: length * mean.cos(),
            s: length * mean.sin(),
        }
    }

    /// Resultant length R = √(C² + S²).
    pub fn length(&self) -> f64 {
        self.c.hypot(self.s)
    }

    /// Mean resultant length r = R / n, clamped to `[0, 1]`.
    ///
    /// Returns `0.0` for an empty resultant.
    pub fn mean_resultant_length(&self) -> f64 {
        if self.n <= 0.0 {
            return 0.0;
        }
        (self.length() / self.n).clamp(0.0, 1.0)
    }

    /// Mean direction in `[0, 2π)`.
    ///
    /// Returns `None` when the resultant vanishes and the direction is
    /// undefined.
    pub fn mean_direction(&self) -> Option<f64> {
        if self.length() <= 1e-12 * self.n.max(1.0) {
            return None;
        }
        Some(wrap_angle(self.s.atan2(self.c)))
    }

    /// Vector sum of two resultants (pooled sample).
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            n: self.n + other.n,
            c: self.c + other.c,
            s: self.s + other.s,
        }
    }
}

/// Streaming accumulator for the resultant vector.
///
/// Cosine and sine sums use Kahan compensation. Two accumulators can be
/// merged, which lets prefix/suffix resultants be built in one pass.
///
/// # Examples
/// ```
/// use u_circstat::stats::ResultantAccumulator;
/// let mut acc = ResultantAccumulator::new();
/// for &a in &[0.1, 0.2, 0.3] {
///     acc.push(a);
/// }
/// assert_eq!(acc.len(), 3);
/// assert!((acc.resultant().mean_direction().unwrap() - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResultantAccumulator {
    count: usize,
    weight: f64,
    cos_sum: Kahan,
    sin_sum: Kahan,
}

impl ResultantAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation of weight 1.
    pub fn push(&mut self, angle: f64) {
        self.push_weighted(angle, 1.0);
    }

    /// Adds one observation with the given weight.
    pub fn push_weighted(&mut self, angle: f64, weight: f64) {
        let (sin, cos) = angle.sin_cos();
        self.count += 1;
        self.weight += weight;
        self.cos_sum.add(weight * cos);
        self.sin_sum.add(weight * sin);
    }

    /// Number of pushed observations (not the total weight).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Folds another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.weight += other.weight;
        self.cos_sum.add(other.cos_sum.sum);
        self.sin_sum.add(other.sin_sum.sum);
    }

    /// Current resultant vector.
    pub fn resultant(&self) -> Resultant {
        Resultant {
            n: self.weight,
            c: self.cos_sum.sum,
            s: self.sin_sum.sum,
        }
    }
}

/// Mean resultant length of an unweighted sample.
///
/// # Returns
/// - `None` if `alpha` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_circstat::stats::mean_resultant_length;
/// assert!((mean_resultant_length(&[1.0, 1.0, 1.0]).unwrap() - 1.0).abs() < 1e-12);
/// ```
pub fn mean_resultant_length(alpha: &[f64]) -> Option<f64> {
    if alpha.is_empty() || !alpha.iter().all(|a| a.is_finite()) {
        return None;
    }
    Some(Resultant::from_angles(alpha, None).mean_resultant_length())
}

/// Mean direction of an unweighted sample in `[0, 2π)`.
///
/// # Returns
/// - `None` if `alpha` is empty, non-finite, or has a zero resultant.
pub fn mean_direction(alpha: &[f64]) -> Option<f64> {
    if alpha.is_empty() || !alpha.iter().all(|a| a.is_finite()) {
        return None;
    }
    Resultant::from_angles(alpha, None).mean_direction()
}

/// Circular variance `1 − r`.
pub fn circular_variance(alpha: &[f64]) -> Option<f64> {
    mean_resultant_length(alpha).map(|r| 1.0 - r)
}

// ============================================================================
// Higher moments
// ============================================================================

/// A trigonometric moment of order p.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrigMoment {
    /// Length ρₚ of the p-th moment vector.
    pub rho: f64,
    /// Direction μₚ in `[0, 2π)`; `None` when ρₚ is zero.
    pub mu: Option<f64>,
}

/// p-th trigonometric moment, optionally centred on the mean direction.
///
/// The uncentred moment is `mₚ = (1/n) Σ w·e^{ipα}`; the centred one
/// replaces α by α − μ̂.
///
/// # Returns
/// - `None` if the sample is empty, or `centered` is requested for a
///   sample with no mean direction.
pub fn trigonometric_moment(
    alpha: &[f64],
    w: Option<&[u32]>,
    p: u32,
    centered: bool,
) -> Option<TrigMoment> {
    let first = Resultant::from_angles(alpha, w);
    if first.n <= 0.0 {
        return None;
    }
    let shift = if centered { first.mean_direction()? } else { 0.0 };
    let order = f64::from(p);
    let moved: Vec<f64> = alpha.iter().map(|&a| order * (a - shift)).collect();
    let moment = Resultant::from_angles(&moved, w);
    Some(TrigMoment {
        rho: moment.mean_resultant_length(),
        mu: moment.mean_direction(),
    })
}

/// Circular dispersion δ̂ = (1 − ρ̂₂) / (2 r²).
///
/// Reference: Fisher (1993), *Statistical Analysis of Circular Data*, §2.3.
///
/// # Returns
/// - `None` for an empty sample or r = 0.
pub fn circular_dispersion(alpha: &[f64], w: Option<&[u32]>) -> Option<f64> {
    let r = Resultant::from_angles(alpha, w).mean_resultant_length();
    if r <= 0.0 {
        return None;
    }
    let rho2 = trigonometric_moment(alpha, w, 2, true)?.rho;
    Some((1.0 - rho2) / (2.0 * r * r))
}

/// Circular median: the direction minimising the mean angular deviation.
///
/// Candidates are the observations themselves and, for even sample
/// sizes, the midpoints of neighbouring observations. Several minimisers
/// are reduced to their circular mean.
///
/// # Returns
/// - `None` if `alpha` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_circstat::stats::circular_median;
/// let m = circular_median(&[0.1, 0.2, 0.4, 6.2]).unwrap();
/// assert!((m - 0.15).abs() < 1e-12);
/// ```
pub fn circular_median(alpha: &[f64]) -> Option<f64> {
    if alpha.is_empty() || !alpha.iter().all(|a| a.is_finite()) {
        return None;
    }
    let mut sorted: Vec<f64> = alpha.iter().map(|&a| wrap_angle(a)).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let mut candidates = sorted.clone();
    if n % 2 == 0 {
        for i in 0..n {
            let a = sorted[i];
            let b = sorted[(i + 1) % n];
            candidates.push(wrap_angle(a + 0.5 * wrap_angle(b - a)));
        }
    }

    let deviation = |theta: f64| -> f64 {
        sorted.iter().map(|&a| angular_distance(a, theta)).sum()
    };
    let scored: Vec<(f64, f64)> = candidates.iter().map(|&c| (c, deviation(c))).collect();
    let best = scored
        .iter()
        .map(|&(_, d)| d)
        .fold(f64::INFINITY, f64::min);
    let tolerance = 1e-10 * best.max(1.0);

    let mut minimisers: Vec<f64> = scored
        .iter()
        .filter(|&&(_, d)| d - best <= tolerance)
        .map(|&(c, _)| c)
        .collect();
    minimisers.sort_by(f64::total_cmp);
    minimisers.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

    if minimisers.len() == 1 {
        return Some(minimisers[0]);
    }
    Resultant::from_angles(&minimisers, None)
        .mean_direction()
        .or(Some(minimisers[0]))
}

// ============================================================================
// Concentration
// ============================================================================

/// A₁(κ) = I₁(κ)/I₀(κ), the mean resultant length of a von Mises
/// distribution with concentration κ.
pub fn a1(kappa: f64) -> f64 {
    special::bessel_ratio_i1_i0(kappa)
}

/// Piecewise approximation of A₁⁻¹(r).
///
/// Reference: Best & Fisher (1981); Fisher (1993), eq. 4.40.
///
/// ```text
/// r < 0.53        κ = 2r + r³ + 5r⁵/6
/// 0.53 ≤ r < 0.85 κ = −0.4 + 1.39r + 0.43/(1 − r)
/// r ≥ 0.85        κ = 1/(r³ − 4r² + 3r)
/// ```
///
/// # Returns
/// - `f64::NAN` for r outside `[0, 1]`, `f64::INFINITY` at r = 1.
///
/// # Examples
/// ```
/// use u_circstat::stats::a1inv;
/// assert!((a1inv(0.5) - 1.1510416666).abs() < 1e-9);
/// ```
pub fn a1inv(r: f64) -> f64 {
    if r.is_nan() || !(0.0..=1.0).contains(&r) {
        return f64::NAN;
    }
    if r < 0.53 {
        2.0 * r + r.powi(3) + 5.0 * r.powi(5) / 6.0
    } else if r < 0.85 {
        -0.4 + 1.39 * r + 0.43 / (1.0 - r)
    } else if r < 1.0 {
        1.0 / (r.powi(3) - 4.0 * r * r + 3.0 * r)
    } else {
        f64::INFINITY
    }
}

/// Maximum-likelihood estimate of the von Mises concentration κ from r.
///
/// Starts from [`a1inv`] and polishes with Newton steps on
/// `A₁(κ) − r = 0`, using `A₁'(κ) = 1 − A₁/κ − A₁²`.
///
/// # Errors
/// [`CircularError::Degenerate`] when r ∉ (0, 1): a perfectly dispersed
/// or perfectly concentrated sample has no finite positive κ̂.
///
/// # Examples
/// ```
/// use u_circstat::stats::{a1, estimate_kappa};
/// let kappa = estimate_kappa(a1(2.0)).unwrap();
/// assert!((kappa - 2.0).abs() < 1e-6);
/// ```
pub fn estimate_kappa(r: f64) -> Result<f64, CircularError> {
    if r.is_nan() || r <= 0.0 || r >= 1.0 {
        return Err(CircularError::Degenerate(
            "concentration is undefined for r = 0 or r = 1",
        ));
    }

    let mut kappa = a1inv(r);
    for _ in 0..100 {
        let a = a1(kappa);
        let slope = 1.0 - a / kappa - a * a;
        if slope <= 0.0 || !slope.is_finite() {
            break;
        }
        let mut next = kappa - (a - r) / slope;
        if next <= 0.0 {
            next = 0.5 * kappa;
        }
        let converged = (next - kappa).abs() < 1e-10 * kappa.max(1.0);
        kappa = next;
        if converged {
            break;
        }
    }
    Ok(kappa)
}

/// Confidence interval of the mean direction.
///
/// # Algorithm
/// Zar (2010), eq. 26.23 for r ≤ 0.9 and eq. 26.24 for r > 0.9, with
/// χ² the upper `level` quantile on one degree of freedom.
///
/// # Returns
/// `(lower, upper)` wrapped into `[0, 2π)`; `lower > upper` means the
/// interval crosses zero.
///
/// # Errors
/// - [`CircularError::InvalidParameter`] if `level ∉ (0, 1)` or r ∉ [0, 1].
/// - [`CircularError::Degenerate`] if the sample is too dispersed for the
///   interval to exist (r ≤ √(χ²/2n)).
pub fn mean_confidence_interval(
    n: f64,
    r: f64,
    mean: f64,
    level: f64,
) -> Result<(f64, f64), CircularError> {
    if !(level > 0.0 && level < 1.0) {
        return Err(CircularError::InvalidParameter(format!(
            "confidence level must lie in (0, 1), got {level}"
        )));
    }
    if !(0.0..=1.0).contains(&r) || n <= 0.0 || !mean.is_finite() {
        return Err(CircularError::InvalidParameter(format!(
            "invalid summary statistics n={n}, r={r}, mean={mean}"
        )));
    }

    let chi2 = special::chi_squared_quantile(level, 1.0);
    let big_r = n * r;
    let undefined = CircularError::Degenerate("confidence interval of the mean does not exist");

    let cos_delta = if r <= 0.9 {
        if r <= (chi2 / (2.0 * n)).sqrt() {
            return Err(undefined);
        }
        (2.0 * n * (2.0 * big_r * big_r - n * chi2) / (4.0 * n - chi2)).sqrt() / big_r
    } else {
        let inner = n * n - (n * n - big_r * big_r) * (chi2 / n).exp();
        if inner < 0.0 {
            return Err(undefined);
        }
        inner.sqrt() / big_r
    };

    if !cos_delta.is_finite() {
        return Err(undefined);
    }
    let delta = cos_delta.clamp(-1.0, 1.0).acos();
    Ok((wrap_angle(mean - delta), wrap_angle(mean + delta)))
}

// ============================================================================
// Ranks
// ============================================================================

// Half-open index ranges of runs of tied values in `sorted`.
fn tie_runs(sorted: &[(f64, usize)]) -> Vec<(usize, usize)> {
    let n = sorted.len();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && (sorted[j].0 - sorted[i].0).abs() < 1e-12 {
            j += 1;
        }
        runs.push((i, j));
        i = j;
    }
    runs
}

/// Average (mid) ranks of `(value, tag)` pairs sorted by value.
///
/// Ranks start at 1; a run of tied values shares the mean of the ranks
/// it spans.
pub(crate) fn average_ranks(sorted: &[(f64, usize)]) -> Vec<f64> {
    let mut ranks = vec![0.0; sorted.len()];
    for (i, j) in tie_runs(sorted) {
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for rank in ranks.iter_mut().take(j).skip(i) {
            *rank = avg_rank;
        }
    }
    ranks
}

/// Tie correction Σ t(t² − 1) over runs of tied values.
pub(crate) fn tie_correction(sorted: &[(f64, usize)]) -> f64 {
    tie_runs(sorted)
        .into_iter()
        .map(|(i, j)| {
            let t = (j - i) as f64;
            t * (t * t - 1.0)
        })
        .sum()
}

/// Sorts `(value, tag)` pairs by value.
pub(crate) fn sort_tagged(values: &mut [(f64, usize)]) {
    values.sort_by(|a, b| a.0.total_cmp(&b.0));
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn angles(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(0.0_f64..TAU, min_len..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn r_in_unit_interval(alpha in angles(1, 60)) {
            let r = mean_resultant_length(&alpha).unwrap();
            prop_assert!((0.0..=1.0).contains(&r));
        }

        #[test]
        fn mean_direction_rotates(alpha in angles(2, 40), shift in 0.0_f64..TAU) {
            let rotated: Vec<f64> = alpha.iter().map(|&a| wrap_angle(a + shift)).collect();
            if let (Some(m0), Some(m1)) = (mean_direction(&alpha), mean_direction(&rotated)) {
                if mean_resultant_length(&alpha).unwrap() > 1e-6 {
                    prop_assert!(angular_distance(wrap_angle(m0 + shift), m1) < 1e-6);
                }
            }
        }

        #[test]
        fn r_is_rotation_invariant(alpha in angles(1, 40), shift in 0.0_f64..TAU) {
            let rotated: Vec<f64> = alpha.iter().map(|&a| a + shift).collect();
            let r0 = mean_resultant_length(&alpha).unwrap();
            let r1 = mean_resultant_length(&rotated).unwrap();
            prop_assert!((r0 - r1).abs() < 1e-10);
        }

        #[test]
        fn kappa_inverts_a1(kappa in 0.05_f64..60.0) {
            let back = estimate_kappa(a1(kappa)).unwrap();
            prop_assert!(((back - kappa) / kappa).abs() < 1e-5, "kappa {kappa} -> {back}");
        }

        #[test]
        fn angular_distance_is_symmetric(a in 0.0_f64..TAU, b in 0.0_f64..TAU) {
            let d = angular_distance(a, b);
            prop_assert!((0.0..=PI).contains(&d));
            prop_assert!((d - angular_distance(b, a)).abs() < 1e-12);
        }
    }
}
