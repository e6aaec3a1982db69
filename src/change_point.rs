//! Change-point detection in an ordered sequence of angles.
//!
//! The only order-sensitive procedure in the crate: the sequence is cut
//! after every candidate position and the two segments are compared
//! through their resultant lengths.
//!
//! # Algorithm
//!
//! Lombard (1986); the derivation follows Jammalamadaka & SenGupta
//! (2001), §11.3. For a leading segment of length k with resultant
//! length R₁(k), trailing resultant R₂(k) and whole-sequence R:
//!
//! ```text
//! R(k) = R₁(k) + R₂(k) − R                           k = 1..n
//! t(k) = (k/n)·φ(R₁/k) + ((n−k)/n)·φ(R₂/(n−k))        k = 2..n−2
//! φ(x) = x·A₁⁻¹(x) − ln I₀(A₁⁻¹(x))
//! ```
//!
//! `rmax`/`tmax` are the maxima and `rave`/`tave` the averages of the two
//! curves. Change points are reported as the zero-based index of the last
//! observation of the leading segment.

use crate::error::CircularError;
use crate::sample::Sample;
use crate::special;
use crate::stats::{self, ResultantAccumulator};

/// Result of [`change_point_test`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePointResult {
    /// Sequence length.
    pub n: usize,
    /// Mean resultant length of the whole sequence.
    pub rho: f64,
    /// Maximum of R(k).
    pub rmax: f64,
    /// Index of the last observation before the change, by R(k).
    pub k_r: usize,
    /// Average of R(k) over k = 1..n.
    pub rave: f64,
    /// Maximum of t(k).
    pub tmax: f64,
    /// Index of the last observation before the change, by t(k).
    pub k_t: usize,
    /// Average of t(k) over k = 2..n−2.
    pub tave: f64,
    /// R(k) for k = 1..n; entry `i` belongs to a leading segment ending at
    /// observation `i`.
    pub r_curve: Vec<f64>,
    /// t(k) for k = 2..n−2; entry `i` belongs to a leading segment ending
    /// at observation `i + 1`.
    pub t_curve: Vec<f64>,
}

tuple_view!(ChangePointResult => rho: f64, rmax: f64, k_r: usize, rave: f64, tmax: f64, k_t: usize, tave: f64);

fn phi(x: f64) -> Result<f64, CircularError> {
    let kappa = stats::a1inv(x);
    if x > 1.0 - 1e-12 || !kappa.is_finite() {
        return Err(CircularError::Degenerate(
            "a segment is perfectly concentrated (r = 1)",
        ));
    }
    Ok(x * kappa - special::ln_bessel_i0(kappa))
}

// Position and value of the first maximum.
fn argmax(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
}

/// Change-point test for the mean direction or concentration of an
/// ordered sequence.
///
/// # Errors
/// - [`CircularError::InvalidParameter`] for a grouped sample (weights
///   carry no order).
/// - [`CircularError::InsufficientSample`] below four observations.
/// - [`CircularError::Degenerate`] when a segment of two or more
///   observations has r = 1, where φ diverges.
///
/// # Examples
/// ```
/// use u_circstat::{Sample, change_point::change_point_test};
/// let s = Sample::new(vec![
///     3.03, 0.28, 3.90, 5.56, 5.77, 5.06, 5.96, 0.16, 0.51, 1.21, 6.03, 1.05, 0.45, 1.47, 6.09,
/// ]).unwrap();
/// let res = change_point_test(&s).unwrap();
/// assert_eq!((res.k_r, res.k_t), (6, 6));
/// assert!((res.rmax - 2.237654).abs() < 1e-5);
/// ```
pub fn change_point_test(sample: &Sample) -> Result<ChangePointResult, CircularError> {
    if sample.is_weighted() {
        return Err(CircularError::InvalidParameter(
            "change-point test needs an ordered, ungrouped sequence".into(),
        ));
    }
    let alpha = sample.alpha();
    let n = alpha.len();
    CircularError::check_size("change-point test", n, 4)?;
    let nf = n as f64;

    // suffix[i] holds the resultant of alpha[i..]
    let mut suffix = vec![ResultantAccumulator::new(); n + 1];
    for i in (0..n).rev() {
        let mut acc = suffix[i + 1].clone();
        acc.push(alpha[i]);
        suffix[i] = acc;
    }
    let whole = suffix[0].resultant();
    let rho = whole.mean_resultant_length();
    let big_r = rho * nf;

    let mut r_curve = Vec::with_capacity(n);
    let mut t_curve = Vec::with_capacity(n.saturating_sub(3));
    let mut prefix = ResultantAccumulator::new();
    for (i, &a) in alpha.iter().enumerate() {
        prefix.push(a);
        let k = i + 1;
        let lead = prefix.resultant().mean_resultant_length();
        let trail = suffix[k].resultant().mean_resultant_length();
        let (r1, r2) = (lead * k as f64, trail * (n - k) as f64);
        r_curve.push(r1 + r2 - big_r);

        if (2..=n - 2).contains(&k) {
            let t = (k as f64 / nf) * phi(lead)? + ((n - k) as f64 / nf) * phi(trail)?;
            t_curve.push(t);
        }
    }
    // R(n) is identically zero; pin it against rounding
    r_curve[n - 1] = 0.0;

    let (k_r, rmax) = argmax(&r_curve);
    let (t_idx, tmax) = argmax(&t_curve);
    let rave = r_curve.iter().sum::<f64>() / nf;
    let tave = t_curve.iter().sum::<f64>() / t_curve.len() as f64;

    Ok(ChangePointResult {
        n,
        rho,
        rmax,
        k_r,
        rave,
        tmax,
        k_t: t_idx + 1,
        tave,
        r_curve,
        t_curve,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_sequence() -> Sample {
        Sample::new(vec![
            3.03, 0.28, 3.90, 5.56, 5.77, 5.06, 5.96, 0.16, 0.51, 1.21, 6.03, 1.05, 0.45, 1.47,
            6.09,
        ])
        .unwrap()
    }

    #[test]
    fn test_reference_sequence() {
        let res = change_point_test(&reference_sequence()).unwrap();
        assert_eq!(res.n, 15);
        assert!((res.rho - 0.52307).abs() < 1e-5, "rho = {}", res.rho);
        assert!((res.rmax - 2.237654).abs() < 1e-5, "rmax = {}", res.rmax);
        assert_eq!(res.k_r, 6);
        assert!((res.rave - 1.066862).abs() < 1e-5, "rave = {}", res.rave);
        assert!((res.tmax - 0.602549).abs() < 1e-5, "tmax = {}", res.tmax);
        assert_eq!(res.k_t, 6);
        assert!((res.tave - 0.460675).abs() < 1e-5, "tave = {}", res.tave);
    }

    #[test]
    fn test_curve_lengths() {
        let res = change_point_test(&reference_sequence()).unwrap();
        assert_eq!(res.r_curve.len(), 15);
        assert_eq!(res.t_curve.len(), 12);
        assert_eq!(res.r_curve[14], 0.0);
        // a single leading observation contributes R₁ = 1
        assert!(res.r_curve.iter().all(|r| *r >= -1e-12));
    }

    #[test]
    fn test_tuple_view() {
        let (rho, _, k_r, _, _, k_t, _): (f64, f64, usize, f64, f64, usize, f64) =
            change_point_test(&reference_sequence()).unwrap().into();
        assert!((rho - 0.52307).abs() < 1e-5);
        assert_eq!((k_r, k_t), (6, 6));
    }

    #[test]
    fn test_obvious_shift() {
        let mut alpha = vec![0.1, 0.3, 6.2, 0.0, 0.2, 6.1];
        alpha.extend([3.0, 3.2, 3.1, 2.9, 3.3, 3.15]);
        let res = change_point_test(&Sample::new(alpha).unwrap()).unwrap();
        assert_eq!(res.k_r, 5);
        assert_eq!(res.k_t, 5);
    }

    #[test]
    fn test_order_matters() {
        let s = reference_sequence();
        let mut reordered = s.alpha().to_vec();
        reordered.sort_by(f64::total_cmp);
        let a = change_point_test(&s).unwrap();
        let b = change_point_test(&Sample::new(reordered).unwrap()).unwrap();
        assert!((a.rho - b.rho).abs() < 1e-12);
        assert!((a.rmax - b.rmax).abs() > 1e-6 || a.k_r != b.k_r);
    }

    #[test]
    fn test_rejects_short_and_grouped() {
        let short = Sample::new(vec![0.1, 0.2, 0.3]).unwrap();
        assert!(matches!(
            change_point_test(&short),
            Err(CircularError::InsufficientSample { min: 4, .. })
        ));
        let grouped = Sample::weighted(vec![0.1, 0.2, 0.3, 0.4], vec![1, 2, 1, 1]).unwrap();
        assert!(matches!(
            change_point_test(&grouped),
            Err(CircularError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_constant_segment_is_degenerate() {
        let s = Sample::new(vec![1.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(matches!(
            change_point_test(&s),
            Err(CircularError::Degenerate(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::distributions::VonMises;
    use crate::random::create_rng;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn reordering_changes_result(seed in 0_u64..10_000, half in 5_usize..20) {
            let mut rng = create_rng(seed);
            let mut alpha = VonMises::new(0.5, 3.0).unwrap().samples(half, &mut rng);
            alpha.extend(VonMises::new(3.5, 3.0).unwrap().samples(half, &mut rng));
            // interleave the two regimes
            let interleaved: Vec<f64> = (0..half)
                .flat_map(|i| [alpha[i], alpha[half + i]])
                .collect();

            let ordered = change_point_test(&Sample::new(alpha).unwrap()).unwrap();
            let mixed = change_point_test(&Sample::new(interleaved).unwrap()).unwrap();
            prop_assert!((ordered.rho - mixed.rho).abs() < 1e-9);
            prop_assert!(
                (ordered.rmax - mixed.rmax).abs() > 1e-9 || ordered.k_r != mixed.k_r,
                "rmax {} vs {}", ordered.rmax, mixed.rmax
            );
        }

        #[test]
        fn curves_are_finite(seed in 0_u64..10_000, n in 4_usize..40) {
            let mut rng = create_rng(seed);
            let alpha = VonMises::new(1.0, 1.0).unwrap().samples(n, &mut rng);
            let res = change_point_test(&Sample::new(alpha).unwrap()).unwrap();
            prop_assert!(res.r_curve.iter().chain(&res.t_curve).all(|v| v.is_finite()));
            prop_assert!(res.k_r < n && res.k_t >= 1 && res.k_t <= n - 3);
        }
    }
}
