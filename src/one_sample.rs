//! One-sample tests: uniformity, mean direction, median and symmetry.
//!
//! | Test | H₀ | Statistic | Null distribution |
//! |---|---|---|---|
//! | [`rayleigh_test`] | uniform | z = n·r² | Zar's series approximation |
//! | [`v_test`] | uniform vs. mean `angle` | V, u | normal |
//! | [`one_sample_test`] | mean = `angle` | CI membership | — |
//! | [`rao_spacing_test`] | uniform | U (spacings) | Monte Carlo |
//! | [`kuiper_test`] | uniform | V* | Kuiper asymptotic |
//! | [`watson_test`] | uniform | U² | Monte Carlo |
//! | [`omnibus_test`] | uniform | m (half-circle minimum) | Hodges–Ajne |
//! | [`batschelet_test`] | uniform vs. mean `angle` | C | binomial |
//! | [`chisquare_test`] | uniform (grouped) | χ² | χ²(k − 1) |
//! | [`circ_range_test`] | uniform | range | exact range CDF |
//! | [`binomial_test`] | median = `md` | sign counts | binomial |
//! | [`symmetry_test`] | symmetric about median | T⁺ | normal |
//!
//! Tests that work from summary statistics take `impl Into<Input>`; tests
//! that need the individual angles take a [`Sample`].

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::distributions;
use crate::error::{warn_small_sample, CircularError};
use crate::sample::{Input, Sample, Summary};
use crate::simulation::MonteCarlo;
use crate::special;
use crate::stats::{self, signed_angle_diff, wrap_angle};

/// Confidence level of the interval used by [`one_sample_test`].
pub const CONFIDENCE_LEVEL: f64 = 0.95;

fn finite_angle(angle: f64, name: &str) -> Result<f64, CircularError> {
    if !angle.is_finite() {
        return Err(CircularError::InvalidParameter(format!(
            "`{name}` must be finite, got {angle}"
        )));
    }
    Ok(wrap_angle(angle))
}

// ============================================================================
// Rayleigh / V / confidence interval
// ============================================================================

/// Result of [`rayleigh_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayleighResult {
    /// Rayleigh's z = n·r².
    pub z: f64,
    pub pval: f64,
}

tuple_view!(RayleighResult => z: f64, pval: f64);

/// Rayleigh test of uniformity against a unimodal alternative.
///
/// # Algorithm
/// z = n·r², and with R = n·r (Zar 2010, eq. 27.4)
/// ```text
/// p = exp(√(1 + 4n + 4(n² − R²)) − (1 + 2n))
/// ```
/// which is accurate to about three digits even for small n.
///
/// Only `n` and `r` are used, so a [`Summary`] without a mean direction
/// is enough.
///
/// # Examples
/// ```
/// use u_circstat::{Sample, one_sample::rayleigh_test};
/// let s = Sample::from_degrees(&[45.0, 55.0, 81.0, 96.0, 110.0, 117.0, 132.0, 154.0]).unwrap();
/// let res = rayleigh_test(&s).unwrap();
/// assert!((res.z - 5.448).abs() < 1e-3);
/// assert!(res.pval > 0.001 && res.pval < 0.002);
/// ```
pub fn rayleigh_test<'a>(input: impl Into<Input<'a>>) -> Result<RayleighResult, CircularError> {
    let input = input.into();
    let n = input.n();
    warn_small_sample("rayleigh test", n, 10);

    let nf = n as f64;
    let big_r = nf * input.r();
    let z = big_r * big_r / nf;
    let pval = ((1.0 + 4.0 * nf + 4.0 * (nf * nf - big_r * big_r)).sqrt() - (1.0 + 2.0 * nf)).exp();

    Ok(RayleighResult {
        z,
        pval: pval.clamp(0.0, 1.0),
    })
}

/// Result of [`v_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VTestResult {
    /// V = R·cos(mean − angle).
    pub v: f64,
    /// Standardised statistic u = V·√(2/n).
    pub u: f64,
    pub pval: f64,
}

tuple_view!(VTestResult => v: f64, u: f64, pval: f64);

/// V test (modified Rayleigh test) of uniformity against a unimodal
/// alternative with known mean direction `angle`.
///
/// # Algorithm
/// V = R·cos(x̄ − angle), u = V·√(2/n); one-sided p = 1 − Φ(u)
/// (Zar 2010, §27.1.2).
///
/// # Errors
/// [`CircularError::MissingField`] for a summary input with r > 0 and no
/// mean direction.
pub fn v_test<'a>(input: impl Into<Input<'a>>, angle: f64) -> Result<VTestResult, CircularError> {
    let input = input.into();
    let angle = finite_angle(angle, "angle")?;
    let res = input.resultant()?;

    let v = res.c * angle.cos() + res.s * angle.sin();
    let u = v * (2.0 / res.n).sqrt();
    let pval = special::standard_normal_cdf(-u);

    Ok(VTestResult {
        v,
        u,
        pval: pval.clamp(0.0, 1.0),
    })
}

/// Result of [`one_sample_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneSampleResult {
    /// Lower confidence bound of the mean direction.
    pub lb: f64,
    /// Upper confidence bound of the mean direction.
    pub ub: f64,
    /// `true` when `angle` lies outside `[lb, ub]`.
    pub reject: bool,
}

tuple_view!(OneSampleResult => lb: f64, ub: f64, reject: bool);

/// Tests H₀: mean direction = `angle` by checking whether `angle` lies in
/// the 95% confidence interval of the mean.
///
/// The interval comes from the summary when it carries one; otherwise it
/// is computed from n, r and the mean (Zar 2010, eq. 26.23/26.24). An
/// interval with `lb > ub` wraps through 0.
///
/// # Errors
/// [`CircularError::Degenerate`] when the sample is too dispersed for the
/// interval to exist.
///
/// # Examples
/// ```
/// use u_circstat::{Summary, one_sample::one_sample_test};
/// // interval 350°..10° wraps through zero
/// let s = Summary::new(20, 0.9).unwrap()
///     .with_mean(0.0)
///     .with_confidence_interval(350f64.to_radians(), 10f64.to_radians());
/// assert!(!one_sample_test(s, 5f64.to_radians()).unwrap().reject);
/// assert!(one_sample_test(s, 20f64.to_radians()).unwrap().reject);
/// ```
pub fn one_sample_test<'a>(
    input: impl Into<Input<'a>>,
    angle: f64,
) -> Result<OneSampleResult, CircularError> {
    let input = input.into();
    let angle = finite_angle(angle, "angle")?;

    let (lb, ub) = match input {
        Input::Summary(Summary { ci: Some(ci), .. }) => ci,
        _ => stats::mean_confidence_interval(
            input.n() as f64,
            input.r(),
            input.mean()?,
            CONFIDENCE_LEVEL,
        )?,
    };

    Ok(OneSampleResult {
        lb,
        ub,
        reject: !arc_contains(lb, ub, angle),
    })
}

// Membership in the arc running counter-clockwise from `lb` to `ub`.
fn arc_contains(lb: f64, ub: f64, angle: f64) -> bool {
    if lb <= ub {
        lb <= angle && angle <= ub
    } else {
        angle >= lb || angle <= ub
    }
}

// ============================================================================
// Distribution-free uniformity tests
// ============================================================================

/// Result of [`rao_spacing_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaoSpacingResult {
    /// U = ½ Σ |Tᵢ − 2π/n| in radians (Rao's tables use degrees).
    pub u: f64,
    pub pval: f64,
}

tuple_view!(RaoSpacingResult => u: f64, pval: f64);

/// Rao's spacing test of uniformity.
///
/// The statistic measures how far the arc lengths Tᵢ between consecutive
/// sorted observations stray from the uniform spacing 2π/n. Its p-value
/// is simulated by `mc` from uniform samples of the same size.
///
/// # Examples
/// ```
/// use u_circstat::{Sample, one_sample::rao_spacing_test};
/// use u_circstat::simulation::MonteCarlo;
/// use u_circstat::random::create_rng;
///
/// let s = Sample::from_degrees(&[66.0, 75.0, 86.0, 88.0, 88.0, 93.0, 97.0, 101.0, 118.0, 130.0]).unwrap();
/// let res = rao_spacing_test(&s, &MonteCarlo::new(999).unwrap(), &mut create_rng(42)).unwrap();
/// assert!(res.pval < 0.01);
/// ```
pub fn rao_spacing_test<R: Rng>(
    sample: &Sample,
    mc: &MonteCarlo,
    rng: &mut R,
) -> Result<RaoSpacingResult, CircularError> {
    let n = sample.n();
    CircularError::check_size("rao spacing test", n, 2)?;

    let u = rao_spacing_statistic(&mut sample.expanded());
    let pval = mc.p_value(n, u, rng, rao_spacing_statistic);
    Ok(RaoSpacingResult { u, pval })
}

fn rao_spacing_statistic(alpha: &mut [f64]) -> f64 {
    alpha.sort_by(f64::total_cmp);
    let n = alpha.len();
    let lambda = TAU / n as f64;
    let inner: f64 = alpha
        .windows(2)
        .map(|w| (w[1] - w[0] - lambda).abs())
        .sum();
    let wrap = (TAU - alpha[n - 1] + alpha[0] - lambda).abs();
    0.5 * (inner + wrap)
}

/// Result of [`kuiper_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KuiperResult {
    /// Modified statistic V* = (D⁺ + D⁻)(√n + 0.155 + 0.24/√n).
    pub v: f64,
    pub pval: f64,
}

tuple_view!(KuiperResult => v: f64, pval: f64);

/// Kuiper's test of uniformity.
///
/// # Algorithm
/// With uᵢ = α₍ᵢ₎/2π sorted, D⁺ = max(i/n − uᵢ), D⁻ = max(uᵢ − (i−1)/n).
/// Stephens' modification V* makes the asymptotic tail
/// [`distributions::kuiper_sf`] usable for moderate n. Grouped samples are
/// expanded, so binned data enters as its empirical CDF.
///
/// Samples below eight observations are flagged as unreliable.
pub fn kuiper_test(sample: &Sample) -> Result<KuiperResult, CircularError> {
    let n = sample.n();
    CircularError::check_size("kuiper test", n, 2)?;
    warn_small_sample("kuiper test", n, 8);

    let nf = n as f64;
    let sorted = sample.sorted();
    let (mut d_plus, mut d_minus) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (i, &a) in sorted.iter().enumerate() {
        let u = a / TAU;
        d_plus = d_plus.max((i + 1) as f64 / nf - u);
        d_minus = d_minus.max(u - i as f64 / nf);
    }

    let sqrt_n = nf.sqrt();
    let v = (d_plus + d_minus) * (sqrt_n + 0.155 + 0.24 / sqrt_n);
    Ok(KuiperResult {
        v,
        pval: distributions::kuiper_sf(v),
    })
}

/// Result of [`watson_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatsonResult {
    pub u2: f64,
    pub pval: f64,
}

tuple_view!(WatsonResult => u2: f64, pval: f64);

/// Watson's one-sample U² test of uniformity.
///
/// # Algorithm
/// With uᵢ = α₍ᵢ₎/2π sorted and ū their mean,
/// ```text
/// U² = Σ (uᵢ − (2i − 1)/(2n))² − n(ū − ½)² + 1/(12n)
/// ```
/// The p-value is simulated by `mc`.
pub fn watson_test<R: Rng>(
    sample: &Sample,
    mc: &MonteCarlo,
    rng: &mut R,
) -> Result<WatsonResult, CircularError> {
    let n = sample.n();
    CircularError::check_size("watson test", n, 2)?;

    let u2 = watson_u2_statistic(&mut sample.expanded());
    let pval = mc.p_value(n, u2, rng, watson_u2_statistic);
    Ok(WatsonResult { u2, pval })
}

fn watson_u2_statistic(alpha: &mut [f64]) -> f64 {
    alpha.sort_by(f64::total_cmp);
    let nf = alpha.len() as f64;
    let mut sum_sq = 0.0;
    let mut sum_u = 0.0;
    for (i, &a) in alpha.iter().enumerate() {
        let u = a / TAU;
        sum_u += u;
        let d = u - (2 * i + 1) as f64 / (2.0 * nf);
        sum_sq += d * d;
    }
    let u_bar = sum_u / nf;
    sum_sq - nf * (u_bar - 0.5).powi(2) + 1.0 / (12.0 * nf)
}

/// Result of [`omnibus_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OmnibusResult {
    /// Smallest number of observations in any open half-circle.
    pub m: usize,
    pub pval: f64,
}

tuple_view!(OmnibusResult => m: usize, pval: f64);

/// Hodges–Ajne omnibus test of uniformity.
///
/// Rotates a diameter through `360·scale` equally spaced positions and
/// records the fewest observations strictly inside the half-circle on
/// one side. The p-value comes from [`distributions::hodges_ajne_pvalue`].
///
/// # Errors
/// [`CircularError::InvalidParameter`] if `scale == 0`.
///
/// # Examples
/// ```
/// use u_circstat::{Sample, one_sample::omnibus_test};
/// let deg = [10.5, 15.5, 20.5, 25.5, 30.5, 35.5, 40.5, 45.5, 50.5, 55.5, 60.5, 65.5,
///            70.5, 75.5, 80.5, 85.5, 95.5, 105.5, 120.5, 160.5, 200.5, 250.5, 308.5, 312.5];
/// let res = omnibus_test(&Sample::from_degrees(&deg).unwrap(), 1).unwrap();
/// assert_eq!(res.m, 3);
/// assert!((res.pval - 0.0043).abs() < 1e-4);
/// ```
pub fn omnibus_test(sample: &Sample, scale: u32) -> Result<OmnibusResult, CircularError> {
    if scale == 0 {
        return Err(CircularError::InvalidParameter(
            "scale must be at least 1".into(),
        ));
    }
    let n = sample.n();
    CircularError::check_size("omnibus test", n, 2)?;

    let lines = 360 * scale as usize;
    let mut m = n;
    for j in 0..lines {
        let theta = j as f64 * TAU / lines as f64;
        let count: usize = sample
            .iter()
            .filter(|&(a, _)| {
                let d = wrap_angle(a - theta);
                d > 0.0 && d < PI
            })
            .map(|(_, w)| w)
            .sum();
        m = m.min(count);
    }

    Ok(OmnibusResult {
        m,
        pval: distributions::hodges_ajne_pvalue(n, m),
    })
}

/// Result of [`batschelet_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatscheletResult {
    /// Observations within ±90° of `angle`.
    pub c: usize,
    pub pval: f64,
}

tuple_view!(BatscheletResult => c: usize, pval: f64);

/// Batschelet's modified Hodges–Ajne test of uniformity against a
/// hypothesised mean direction `angle`.
///
/// C counts the observations in the half-circle centred on `angle`; under
/// uniformity C ~ Bin(n, ½) and the p-value is the two-sided binomial
/// tail (Zar 2010, §27.1.5).
pub fn batschelet_test(sample: &Sample, angle: f64) -> Result<BatscheletResult, CircularError> {
    let angle = finite_angle(angle, "angle")?;
    let n = sample.n();
    let c: usize = sample
        .iter()
        .filter(|&(a, _)| (a - angle).cos() > 0.0)
        .map(|(_, w)| w)
        .sum();
    Ok(BatscheletResult {
        c,
        pval: special::binomial_two_sided(c as u64, n as u64),
    })
}

/// Result of [`chisquare_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareResult {
    pub chi2: f64,
    pub pval: f64,
}

tuple_view!(ChiSquareResult => chi2: f64, pval: f64);

/// χ² goodness-of-fit test of grouped data against equal bin counts.
///
/// Each `(alpha[i], w[i])` pair is one bin with observed count `w[i]`;
/// the expected count is n/k with k bins and the statistic has k − 1
/// degrees of freedom. Expected counts below 5 are flagged as unreliable.
///
/// # Errors
/// - [`CircularError::MissingField`] (`"w"`) for an ungrouped sample.
/// - [`CircularError::InvalidParameter`] with fewer than two bins.
pub fn chisquare_test(sample: &Sample) -> Result<ChiSquareResult, CircularError> {
    let w = sample.weights().ok_or(CircularError::MissingField("w"))?;
    let k = w.len();
    if k < 2 {
        return Err(CircularError::InvalidParameter(format!(
            "chi-square test needs at least two bins, got {k}"
        )));
    }

    let expected = sample.n() as f64 / k as f64;
    if expected < 5.0 {
        log::warn!(
            "chi-square test: expected count {expected:.2} per bin is below 5; \
             the χ² approximation may be unreliable"
        );
    }
    let chi2: f64 = w
        .iter()
        .map(|&o| {
            let d = f64::from(o) - expected;
            d * d / expected
        })
        .sum();

    Ok(ChiSquareResult {
        chi2,
        pval: special::chi_squared_sf(chi2, (k - 1) as f64),
    })
}

/// Result of [`circ_range_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircRangeResult {
    /// Shortest arc containing every observation (2π minus the largest gap).
    pub range: f64,
    pub pval: f64,
}

tuple_view!(CircRangeResult => range: f64, pval: f64);

/// Circular range test of uniformity.
///
/// A small range means the observations crowd into a short arc. The
/// p-value is the probability of a range this small for n uniform points
/// ([`distributions::circular_range_pvalue`]), exact unless the
/// alternating sum cancels and its Poisson limit takes over.
pub fn circ_range_test(sample: &Sample) -> Result<CircRangeResult, CircularError> {
    let n = sample.n();
    CircularError::check_size("circular range test", n, 2)?;

    let sorted = sample.sorted();
    let max_gap = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(TAU - sorted[n - 1] + sorted[0], f64::max);
    let range = TAU - max_gap;

    Ok(CircRangeResult {
        range,
        pval: distributions::circular_range_pvalue(range, n),
    })
}

// ============================================================================
// Median and symmetry
// ============================================================================

/// Result of [`binomial_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialResult {
    /// Observations clockwise of `md` (within a half-circle).
    pub below: usize,
    /// Observations counter-clockwise of `md` (within a half-circle).
    pub above: usize,
    pub pval: f64,
}

tuple_view!(BinomialResult => below: usize, above: usize, pval: f64);

/// Sign test of H₀: the population median direction is `md`.
///
/// Observations on `md` or diametrically opposite carry no sign and are
/// dropped. A sample without spread (all observations identical) gives
/// no information about a median and returns p = 1, as does a sample with
/// nothing left after dropping.
///
/// # Examples
/// ```
/// use u_circstat::{Sample, one_sample::binomial_test};
/// let s = Sample::new(vec![1.0; 6]).unwrap();
/// assert_eq!(binomial_test(&s, 1.0).unwrap().pval, 1.0);
/// assert_eq!(binomial_test(&s, 2.0).unwrap().pval, 1.0);
/// ```
pub fn binomial_test(sample: &Sample, md: f64) -> Result<BinomialResult, CircularError> {
    let md = finite_angle(md, "md")?;
    // empty bins carry no observation and cannot break a tie
    let no_spread = sample
        .iter()
        .find(|&(_, w)| w > 0)
        .is_some_and(|(first, _)| {
            sample
                .iter()
                .all(|(a, w)| w == 0 || stats::angular_distance(a, first) < 1e-12)
        });
    let (mut below, mut above) = (0usize, 0usize);
    for (a, w) in sample.iter() {
        let d = signed_angle_diff(a, md);
        if d.abs() < 1e-12 || PI - d.abs() < 1e-12 {
            continue;
        }
        if d < 0.0 {
            below += w;
        } else {
            above += w;
        }
    }

    let n = below + above;
    let pval = if n == 0 || no_spread {
        1.0
    } else {
        special::binomial_two_sided(below as u64, n as u64)
    };
    Ok(BinomialResult { below, above, pval })
}

/// Result of [`symmetry_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryResult {
    /// Sum of ranks of the positive deviations.
    pub t_plus: f64,
    pub z: f64,
    pub pval: f64,
}

tuple_view!(SymmetryResult => t_plus: f64, z: f64, pval: f64);

/// Test of symmetry about the median (Zar 2010, §27.3).
///
/// Deviations dᵢ = αᵢ − median, wrapped into (−π, π], go through a
/// Wilcoxon signed-rank test: zeros are dropped, ties get average ranks
/// and the normal approximation carries the tie correction. `median`
/// defaults to the sample's circular median.
///
/// # Errors
/// - [`CircularError::InsufficientSample`] with fewer than two non-zero
///   deviations.
/// - [`CircularError::Degenerate`] if the median is undefined.
pub fn symmetry_test(sample: &Sample, median: Option<f64>) -> Result<SymmetryResult, CircularError> {
    let alpha = sample.expanded();
    let md = match median {
        Some(md) => finite_angle(md, "median")?,
        None => stats::circular_median(&alpha)
            .ok_or(CircularError::Degenerate("circular median is undefined"))?,
    };

    let diffs: Vec<f64> = alpha
        .iter()
        .map(|&a| signed_angle_diff(a, md))
        .filter(|d| d.abs() > 1e-12)
        .collect();
    let nr = diffs.len();
    CircularError::check_size("symmetry test", nr, 2)?;
    let nf = nr as f64;

    let mut abs_diffs: Vec<(f64, usize)> = diffs
        .iter()
        .enumerate()
        .map(|(i, &d)| (d.abs(), i))
        .collect();
    stats::sort_tagged(&mut abs_diffs);
    let ranks = stats::average_ranks(&abs_diffs);

    let t_plus: f64 = abs_diffs
        .iter()
        .zip(&ranks)
        .filter(|((_, idx), _)| diffs[*idx] > 0.0)
        .map(|(_, &r)| r)
        .sum();

    let mu = nf * (nf + 1.0) / 4.0;
    let sigma_sq =
        nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - stats::tie_correction(&abs_diffs) / 48.0;
    if sigma_sq <= 0.0 {
        return Err(CircularError::Degenerate("signed-rank variance is zero"));
    }

    let z = (t_plus - mu) / sigma_sq.sqrt();
    let pval = 2.0 * special::standard_normal_cdf(-z.abs());
    Ok(SymmetryResult {
        t_plus,
        z,
        pval: pval.clamp(0.0, 1.0),
    })
}

// ============================================================================
// Tests
// ============================================================================
