//! Tests comparing two or more independent circular samples.
//!
//! | Test | H₀ | Null distribution |
//! |---|---|---|
//! | [`watson_williams_test`] | equal mean directions | F(k − 1, N − k) |
//! | [`watson_u2_test`] | identical distributions | asymptotic U² |
//! | [`wheeler_watson_test`] | identical distributions | χ²(2(k − 1)) |
//! | [`wallraff_test`] | equal angular dispersion about a point | normal / χ²(k − 1) |
//! | [`concentration_test`] | equal concentration | F |
//! | [`rao_homogeneity_test`] | equal means and equal dispersions | χ²(k − 1) |

use crate::distributions;
use crate::error::{warn_small_sample, CircularError};
use crate::sample::{Input, Sample};
use crate::special;
use crate::stats::{self, Resultant};

use std::f64::consts::TAU;

fn require_groups(test: &str, k: usize) -> Result<(), CircularError> {
    if k < 2 {
        return Err(CircularError::InvalidParameter(format!(
            "{test} needs at least two samples, got {k}"
        )));
    }
    Ok(())
}

// ============================================================================
// Watson–Williams
// ============================================================================

/// Result of [`watson_williams_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatsonWilliamsResult {
    pub f: f64,
    pub pval: f64,
    /// Pooled concentration κ̂ behind the correction factor.
    pub kappa: f64,
}

tuple_view!(WatsonWilliamsResult => f: f64, pval: f64);

/// Watson–Williams test for equal mean directions of k samples.
///
/// # Algorithm
/// The circular analogue of one-way ANOVA (Zar 2010, §27.4). With Rᵢ the
/// resultant length of sample i, R that of the pooled sample and
/// κ̂ = A₁⁻¹(ΣRᵢ/N),
/// ```text
/// F = K (N − k)(ΣRᵢ − R) / ((k − 1)(N − ΣRᵢ)),   K = 1 + 3/(8κ̂)
/// ```
/// on (k − 1, N − k) degrees of freedom. The test assumes a common,
/// fairly large concentration; a pooled r̄ below 0.45 is flagged.
///
/// Inputs may be raw samples or summaries carrying n, r and the mean.
///
/// # Errors
/// - [`CircularError::InvalidParameter`] for fewer than two samples.
/// - [`CircularError::Degenerate`] when κ̂ is undefined.
///
/// # Examples
/// ```
/// use u_circstat::{Sample, multi_sample::watson_williams_test};
/// let a = Sample::from_degrees(&[94.0, 65.0, 45.0, 52.0, 38.0, 47.0, 73.0, 82.0, 90.0, 40.0, 87.0]).unwrap();
/// let b = Sample::from_degrees(&[77.0, 70.0, 61.0, 45.0, 50.0, 35.0, 48.0, 65.0, 36.0]).unwrap();
/// let res = watson_williams_test([&a, &b]).unwrap();
/// assert!((res.f - 1.61).abs() < 0.01);
/// assert!((res.pval - 0.22).abs() < 0.01);
/// ```
pub fn watson_williams_test<'a, I>(samples: I) -> Result<WatsonWilliamsResult, CircularError>
where
    I: IntoIterator,
    I::Item: Into<Input<'a>>,
{
    let resultants = samples
        .into_iter()
        .map(|s| s.into().resultant())
        .collect::<Result<Vec<Resultant>, _>>()?;
    let k = resultants.len();
    require_groups("watson-williams test", k)?;

    let pooled = resultants
        .iter()
        .fold(Resultant::default(), |acc, r| acc.combine(r));
    let big_n = pooled.n;
    let n_total = big_n.round() as usize;
    CircularError::check_size("watson-williams test", n_total, k + 1)?;

    let sum_r: f64 = resultants.iter().map(Resultant::length).sum();
    let rw = sum_r / big_n;
    if rw < 0.45 {
        log::warn!(
            "watson-williams test: pooled r = {rw:.3} is below 0.45; \
             the equal-concentration F approximation may be unreliable"
        );
    }
    let kappa = stats::estimate_kappa(rw)?;
    let correction = 1.0 + 3.0 / (8.0 * kappa);

    let df1 = (k - 1) as f64;
    let df2 = big_n - k as f64;
    let f = (correction * df2 * (sum_r - pooled.length()) / (df1 * (big_n - sum_r))).max(0.0);

    Ok(WatsonWilliamsResult {
        f,
        pval: special::f_distribution_sf(f, df1, df2),
        kappa,
    })
}

// ============================================================================
// Distribution-free two-sample tests
// ============================================================================

/// Result of [`watson_u2_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatsonU2Result {
    pub u2: f64,
    pub pval: f64,
}

tuple_view!(WatsonU2Result => u2: f64, pval: f64);

/// Watson's two-sample U² test for identical distributions.
///
/// # Algorithm
/// Over the distinct angles of the pooled sample, with dⱼ the difference
/// of the two cumulative relative frequencies and tⱼ the number of tied
/// observations at the angle (Zar 2010, eq. 27.13),
/// ```text
/// U² = n₁n₂/N² · (Σ tⱼdⱼ² − (Σ tⱼdⱼ)²/N)
/// ```
/// Weights act as tie counts, so grouped samples are supported. The
/// p-value is the asymptotic tail [`distributions::watson_u2_sf`].
///
/// Swapping `a` and `b` flips the sign of every dⱼ and leaves U² unchanged.
pub fn watson_u2_test(a: &Sample, b: &Sample) -> Result<WatsonU2Result, CircularError> {
    let (n1, n2) = (a.n() as f64, b.n() as f64);
    let big_n = n1 + n2;

    let mut tagged: Vec<(f64, usize, usize)> = a
        .iter()
        .map(|(x, w)| (x, w, 0))
        .chain(b.iter().map(|(x, w)| (x, 0, w)))
        .collect();
    tagged.sort_by(|p, q| p.0.total_cmp(&q.0));

    let (mut cum1, mut cum2) = (0usize, 0usize);
    let (mut sum_td, mut sum_td2) = (0.0, 0.0);
    let mut i = 0;
    while i < tagged.len() {
        let mut j = i;
        let mut t = 0usize;
        while j < tagged.len() && (tagged[j].0 - tagged[i].0).abs() < 1e-12 {
            cum1 += tagged[j].1;
            cum2 += tagged[j].2;
            t += tagged[j].1 + tagged[j].2;
            j += 1;
        }
        let d = cum1 as f64 / n1 - cum2 as f64 / n2;
        sum_td += t as f64 * d;
        sum_td2 += t as f64 * d * d;
        i = j;
    }

    let u2 = (n1 * n2 / (big_n * big_n) * (sum_td2 - sum_td * sum_td / big_n)).max(0.0);
    Ok(WatsonU2Result {
        u2,
        pval: distributions::watson_u2_sf(u2),
    })
}

/// Result of [`wheeler_watson_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelerWatsonResult {
    pub w: f64,
    pub pval: f64,
}

tuple_view!(WheelerWatsonResult => w: f64, pval: f64);

/// Wheeler–Watson (Mardia–Watson–Wheeler) test for identical
/// distributions of k samples.
///
/// # Algorithm
/// Pooled observations are ranked (ties share the average rank) and
/// replaced by uniform scores βᵢ = 2π·rankᵢ/N. With Cᵢ, Sᵢ the cosine and
/// sine sums of the scores in sample i:
/// - k = 2: W = 2(N − 1)(C₁² + S₁²)/(n₁n₂) (Zar 2010, eq. 27.17)
/// - k ≥ 3: W = 2 Σ (Cᵢ² + Sᵢ²)/nᵢ
///
/// W is referred to χ² with 2(k − 1) degrees of freedom; groups below ten
/// observations are flagged.
pub fn wheeler_watson_test(samples: &[&Sample]) -> Result<WheelerWatsonResult, CircularError> {
    let k = samples.len();
    require_groups("wheeler-watson test", k)?;
    for s in samples {
        warn_small_sample("wheeler-watson test", s.n(), 10);
    }

    let mut pooled: Vec<(f64, usize)> = samples
        .iter()
        .enumerate()
        .flat_map(|(g, s)| s.expanded().into_iter().map(move |a| (a, g)))
        .collect();
    stats::sort_tagged(&mut pooled);
    let ranks = stats::average_ranks(&pooled);
    let big_n = pooled.len() as f64;

    let mut cos_sums = vec![0.0; k];
    let mut sin_sums = vec![0.0; k];
    for (&(_, g), &rank) in pooled.iter().zip(&ranks) {
        let (sin, cos) = (TAU * rank / big_n).sin_cos();
        cos_sums[g] += cos;
        sin_sums[g] += sin;
    }

    let w = if k == 2 {
        let (n1, n2) = (samples[0].n() as f64, samples[1].n() as f64);
        2.0 * (big_n - 1.0) * (cos_sums[0].powi(2) + sin_sums[0].powi(2)) / (n1 * n2)
    } else {
        2.0 * samples
            .iter()
            .enumerate()
            .map(|(g, s)| (cos_sums[g].powi(2) + sin_sums[g].powi(2)) / s.n() as f64)
            .sum::<f64>()
    };

    Ok(WheelerWatsonResult {
        w,
        pval: special::chi_squared_sf(w, 2.0 * (k - 1) as f64),
    })
}

// ============================================================================
// Dispersion tests
// ============================================================================

/// Result of [`wallraff_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallraffResult {
    /// Mann–Whitney U (smaller of U₁, U₂) for two samples, Kruskal–Wallis
    /// H for three or more.
    pub u: f64,
    pub pval: f64,
}

tuple_view!(WallraffResult => u: f64, pval: f64);

/// Wallraff's test for equal angular dispersion about `angle`.
///
/// Each observation is replaced by its angular distance to `angle`
/// (in [0, π]) and the distances are compared by rank: Mann–Whitney with
/// tie and continuity correction for two samples, tie-corrected
/// Kruskal–Wallis for more (Zar 2010, §27.8).
///
/// `verbose` logs per-sample diagnostics at `info` level; it never
/// changes the result.
pub fn wallraff_test(
    samples: &[&Sample],
    angle: f64,
    verbose: bool,
) -> Result<WallraffResult, CircularError> {
    let k = samples.len();
    require_groups("wallraff test", k)?;
    if !angle.is_finite() {
        return Err(CircularError::InvalidParameter(format!(
            "`angle` must be finite, got {angle}"
        )));
    }

    let mut pooled: Vec<(f64, usize)> = samples
        .iter()
        .enumerate()
        .flat_map(|(g, s)| {
            s.expanded()
                .into_iter()
                .map(move |a| (stats::angular_distance(a, angle), g))
        })
        .collect();
    stats::sort_tagged(&mut pooled);
    let ranks = stats::average_ranks(&pooled);
    let ties = stats::tie_correction(&pooled);
    let nf = pooled.len() as f64;

    let mut rank_sums = vec![0.0; k];
    let mut dist_sums = vec![0.0; k];
    for (&(d, g), &rank) in pooled.iter().zip(&ranks) {
        rank_sums[g] += rank;
        dist_sums[g] += d;
    }
    if verbose {
        for (g, s) in samples.iter().enumerate() {
            log::info!(
                "wallraff test: sample {g}: n={}, rank sum={:.1}, mean distance={:.4} rad",
                s.n(),
                rank_sums[g],
                dist_sums[g] / s.n() as f64
            );
        }
    }

    let result = if k == 2 {
        let (n1, n2) = (samples[0].n() as f64, samples[1].n() as f64);
        let u1 = rank_sums[0] - n1 * (n1 + 1.0) / 2.0;
        let mu = n1 * n2 / 2.0;
        let sigma_sq = n1 * n2 / 12.0 * (nf + 1.0 - ties / (nf * (nf - 1.0)));
        let pval = if sigma_sq > 0.0 {
            let z = ((u1 - mu).abs() - 0.5).max(0.0) / sigma_sq.sqrt();
            2.0 * special::standard_normal_cdf(-z)
        } else {
            1.0
        };
        WallraffResult {
            u: u1.min(n1 * n2 - u1),
            pval: pval.clamp(0.0, 1.0),
        }
    } else {
        let mut h = samples
            .iter()
            .enumerate()
            .map(|(g, s)| rank_sums[g] * rank_sums[g] / s.n() as f64)
            .sum::<f64>()
            * 12.0
            / (nf * (nf + 1.0))
            - 3.0 * (nf + 1.0);
        let denom = 1.0 - ties / (nf * nf * nf - nf);
        if denom > 1e-15 {
            h /= denom;
        }
        let h = h.max(0.0);
        WallraffResult {
            u: h,
            pval: special::chi_squared_sf(h, (k - 1) as f64),
        }
    };

    if verbose {
        log::info!(
            "wallraff test: k={k}, N={nf}, statistic={:.4}, p={:.4}",
            result.u,
            result.pval
        );
    }
    Ok(result)
}

/// Result of [`concentration_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcentrationResult {
    /// Variance ratio oriented so that `f_stat ≥ 1`.
    pub f_stat: f64,
    pub pval: f64,
}

tuple_view!(ConcentrationResult => f_stat: f64, pval: f64);

/// F test for equal concentration of two samples.
///
/// # Algorithm
/// ```text
/// F = [(n₁ − R₁)/(n₁ − 1)] / [(n₂ − R₂)/(n₂ − 1)]
/// ```
/// inverted when below 1 (degrees of freedom swap with it), two-tailed
/// p = 2·P(F > f) (Zar 2010, §27.12). Valid for a pooled r̄ of at least
/// 0.70; smaller values are flagged.
///
/// # Errors
/// [`CircularError::Degenerate`] when a sample has r = 1 and the ratio
/// is undefined.
///
/// # Examples
/// ```
/// use u_circstat::{Summary, multi_sample::concentration_test};
/// let a = Summary::new(15, 0.99).unwrap();
/// let b = Summary::new(15, 0.80).unwrap();
/// let res = concentration_test(a, b).unwrap();
/// assert!(res.f_stat > 1.0 && res.pval < 0.001);
/// ```
pub fn concentration_test<'a, 'b>(
    a: impl Into<Input<'a>>,
    b: impl Into<Input<'b>>,
) -> Result<ConcentrationResult, CircularError> {
    let (a, b) = (a.into(), b.into());
    let (n1, n2) = (a.n(), b.n());
    CircularError::check_size("concentration test", n1, 2)?;
    CircularError::check_size("concentration test", n2, 2)?;

    let (n1, n2) = (n1 as f64, n2 as f64);
    let (big_r1, big_r2) = (n1 * a.r(), n2 * b.r());
    let pooled_r = (big_r1 + big_r2) / (n1 + n2);
    if pooled_r < 0.70 {
        log::warn!(
            "concentration test: pooled r = {pooled_r:.3} is below 0.70; \
             the F approximation may be unreliable"
        );
    }

    let var1 = (n1 - big_r1) / (n1 - 1.0);
    let var2 = (n2 - big_r2) / (n2 - 1.0);
    if var1 <= 0.0 || var2 <= 0.0 {
        return Err(CircularError::Degenerate(
            "concentration ratio is undefined when a sample has r = 1",
        ));
    }

    let ratio = var1 / var2;
    let (f_stat, df1, df2) = if ratio >= 1.0 {
        (ratio, n1 - 1.0, n2 - 1.0)
    } else {
        (1.0 / ratio, n2 - 1.0, n1 - 1.0)
    };
    let pval = (2.0 * special::f_distribution_sf(f_stat, df1, df2)).min(1.0);

    Ok(ConcentrationResult { f_stat, pval })
}

// ============================================================================
// Rao homogeneity
// ============================================================================

/// Result of [`rao_homogeneity_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaoHomogeneityResult {
    /// χ² statistic for equal polar (mean) directions.
    pub h_polar: f64,
    pub pval_polar: f64,
    pub reject_polar: bool,
    /// χ² statistic for equal dispersions.
    pub h_disp: f64,
    pub pval_disp: f64,
    pub reject_disp: bool,
}

tuple_view!(RaoHomogeneityResult => pval_polar: f64, pval_disp: f64);

// Per-sample estimate and its variance, as used by Rao's statistics.
struct RaoTerms {
    polar: f64,
    polar_var: f64,
    disp: f64,
    disp_var: f64,
}

fn rao_terms(sample: &Sample) -> Result<RaoTerms, CircularError> {
    let alpha = sample.expanded();
    let n = alpha.len();
    CircularError::check_size("rao homogeneity test", n, 2)?;
    let nf = n as f64;

    let cos: Vec<f64> = alpha.iter().map(|a| a.cos()).collect();
    let sin: Vec<f64> = alpha.iter().map(|a| a.sin()).collect();
    let x_bar = stats::kahan_sum(&cos) / nf;
    let y_bar = stats::kahan_sum(&sin) / nf;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (c, s) in cos.iter().zip(&sin) {
        let (dx, dy) = (c - x_bar, s - y_bar);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let (sxx, syy, sxy) = (sxx / (nf - 1.0), syy / (nf - 1.0), sxy / (nf - 1.0));

    if x_bar.abs() < 1e-12 {
        return Err(CircularError::Degenerate(
            "mean cosine is zero; the polar statistic is undefined",
        ));
    }
    let polar = y_bar / x_bar;
    let polar_var = (syy / x_bar.powi(2) + y_bar.powi(2) * sxx / x_bar.powi(4)
        - 2.0 * y_bar * sxy / x_bar.powi(3))
        / nf;
    let disp = x_bar * x_bar + y_bar * y_bar;
    let disp_var = 4.0 / nf * (x_bar * x_bar * sxx + y_bar * y_bar * syy + 2.0 * x_bar * y_bar * sxy);

    if !(polar_var > 0.0 && disp_var > 0.0) {
        return Err(CircularError::Degenerate(
            "a sample has zero variance; Rao's statistics are undefined",
        ));
    }
    Ok(RaoTerms {
        polar,
        polar_var,
        disp,
        disp_var,
    })
}

// Σv²/s − (Σv/s)²/Σ(1/s): weighted squared deviation from the pooled value.
fn rao_h(values: impl Iterator<Item = (f64, f64)> + Clone) -> f64 {
    let a: f64 = values.clone().map(|(v, s)| v * v / s).sum();
    let b: f64 = values.clone().map(|(v, s)| v / s).sum();
    let c: f64 = values.map(|(_, s)| 1.0 / s).sum();
    (a - b * b / c).max(0.0)
}

/// Rao's test for homogeneity of k samples: equal mean directions (polar)
/// and equal dispersions.
///
/// # Algorithm
/// Rao (1967), as given by Jammalamadaka & SenGupta (2001), §7.6.1. Per
/// sample, with x̄, ȳ the mean cosine and sine and sample (co)variances
/// s²ₓ, s²ᵧ, sₓᵧ:
/// ```text
/// Uᵢ = ȳ/x̄        s²(Uᵢ) = (s²ᵧ/x̄² + ȳ²s²ₓ/x̄⁴ − 2ȳsₓᵧ/x̄³)/n
/// Wᵢ = x̄² + ȳ²    s²(Wᵢ) = 4(x̄²s²ₓ + ȳ²s²ᵧ + 2x̄ȳsₓᵧ)/n
/// H = Σ Vᵢ²/sᵢ² − (Σ Vᵢ/sᵢ²)² / Σ 1/sᵢ²
/// ```
/// Both H statistics are χ² with k − 1 degrees of freedom. `reject_*` is
/// `pval < significance`.
///
/// # Errors
/// - [`CircularError::InvalidParameter`] for fewer than two samples or
///   `significance ∉ (0, 1)`.
/// - [`CircularError::Degenerate`] for a sample with zero mean cosine or
///   zero variance.
pub fn rao_homogeneity_test(
    samples: &[&Sample],
    significance: f64,
) -> Result<RaoHomogeneityResult, CircularError> {
    let k = samples.len();
    require_groups("rao homogeneity test", k)?;
    if !(significance > 0.0 && significance < 1.0) {
        return Err(CircularError::InvalidParameter(format!(
            "significance must lie in (0, 1), got {significance}"
        )));
    }

    let terms = samples
        .iter()
        .map(|s| rao_terms(s))
        .collect::<Result<Vec<_>, _>>()?;
    let df = (k - 1) as f64;

    let h_polar = rao_h(terms.iter().map(|t| (t.polar, t.polar_var)));
    let h_disp = rao_h(terms.iter().map(|t| (t.disp, t.disp_var)));
    let pval_polar = special::chi_squared_sf(h_polar, df);
    let pval_disp = special::chi_squared_sf(h_disp, df);

    Ok(RaoHomogeneityResult {
        h_polar,
        pval_polar,
        reject_polar: pval_polar < significance,
        h_disp,
        pval_disp,
        reject_disp: pval_disp < significance,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Summary;

    fn deg(values: &[f64]) -> Sample {
        Sample::from_degrees(values).unwrap()
    }

    fn zar_d10() -> (Sample, Sample) {
        (
            deg(&[94.0, 65.0, 45.0, 52.0, 38.0, 47.0, 73.0, 82.0, 90.0, 40.0, 87.0]),
            deg(&[77.0, 70.0, 61.0, 45.0, 50.0, 35.0, 48.0, 65.0, 36.0]),
        )
    }

    fn zar_d12() -> (Sample, Sample) {
        (
            deg(&[35.0, 45.0, 50.0, 55.0, 60.0, 70.0, 85.0, 95.0, 105.0, 120.0]),
            deg(&[75.0, 80.0, 90.0, 100.0, 110.0, 130.0, 135.0, 140.0, 150.0, 155.0, 165.0]),
        )
    }

    fn three_groups() -> [Sample; 3] {
        [
            deg(&[135.0, 145.0, 125.0, 140.0, 165.0, 170.0]),
            deg(&[150.0, 130.0, 175.0, 190.0, 180.0, 220.0]),
            deg(&[140.0, 165.0, 185.0, 215.0, 230.0, 180.0]),
        ]
    }

    // Evenly spread points on an arc of half-width `spread` about `mu`.
    fn arc(n: usize, mu: f64, spread: f64, delta: f64) -> Sample {
        let alpha: Vec<f64> = (0..n)
            .map(|j| mu + spread * (-1.0 + (2 * j + 1) as f64 / n as f64 + delta / n as f64))
            .collect();
        Sample::new(alpha).unwrap()
    }

    // --- Watson–Williams ---

    #[test]
    fn test_watson_williams_two_samples() {
        let (a, b) = zar_d10();
        let res = watson_williams_test([&a, &b]).unwrap();
        assert!((res.f - 1.61277).abs() < 1e-3, "F = {}", res.f);
        assert!((res.pval - 0.22027).abs() < 1e-3, "p = {}", res.pval);
        assert!((res.kappa - 10.7911).abs() < 1e-2, "κ = {}", res.kappa);
    }

    #[test]
    fn test_watson_williams_three_samples() {
        let [a, b, c] = three_groups();
        let res = watson_williams_test([&a, &b, &c]).unwrap();
        assert!((res.f - 3.13316).abs() < 1e-3, "F = {}", res.f);
        assert!((res.pval - 0.07294).abs() < 1e-3, "p = {}", res.pval);
    }

    #[test]
    fn test_watson_williams_from_summaries() {
        let (a, b) = zar_d10();
        let raw = watson_williams_test([&a, &b]).unwrap();
        let summaries: Vec<Summary> = [&a, &b]
            .iter()
            .map(|s| {
                let res = s.resultant();
                Summary::new(s.n(), res.mean_resultant_length())
                    .unwrap()
                    .with_mean(res.mean_direction().unwrap())
            })
            .collect();
        let from_summary = watson_williams_test(summaries).unwrap();
        assert!((raw.f - from_summary.f).abs() < 1e-9);
        assert!((raw.pval - from_summary.pval).abs() < 1e-9);
    }

    #[test]
    fn test_watson_williams_needs_two_samples() {
        let (a, _) = zar_d10();
        assert!(matches!(
            watson_williams_test([&a]),
            Err(CircularError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_watson_williams_summary_without_mean() {
        let (a, _) = zar_d10();
        let bare = Summary::new(9, 0.8).unwrap();
        let inputs: [Input; 2] = [(&a).into(), bare.into()];
        assert_eq!(
            watson_williams_test(inputs).unwrap_err(),
            CircularError::MissingField("mean")
        );
    }

    // --- Watson U² ---

    #[test]
    fn test_watson_u2_zar_example() {
        let (a, b) = zar_d12();
        let res = watson_u2_test(&a, &b).unwrap();
        assert!((res.u2 - 0.1458).abs() < 1e-4, "U² = {}", res.u2);
        assert!(res.pval > 0.1 && res.pval < 0.2, "p = {}", res.pval);
        assert!((res.pval - 0.112603).abs() < 1e-4);
    }

    #[test]
    fn test_watson_u2_weights_match_expansion() {
        let a = Sample::weighted(vec![0.2, 0.5, 1.0], vec![2, 3, 1]).unwrap();
        let b = Sample::weighted(vec![0.5, 1.4, 2.0], vec![1, 2, 2]).unwrap();
        let grouped = watson_u2_test(&a, &b).unwrap();
        let flat = watson_u2_test(
            &Sample::new(a.expanded()).unwrap(),
            &Sample::new(b.expanded()).unwrap(),
        )
        .unwrap();
        assert!((grouped.u2 - flat.u2).abs() < 1e-12);
    }

    #[test]
    fn test_watson_u2_identical_samples() {
        let (a, _) = zar_d12();
        let res = watson_u2_test(&a, &a).unwrap();
        assert!(res.u2.abs() < 1e-12);
        assert_eq!(res.pval, 1.0);
    }

    // --- Wheeler–Watson ---

    #[test]
    fn test_wheeler_watson_two_samples() {
        let (a, b) = zar_d12();
        let res = wheeler_watson_test(&[&a, &b]).unwrap();
        assert!((res.w - 3.678).abs() < 1e-3, "W = {}", res.w);
        assert!(res.pval > 0.1 && res.pval < 0.25, "p = {}", res.pval);
    }

    #[test]
    fn test_wheeler_watson_three_samples() {
        let [a, b, c] = three_groups();
        let res = wheeler_watson_test(&[&a, &b, &c]).unwrap();
        assert!((res.w - 4.70187).abs() < 1e-4, "W = {}", res.w);
        assert!((res.pval - 0.31928).abs() < 1e-4, "p = {}", res.pval);
    }

    // --- Wallraff ---

    fn wallraff_groups() -> (Sample, Sample) {
        (
            deg(&[105.0, 120.0, 135.0, 145.0, 155.0, 160.0, 180.0, 200.0]),
            deg(&[85.0, 110.0, 125.0, 135.0, 150.0, 170.0, 175.0, 190.0, 210.0, 240.0]),
        )
    }

    #[test]
    fn test_wallraff_two_groups() {
        let (male, female) = wallraff_groups();
        let res = wallraff_test(&[&male, &female], 135f64.to_radians(), false).unwrap();
        assert!((res.u - 29.0).abs() < 1e-9, "U = {}", res.u);
        assert!((res.pval - 0.34985).abs() < 1e-4, "p = {}", res.pval);
        assert!(res.pval > 0.2);
    }

    #[test]
    fn test_wallraff_verbose_does_not_change_result() {
        let (male, female) = wallraff_groups();
        let quiet = wallraff_test(&[&male, &female], 135f64.to_radians(), false).unwrap();
        let loud = wallraff_test(&[&male, &female], 135f64.to_radians(), true).unwrap();
        assert_eq!(quiet, loud);
    }

    #[test]
    fn test_wallraff_three_groups() {
        let (male, female) = wallraff_groups();
        let tight = deg(&[130.0, 135.0, 140.0, 138.0, 132.0, 136.0, 134.0, 139.0]);
        let res = wallraff_test(&[&male, &female, &tight], 135f64.to_radians(), false).unwrap();
        assert!((res.u - 10.6026).abs() < 1e-3, "H = {}", res.u);
        assert!((res.pval - 0.004985).abs() < 1e-5, "p = {}", res.pval);
    }

    // --- Concentration ---

    #[test]
    fn test_concentration_differs() {
        let tight = arc(15, 0.5, 0.15, 0.0);
        let loose = arc(15, 0.5, 0.9, 0.0);
        let res = concentration_test(&tight, &loose).unwrap();
        assert!((res.f_stat - 34.6227).abs() < 1e-3, "F = {}", res.f_stat);
        assert!((res.pval - 4.06e-8).abs() < 1e-9, "p = {}", res.pval);

        let swapped = concentration_test(&loose, &tight).unwrap();
        assert!((swapped.f_stat - res.f_stat).abs() < 1e-9);
        assert!((swapped.pval - res.pval).abs() < 1e-12);
    }

    #[test]
    fn test_concentration_equal() {
        let tight = arc(15, 0.5, 0.15, 0.0);
        let mut reversed = tight.alpha().to_vec();
        reversed.reverse();
        let res = concentration_test(&tight, &Sample::new(reversed).unwrap()).unwrap();
        assert!((res.f_stat - 1.0).abs() < 1e-9);
        assert!(res.pval > 0.999);
    }

    #[test]
    fn test_concentration_degenerate() {
        let a = Summary::new(10, 1.0).unwrap();
        let b = Summary::new(10, 0.8).unwrap();
        assert!(matches!(
            concentration_test(a, b),
            Err(CircularError::Degenerate(_))
        ));
    }

    // --- Rao homogeneity ---

    #[test]
    fn test_rao_homogeneity_same_distribution() {
        let samples: Vec<Sample> = [0.0, 0.3, 0.6].iter().map(|&d| arc(20, 0.0, 0.8, d)).collect();
        let refs: Vec<&Sample> = samples.iter().collect();
        let res = rao_homogeneity_test(&refs, 0.05).unwrap();
        assert!(res.pval_polar > 0.05, "p_polar = {}", res.pval_polar);
        assert!(res.pval_disp > 0.05, "p_disp = {}", res.pval_disp);
        assert!(!res.reject_polar && !res.reject_disp);
    }

    #[test]
    fn test_rao_homogeneity_differing_mean() {
        let a = arc(20, 0.0, 0.8, 0.0);
        let b = arc(20, 0.0, 0.8, 0.3);
        let c = arc(20, 0.6, 0.8, 0.6);
        let res = rao_homogeneity_test(&[&a, &b, &c], 0.05).unwrap();
        assert!((res.h_polar - 14.834).abs() < 1e-2, "H = {}", res.h_polar);
        assert!(res.pval_polar < 0.05, "p_polar = {}", res.pval_polar);
        assert!(res.reject_polar);
        assert!(res.pval_disp > 0.05);
    }

    #[test]
    fn test_rao_homogeneity_differing_concentration() {
        let a = arc(20, 0.3, 0.5, 0.0);
        let b = arc(20, 0.3, 0.5, 0.3);
        let c = arc(20, 0.3, 2.0, 0.6);
        let res = rao_homogeneity_test(&[&a, &b, &c], 0.05).unwrap();
        assert!(res.pval_disp < 0.05, "p_disp = {}", res.pval_disp);
        assert!((res.h_disp - 57.995).abs() < 1e-2, "H = {}", res.h_disp);
        assert!(res.pval_polar > 0.05);
    }

    #[test]
    fn test_rao_homogeneity_validation() {
        let a = arc(20, 0.0, 0.8, 0.0);
        assert!(matches!(
            rao_homogeneity_test(&[&a], 0.05),
            Err(CircularError::InvalidParameter(_))
        ));
        assert!(matches!(
            rao_homogeneity_test(&[&a, &a], 1.5),
            Err(CircularError::InvalidParameter(_))
        ));
        let constant = Sample::new(vec![0.4; 5]).unwrap();
        assert!(matches!(
            rao_homogeneity_test(&[&a, &constant], 0.05),
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

    fn draw(mu: f64, kappa: f64, n: usize, seed: u64) -> Sample {
        let mut rng = create_rng(seed);
        Sample::new(VonMises::new(mu, kappa).unwrap().samples(n, &mut rng)).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn watson_williams_order_invariant(
            seed in 0_u64..10_000,
            shift in 0.0_f64..1.0,
            n1 in 5_usize..30,
            n2 in 5_usize..30,
            n3 in 5_usize..30,
        ) {
            let a = draw(0.0, 4.0, n1, seed);
            let b = draw(shift, 4.0, n2, seed + 1);
            let c = draw(2.0 * shift, 4.0, n3, seed + 2);
            let abc = watson_williams_test([&a, &b, &c]).unwrap();
            let cab = watson_williams_test([&c, &a, &b]).unwrap();
            prop_assert!((abc.f - cab.f).abs() < 1e-9 * abc.f.max(1.0));
            prop_assert!((abc.pval - cab.pval).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&abc.pval));
        }

        #[test]
        fn watson_u2_order_invariant(
            seed in 0_u64..10_000,
            n1 in 3_usize..40,
            n2 in 3_usize..40,
            kappa in 0.0_f64..5.0,
        ) {
            let a = draw(0.0, kappa, n1, seed);
            let b = draw(1.0, kappa, n2, seed + 7);
            let ab = watson_u2_test(&a, &b).unwrap();
            let ba = watson_u2_test(&b, &a).unwrap();
            prop_assert!((ab.u2 - ba.u2).abs() < 1e-12);
            prop_assert!((ab.pval - ba.pval).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&ab.pval));
        }

        #[test]
        fn multi_sample_pvalues_in_unit_interval(
            seed in 0_u64..10_000,
            n1 in 4_usize..25,
            n2 in 4_usize..25,
            angle in 0.0_f64..std::f64::consts::TAU,
        ) {
            let a = draw(0.5, 3.0, n1, seed);
            let b = draw(1.5, 1.0, n2, seed + 3);
            let ww = wheeler_watson_test(&[&a, &b]).unwrap();
            let wf = wallraff_test(&[&a, &b], angle, false).unwrap();
            prop_assert!((0.0..=1.0).contains(&ww.pval));
            prop_assert!((0.0..=1.0).contains(&wf.pval));
            if let Ok(c) = concentration_test(&a, &b) {
                prop_assert!((0.0..=1.0).contains(&c.pval) && c.f_stat >= 1.0);
            }
        }
    }
}
