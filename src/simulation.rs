//! Monte Carlo p-values for statistics without a closed-form null
//! distribution.
//!
//! The engine draws uniform circular samples of the observed size,
//! recomputes the statistic on each and reports the proportion of
//! simulated values at least as large as the observed one.
//!
//! # Reproducibility
//!
//! The generator is an argument, never engine state. The p-value is an
//! integer count divided by `n_simulation`, so it does not depend on any
//! floating-point accumulation order.

use rand::Rng;

use crate::error::CircularError;
use crate::random;

/// Default number of Monte Carlo replicates.
pub const DEFAULT_SIMULATIONS: usize = 9999;

/// Monte Carlo configuration.
///
/// `n_simulation` bounds the cost of a simulated test: work is linear in
/// it.
///
/// # Examples
/// ```
/// use u_circstat::simulation::MonteCarlo;
/// use u_circstat::random::create_rng;
///
/// let mc = MonteCarlo::new(500).unwrap();
/// let mut rng = create_rng(1);
/// // statistic: largest angle; P(max ≥ 0) = 1
/// let p = mc.p_value(10, 0.0, &mut rng, |alpha| alpha.iter().cloned().fold(0.0, f64::max));
/// assert_eq!(p, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarlo {
    n_simulation: usize,
}

impl Default for MonteCarlo {
    fn default() -> Self {
        Self {
            n_simulation: DEFAULT_SIMULATIONS,
        }
    }
}

impl MonteCarlo {
    /// Creates a configuration with `n_simulation` replicates.
    ///
    /// # Errors
    /// [`CircularError::InvalidParameter`] if `n_simulation == 0`.
    pub fn new(n_simulation: usize) -> Result<Self, CircularError> {
        if n_simulation == 0 {
            return Err(CircularError::InvalidParameter(
                "n_simulation must be at least 1".into(),
            ));
        }
        Ok(Self { n_simulation })
    }

    pub fn n_simulation(&self) -> usize {
        self.n_simulation
    }

    /// Estimates `P(T ≥ observed)` under uniformity for samples of size `n`.
    ///
    /// `statistic` receives a scratch buffer of `n` uniform angles that it
    /// may reorder in place; the buffer is refilled before every replicate.
    pub fn p_value<R, F>(&self, n: usize, observed: f64, rng: &mut R, mut statistic: F) -> f64
    where
        R: Rng,
        F: FnMut(&mut [f64]) -> f64,
    {
        let mut buf = vec![0.0; n];
        let mut exceed = 0usize;
        for _ in 0..self.n_simulation {
            random::fill_uniform_angles(&mut buf, rng);
            if statistic(&mut buf) >= observed {
                exceed += 1;
            }
        }
        let p = exceed as f64 / self.n_simulation as f64;
        log::debug!(
            "monte carlo: n={n}, replicates={}, observed={observed:.6}, exceed={exceed}, p={p:.6}",
            self.n_simulation
        );
        p
    }
}

// ============================================================================
// Tests
// ============================================================================
