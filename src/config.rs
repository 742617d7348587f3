//! Hyperparameters of a decomposition run.
//!
//! All tunable knobs of both iterative loops live in [`DecompositionConfig`], including
//! the iteration caps and convergence tolerances. The defaults reproduce the reference
//! parametrisation: `lambda_d = 0.025`, `mu_d = 0.005`, `alpha = 20` and at most
//! 1000 outer iterations.

use crate::error::{DecompositionError, DecompositionErrorKind};
use serde::{Deserialize, Serialize};

/// Default strength of the nuclear-norm penalty on the low-rank component.
pub const DEFAULT_LAMBDA_D: f64 = 0.025;
/// Default strength of the l1 penalty on the sparse component.
pub const DEFAULT_MU_D: f64 = 0.005;
/// Default magnitude cap on the low-rank component, before normalisation.
pub const DEFAULT_ALPHA: f64 = 20.0;
/// Default cap on the number of accelerated gradient iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Configuration of the accelerated proximal gradient solver and of its inner
/// Douglas-Rachford splitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionConfig {
    /// Regularisation strength of the nuclear norm (`λ_d`).
    pub lambda_d: f64,
    /// Regularisation strength of the l1 norm (`μ_d`).
    pub mu_d: f64,
    /// Magnitude cap of the low-rank component. Entries of Θ are confined to
    /// `±alpha / sqrt(d1 * d2)`, so larger matrices need larger values.
    pub alpha: f64,
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Proximal step size `λ` used by both penalties.
    pub step_size: f64,
    /// The outer loop stops once `‖ΔΘ‖_F + ‖ΔΓ‖_F` falls below this value.
    pub outer_tolerance: f64,
    /// Maximum number of Douglas-Rachford iterations per outer step.
    pub inner_max_iterations: usize,
    /// The inner loop stops once `‖ΔX‖_F` falls below this value.
    pub inner_tolerance: f64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            lambda_d: DEFAULT_LAMBDA_D,
            mu_d: DEFAULT_MU_D,
            alpha: DEFAULT_ALPHA,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_size: 0.5,
            outer_tolerance: 1e-2,
            inner_max_iterations: 500,
            inner_tolerance: 1e-4,
        }
    }
}

impl DecompositionConfig {
    pub fn with_lambda_d(mut self, lambda_d: f64) -> Self {
        self.lambda_d = lambda_d;
        self
    }

    pub fn with_mu_d(mut self, mu_d: f64) -> Self {
        self.mu_d = mu_d;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_outer_tolerance(mut self, outer_tolerance: f64) -> Self {
        self.outer_tolerance = outer_tolerance;
        self
    }

    pub fn with_inner_limits(mut self, inner_max_iterations: usize, inner_tolerance: f64) -> Self {
        self.inner_max_iterations = inner_max_iterations;
        self.inner_tolerance = inner_tolerance;
        self
    }

    /// Threshold applied to the singular values at each inner iteration.
    #[inline]
    pub fn nuclear_threshold(&self) -> f64 {
        self.lambda_d * self.step_size
    }

    /// Threshold applied to the entries of the sparse proposal.
    #[inline]
    pub fn sparse_threshold(&self) -> f64 {
        self.mu_d * self.step_size
    }

    /// Checks that every scalar is positive and finite and that both loops may run.
    pub fn validate(&self) -> Result<(), DecompositionError> {
        let scalars = [
            ("lambda_d", self.lambda_d),
            ("mu_d", self.mu_d),
            ("alpha", self.alpha),
            ("step_size", self.step_size),
            ("outer_tolerance", self.outer_tolerance),
            ("inner_tolerance", self.inner_tolerance),
        ];
        for (name, value) in scalars {
            if !(value.is_finite() && value > 0.0) {
                return Err(DecompositionErrorKind::InvalidParameter(format!(
                    "`{name}` must be positive and finite, got {value}"
                ))
                .into());
            }
        }
        if self.max_iterations == 0 {
            return Err(DecompositionErrorKind::InvalidParameter(
                "`max_iterations` must be at least 1".to_string(),
            )
            .into());
        }
        if self.inner_max_iterations == 0 {
            return Err(DecompositionErrorKind::InvalidParameter(
                "`inner_max_iterations` must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
