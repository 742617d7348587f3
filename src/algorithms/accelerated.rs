//! Accelerated proximal gradient (FISTA) over the pair (Θ, Γ).
//!
//! ** NOTE: We recommend using the high-level method [`crate::solvers::decompose`] instead.
//! This module is intended for use cases where fine-grained control over the outer loop
//! is required, e.g. stepping it manually or benchmarking a single iteration.
//!
//! The smooth part of the objective is `½‖M ⊙ (Θ + Γ - Y)‖²_F`. Both components enter it
//! additively, so they share one gradient. Every iteration:
//!
//! 1. advances the momentum `t ← (1 + √(1 + 4t²)) / 2`;
//! 2. extrapolates `Z = Θ + β(Θ - Θ_last)` and `N = Γ + β(Γ - Γ_last)` with
//!    `β = (t_last - 1) / t`;
//! 3. forms the masked gradient `f = ½ M ⊙ (Z + N - Y)`;
//! 4. delegates the proposals `(Z - f, N - f)` to [`joint_prox`].
//!
//! Unobserved entries get a zero gradient, so the values of `Y` there never reach the
//! iterates.

use super::{
    IterationReport, frobenius_distance,
    splitting::{ProxOutcome, joint_prox},
};
use crate::{config::DecompositionConfig, error::DecompositionError};
use faer::{Mat, MatRef};

/// Returns true when entry `(i, j)` takes part in the data-fidelity term.
#[inline]
pub(crate) fn is_observed(mask: Option<MatRef<'_, f64>>, i: usize, j: usize) -> bool {
    mask.is_none_or(|m| m[(i, j)] != 0.0)
}

/// `current + beta * (current - last)`
fn extrapolate(current: MatRef<'_, f64>, last: MatRef<'_, f64>, beta: f64) -> Mat<f64> {
    Mat::from_fn(current.nrows(), current.ncols(), |i, j| {
        current[(i, j)] + beta * (current[(i, j)] - last[(i, j)])
    })
}

/// State of the outer loop `{Θ, Γ, Θ_last, Γ_last, t}`.
#[derive(Debug, Clone)]
pub struct AcceleratedState {
    theta: Mat<f64>,
    gamma: Mat<f64>,
    theta_last: Mat<f64>,
    gamma_last: Mat<f64>,
    momentum: f64,
    iterations: usize,
}

impl AcceleratedState {
    /// Zero iterates and unit momentum.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            theta: Mat::zeros(nrows, ncols),
            gamma: Mat::zeros(nrows, ncols),
            theta_last: Mat::zeros(nrows, ncols),
            gamma_last: Mat::zeros(nrows, ncols),
            momentum: 1.0,
            iterations: 0,
        }
    }

    /// Performs one accelerated proximal gradient iteration against `y`.
    ///
    /// The caller is responsible for shapes: `y` and `mask` must match the state. The
    /// public entry points validate this before the first step.
    pub fn step(
        &mut self,
        y: MatRef<'_, f64>,
        mask: Option<MatRef<'_, f64>>,
        config: &DecompositionConfig,
    ) -> Result<IterationReport, DecompositionError> {
        let t_last = self.momentum;
        let t = (1.0 + (1.0 + 4.0 * t_last * t_last).sqrt()) / 2.0;
        let beta = (t_last - 1.0) / t;

        let z = extrapolate(self.theta.as_ref(), self.theta_last.as_ref(), beta);
        let n = extrapolate(self.gamma.as_ref(), self.gamma_last.as_ref(), beta);

        let gradient = Mat::from_fn(y.nrows(), y.ncols(), |i, j| {
            if is_observed(mask, i, j) {
                0.5 * (z[(i, j)] + n[(i, j)] - y[(i, j)])
            } else {
                0.0
            }
        });
        let low_rank_proposal = &z - &gradient;
        let sparse_proposal = &n - &gradient;

        let ProxOutcome {
            low_rank,
            sparse,
            inner_iterations,
            converged: inner_converged,
        } = joint_prox(low_rank_proposal, sparse_proposal.as_ref(), config)?;

        self.theta_last = std::mem::replace(&mut self.theta, low_rank);
        self.gamma_last = std::mem::replace(&mut self.gamma, sparse);
        self.momentum = t;
        self.iterations += 1;

        let step_norm = frobenius_distance(self.theta.as_ref(), self.theta_last.as_ref())
            + frobenius_distance(self.gamma.as_ref(), self.gamma_last.as_ref());

        Ok(IterationReport {
            iteration: self.iterations,
            step_norm,
            momentum: t,
            inner_iterations,
            inner_converged,
        })
    }

    /// Stopping predicate of the outer loop.
    #[inline]
    pub fn has_converged(report: &IterationReport, config: &DecompositionConfig) -> bool {
        report.step_norm < config.outer_tolerance
    }

    /// Current low-rank iterate Θ.
    pub fn theta(&self) -> MatRef<'_, f64> {
        self.theta.as_ref()
    }

    /// Current sparse iterate Γ.
    pub fn gamma(&self) -> MatRef<'_, f64> {
        self.gamma.as_ref()
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Consumes the state, returning `(Θ, Γ)`.
    pub fn into_parts(self) -> (Mat<f64>, Mat<f64>) {
        (self.theta, self.gamma)
    }
}
