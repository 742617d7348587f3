//! Douglas-Rachford splitting for the joint proximal map of the low-rank component.
//!
//! ** NOTE: We recommend using the high-level method [`crate::solvers::decompose`] instead.
//! This module is intended for use cases where a single inner step has to be inspected.
//!
//! Each outer iteration needs the proximal map of `λ_d‖·‖_* + ι_box` at the low-rank
//! proposal. Neither penalty has a closed-form joint prox, but each one alone does, so the
//! map is found by Douglas-Rachford splitting. The auxiliary matrices `P` and `Q` accumulate
//! the residual of each half-step, which drives both half-steps to a common fixed point
//! instead of letting them oscillate between the two constraint sets:
//!
//! ```text
//! Y = shrink_*(X + P, λ_d·λ)
//! P = X + P - Y
//! X = box(Y + Q, α)
//! Q = Y + Q - X
//! ```
//!
//! The sparse component needs no splitting: its proximal map is one soft-thresholding step.

use super::frobenius_distance;
use crate::{
    config::DecompositionConfig,
    error::DecompositionError,
    prox::{box_project, nuclear_shrink, soft_threshold},
};
use faer::{Mat, MatRef};

/// State of one Douglas-Rachford run `{X, P, Q}`.
///
/// A fresh state is created for every outer iteration and dropped once the inner loop
/// terminates.
#[derive(Debug, Clone)]
pub struct SplittingState {
    x: Mat<f64>,
    p: Mat<f64>,
    q: Mat<f64>,
    iterations: usize,
}

impl SplittingState {
    /// Starts the splitting at `proposal` with both residuals set to zero.
    pub fn new(proposal: Mat<f64>) -> Self {
        let (nrows, ncols) = (proposal.nrows(), proposal.ncols());
        Self {
            x: proposal,
            p: Mat::zeros(nrows, ncols),
            q: Mat::zeros(nrows, ncols),
            iterations: 0,
        }
    }

    /// Performs one splitting iteration and returns `‖X_new - X_old‖_F`.
    pub fn step(&mut self, nuclear_threshold: f64, alpha: f64) -> Result<f64, DecompositionError> {
        let shifted = &self.x + &self.p;
        let low_rank = nuclear_shrink(shifted.as_ref(), nuclear_threshold)?;
        self.p = &shifted - &low_rank;

        let reflected = &low_rank + &self.q;
        let boxed = box_project(reflected.as_ref(), alpha);
        self.q = &reflected - &boxed;

        let step_norm = frobenius_distance(boxed.as_ref(), self.x.as_ref());
        self.x = boxed;
        self.iterations += 1;
        Ok(step_norm)
    }

    /// Stopping predicate of the inner loop.
    #[inline]
    pub fn has_converged(step_norm: f64, config: &DecompositionConfig) -> bool {
        step_norm < config.inner_tolerance
    }

    /// Current iterate. It always lies inside the magnitude box once a step was taken.
    pub fn x(&self) -> MatRef<'_, f64> {
        self.x.as_ref()
    }

    pub fn p(&self) -> MatRef<'_, f64> {
        self.p.as_ref()
    }

    pub fn q(&self) -> MatRef<'_, f64> {
        self.q.as_ref()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn into_solution(self) -> Mat<f64> {
        self.x
    }
}

/// Result of [`joint_prox`].
#[derive(Debug, Clone)]
pub struct ProxOutcome {
    /// The next low-rank iterate, inside the magnitude box.
    pub low_rank: Mat<f64>,
    /// The next sparse iterate.
    pub sparse: Mat<f64>,
    /// Number of Douglas-Rachford iterations performed.
    pub inner_iterations: usize,
    /// Whether the inner tolerance was reached before the inner cap.
    pub converged: bool,
}

/// Computes the joint proximal map for one outer iteration.
///
/// `low_rank_proposal` is the gradient step taken from the low-rank extrapolation and
/// feeds the nuclear-norm/box branch. `sparse_proposal` is the gradient step taken from
/// the sparse extrapolation and is soft-thresholded once.
///
/// Hitting `inner_max_iterations` is not an error: the last iterate is returned with
/// `converged == false`.
pub fn joint_prox(
    low_rank_proposal: Mat<f64>,
    sparse_proposal: MatRef<'_, f64>,
    config: &DecompositionConfig,
) -> Result<ProxOutcome, DecompositionError> {
    let nuclear_threshold = config.nuclear_threshold();
    let mut state = SplittingState::new(low_rank_proposal);
    let mut converged = false;

    for _ in 0..config.inner_max_iterations {
        let step_norm = state.step(nuclear_threshold, config.alpha)?;
        if SplittingState::has_converged(step_norm, config) {
            converged = true;
            break;
        }
    }
    log::trace!(
        "Douglas-Rachford splitting stopped after {} iterations (converged: {converged})",
        state.iterations()
    );

    let inner_iterations = state.iterations();
    Ok(ProxOutcome {
        low_rank: state.into_solution(),
        sparse: soft_threshold(sparse_proposal, config.sparse_threshold()),
        inner_iterations,
        converged,
    })
}
