//! The two iterative loops of the decomposition, exposed as explicit state machines.
//!
//! - [`accelerated`]: the outer FISTA loop over `(Θ, Γ)`, state [`AcceleratedState`].
//! - [`splitting`]: the inner Douglas-Rachford loop computing the joint proximal map of
//!   the nuclear norm and the magnitude box, state [`SplittingState`].
//!
//! Each state exposes a single-step transition (`step`) and a stopping predicate
//! (`has_converged`), so one iteration of either loop can be driven and tested on its own.

pub mod accelerated;
pub mod splitting;

pub use accelerated::AcceleratedState;
pub use splitting::{ProxOutcome, SplittingState, joint_prox};

use crate::{config::DecompositionConfig, error::DecompositionError, prox::nuclear_norm};
use faer::{Mat, MatRef};
use serde::Serialize;

/// Summary of one outer iteration, handed to monitoring callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// 1-based index of the iteration that just completed.
    pub iteration: usize,
    /// `‖Θ - Θ_last‖_F + ‖Γ - Γ_last‖_F`
    pub step_norm: f64,
    /// Momentum coefficient `t` after the update.
    pub momentum: f64,
    /// Douglas-Rachford iterations spent on this step.
    pub inner_iterations: usize,
    /// Whether the inner loop reached its tolerance.
    pub inner_converged: bool,
}

/// Why the outer loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// The combined step norm fell below the outer tolerance.
    Converged,
    /// `max_iterations` was reached first. The last iterate is returned as is.
    IterationLimit,
    /// A monitoring callback asked for an early stop.
    Callback,
}

/// Callback invoked after each outer iteration. Returning `false` stops the run.
pub type DecompositionCallback<'a> = dyn FnMut(&IterationReport, &AcceleratedState) -> bool + 'a;

#[inline]
pub(crate) fn frobenius_distance(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> f64 {
    (a - b).norm_l2()
}

/// Evaluates `½‖M ⊙ (Θ + Γ - Y)‖²_F + λ_d‖Θ‖_* + μ_d‖Γ‖₁`.
///
/// The box constraint on Θ is not part of the value; callers can check it separately
/// with [`crate::prox::box_limit`].
pub fn objective(
    y: MatRef<'_, f64>,
    mask: Option<MatRef<'_, f64>>,
    theta: MatRef<'_, f64>,
    gamma: MatRef<'_, f64>,
    config: &DecompositionConfig,
) -> Result<f64, DecompositionError> {
    let residual = Mat::from_fn(y.nrows(), y.ncols(), |i, j| {
        if accelerated::is_observed(mask, i, j) {
            theta[(i, j)] + gamma[(i, j)] - y[(i, j)]
        } else {
            0.0
        }
    });
    let fidelity = 0.5 * residual.as_ref().squared_norm_l2();
    Ok(fidelity + config.lambda_d * nuclear_norm(theta)? + config.mu_d * gamma.norm_l1())
}
