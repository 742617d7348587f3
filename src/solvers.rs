//! This module provides the high-level API: decompose an observed matrix into a low-rank
//! and a sparse component.

use crate::{
    algorithms::{AcceleratedState, DecompositionCallback, Termination},
    config::DecompositionConfig,
    error::{DecompositionError, DecompositionErrorKind},
};
use faer::{Mat, MatRef};

/// Output of a decomposition run.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// The low-rank component Θ.
    pub low_rank: Mat<f64>,
    /// The sparse component Γ.
    pub sparse: Mat<f64>,
    /// Number of outer iterations executed.
    pub iterations: usize,
    /// Combined step norm of the last iteration.
    pub last_step_norm: f64,
    /// Why the outer loop stopped.
    pub termination: Termination,
}

impl Decomposition {
    /// True when the outer tolerance was reached.
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Checks the shape contract of the entry point before any numerical work.
pub(crate) fn validate_inputs(
    y: MatRef<'_, f64>,
    mask: Option<MatRef<'_, f64>>,
) -> Result<(), DecompositionError> {
    let (rows, cols) = (y.nrows(), y.ncols());
    if rows == 0 || cols == 0 {
        return Err(DecompositionErrorKind::EmptyMatrix { rows, cols }.into());
    }
    if let Some(mask) = mask {
        if mask.nrows() != rows || mask.ncols() != cols {
            return Err(DecompositionErrorKind::DimensionMismatch {
                expected_rows: rows,
                expected_cols: cols,
                actual_rows: mask.nrows(),
                actual_cols: mask.ncols(),
            }
            .into());
        }
        for col in 0..cols {
            for row in 0..rows {
                let value = mask[(row, col)];
                if value != 0.0 && value != 1.0 {
                    return Err(DecompositionErrorKind::InvalidMask { row, col, value }.into());
                }
            }
        }
    }
    Ok(())
}

/// Decomposes `y ≈ Θ + Γ` into a low-rank Θ and a sparse Γ.
///
/// Approximately minimises
/// `½‖M ⊙ (Θ + Γ - Y)‖²_F + λ_d‖Θ‖_* + μ_d‖Γ‖₁` subject to `|Θ_ij| ≤ α/√(d1·d2)`,
/// where `M` is `mask` (all ones when `None`).
///
/// # Arguments
/// * `y`: The observed `d1 x d2` matrix. Entries where the mask is zero may hold any value.
/// * `mask`: Optional `d1 x d2` matrix of zeros and ones, one meaning "observed".
/// * `config`: Hyperparameters, caps and tolerances. See [`DecompositionConfig`].
///
/// # Returns
/// The pair (Θ, Γ) with the number of iterations executed. Reaching `max_iterations`
/// is not an error; it is reported through [`Decomposition::termination`] and the last
/// iterate is returned.
///
/// # Errors
/// Fails before any iteration when `y` is empty, when the mask shape differs from `y`,
/// when the mask holds values other than 0 and 1, or when `config` is invalid. Fails
/// during the run only if the SVD backend does not converge.
///
/// Non-finite entries of `y` are not checked for; they propagate into the result or
/// surface as an SVD error.
pub fn decompose(
    y: MatRef<'_, f64>,
    mask: Option<MatRef<'_, f64>>,
    config: &DecompositionConfig,
) -> Result<Decomposition, DecompositionError> {
    decompose_with_callback(y, mask, config, None)
}

/// Same as [`decompose`], invoking `callback` after every outer iteration.
///
/// The callback receives the iteration report and the current solver state. Returning
/// `false` stops the run with [`Termination::Callback`], unless that same iteration
/// already met the tolerance.
pub fn decompose_with_callback(
    y: MatRef<'_, f64>,
    mask: Option<MatRef<'_, f64>>,
    config: &DecompositionConfig,
    mut callback: Option<&mut DecompositionCallback<'_>>,
) -> Result<Decomposition, DecompositionError> {
    validate_inputs(y, mask)?;
    config.validate()?;

    let mut state = AcceleratedState::new(y.nrows(), y.ncols());
    let mut termination = Termination::IterationLimit;
    let mut last_step_norm = f64::INFINITY;

    for _ in 0..config.max_iterations {
        let report = state.step(y, mask, config)?;
        last_step_norm = report.step_norm;
        log::debug!(
            "Iteration {}: step norm {:.3e}, momentum {:.3}, inner iterations {}",
            report.iteration,
            report.step_norm,
            report.momentum,
            report.inner_iterations
        );

        let keep_going = match callback.as_deref_mut() {
            Some(cb) => cb(&report, &state),
            None => true,
        };

        if AcceleratedState::has_converged(&report, config) {
            log::info!("Decomposition converged after {} iterations", report.iteration);
            termination = Termination::Converged;
            break;
        }
        if !keep_going {
            termination = Termination::Callback;
            break;
        }
    }

    if termination == Termination::IterationLimit {
        log::debug!(
            "Decomposition stopped at the iteration cap ({}), last step norm {:.3e}",
            config.max_iterations,
            last_step_norm
        );
    }

    let iterations = state.iterations();
    let (low_rank, sparse) = state.into_parts();
    Ok(Decomposition {
        low_rank,
        sparse,
        iterations,
        last_step_norm,
        termination,
    })
}
