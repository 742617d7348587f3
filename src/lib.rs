//! Low-rank plus sparse decomposition of partially observed matrices.
//!
//! This crate splits an observed matrix `Y ≈ Θ + Γ + W` into a low-rank component Θ
//! (smooth global structure), a sparse component Γ (localized spikes) and unmodeled noise
//! W. Only the entries selected by an optional 0/1 mask take part in the fit, so missing
//! entries are filled in by Θ and Γ. The solver approximately minimises
//!
//! ```text
//! ½‖M ⊙ (Θ + Γ - Y)‖²_F + λ_d‖Θ‖_* + μ_d‖Γ‖₁   subject to   |Θ_ij| ≤ α / √(d1·d2)
//! ```
//!
//! Built on the [`faer`] linear algebra framework, all matrices are dense `Mat<f64>`.
//!
//! ## Algorithms
//!
//! **Accelerated proximal gradient** ([`algorithms::accelerated`]): the outer FISTA loop.
//! It extrapolates the previous iterates with Nesterov momentum, takes a gradient step on
//! the masked data-fidelity term and hands the result to the joint proximal map.
//!
//! **Douglas-Rachford splitting** ([`algorithms::splitting`]): the inner loop computing the
//! proximal map of the nuclear norm and the magnitude box together. It alternates
//! singular value soft thresholding ([`prox::nuclear_shrink`]) with the box projection
//! ([`prox::box_project`]) while two residual matrices steer both half-steps to a common
//! fixed point. The sparse component is finished by one [`prox::soft_threshold`].
//!
//! Both loops are capped. Reaching a cap is not an error: the last iterate is returned
//! and the reason for stopping is reported in [`Decomposition::termination`].
//!
//! ## Example Usage
//!
//! ```rust
//! use faer::Mat;
//! use lowrank_sparse::{DecompositionConfig, decompose};
//!
//! // A rank-one background with a single spike.
//! let mut y = Mat::from_fn(8, 8, |i, j| 0.05 * ((i + 1) * (j + 1)) as f64);
//! y[(2, 5)] += 4.0;
//!
//! let config = DecompositionConfig::default().with_lambda_d(0.5).with_mu_d(0.1);
//! let result = decompose(y.as_ref(), None, &config).unwrap();
//!
//! assert_eq!(result.low_rank.nrows(), 8);
//! assert_eq!(result.sparse.ncols(), 8);
//! assert!(result.iterations <= config.max_iterations);
//! ```
//!
//! ## Limitations
//!
//! Non-finite entries in `Y` are not sanitised. They propagate into the result or make the
//! SVD fail, in which case an error is returned.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod prox;
pub mod solvers;
pub mod utils;

pub use algorithms::{IterationReport, Termination, objective};
pub use config::DecompositionConfig;
pub use error::DecompositionError;
pub use solvers::{Decomposition, decompose, decompose_with_callback};
