//! Helpers around the solver that are not part of the optimisation itself.
//!
//! - **`synthetic`**: generators for synthetic test problems (a random low-rank matrix,
//!   random sparse spikes and a random observation mask) used by the experiment binary
//!   and by the tests.
//!
//! - **`metrics`**: quality measures for a recovered decomposition: numerical rank,
//!   support size and relative Frobenius error.

pub mod metrics;
pub mod synthetic;
