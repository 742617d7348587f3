//! Quality measures for a recovered decomposition.

use crate::error::DecompositionError;
use faer::MatRef;

/// Number of singular values above `relative_tolerance` times the largest one.
pub fn numerical_rank(
    x: MatRef<'_, f64>,
    relative_tolerance: f64,
) -> Result<usize, DecompositionError> {
    let sigma = x.singular_values()?;
    let Some(&largest) = sigma.first() else {
        return Ok(0);
    };
    if largest == 0.0 {
        return Ok(0);
    }
    Ok(sigma
        .iter()
        .filter(|&&s| s > relative_tolerance * largest)
        .count())
}

/// Number of entries with magnitude above `tolerance`.
pub fn support_size(x: MatRef<'_, f64>, tolerance: f64) -> usize {
    (0..x.ncols())
        .map(|j| (0..x.nrows()).filter(|&i| x[(i, j)].abs() > tolerance).count())
        .sum()
}

/// `‖estimate - truth‖_F / ‖truth‖_F`, or the absolute error when `truth` is zero.
pub fn relative_error(estimate: MatRef<'_, f64>, truth: MatRef<'_, f64>) -> f64 {
    let error = (estimate - truth).norm_l2();
    let scale = truth.norm_l2();
    if scale == 0.0 { error } else { error / scale }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::{Mat, mat};

    #[test]
    fn test_numerical_rank_of_outer_product() -> Result<(), DecompositionError> {
        let x = Mat::from_fn(6, 4, |i, j| (i as f64 + 1.0) * (j as f64 - 1.5));
        assert_eq!(numerical_rank(x.as_ref(), 1e-10)?, 1);
        assert_eq!(numerical_rank(Mat::<f64>::zeros(3, 3).as_ref(), 1e-10)?, 0);
        Ok(())
    }

    #[test]
    fn test_support_size_and_relative_error() {
        let x: Mat<f64> = mat![[0.0, 1e-9, 2.0], [-3.0, 0.0, 0.0]];
        assert_eq!(support_size(x.as_ref(), 1e-6), 2);

        let truth: Mat<f64> = mat![[3.0, 0.0], [0.0, 4.0]];
        let estimate: Mat<f64> = mat![[3.0, 0.0], [0.0, 3.0]];
        assert!((relative_error(estimate.as_ref(), truth.as_ref()) - 0.2).abs() < 1e-15);
        assert_eq!(relative_error(truth.as_ref(), Mat::<f64>::zeros(2, 2).as_ref()), 5.0);
    }
}
