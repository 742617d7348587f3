//! Proximal primitives used by the decomposition.
//!
//! Three stateless maps make up the whole numerical toolbox of the solver:
//!
//! - [`soft_threshold`]: the proximal operator of the entry-wise l1 norm. It shrinks every
//!   entry toward zero and is the source of sparsity in Γ.
//! - [`box_project`]: the Euclidean projection onto the symmetric box
//!   `[-α/√(d1·d2), α/√(d1·d2)]`, which caps the magnitude of Θ independently of its size.
//! - [`nuclear_shrink`]: the proximal operator of the nuclear norm, i.e. soft thresholding
//!   of the singular values. It is what induces low rank in Θ and dominates the cost of an
//!   inner iteration because it needs a singular value decomposition.
//!
//! Non-finite entries are not special-cased: NaN passes through the entry-wise maps
//! unchanged, and the SVD backend either propagates it or reports a convergence failure.

use crate::error::DecompositionError;
use faer::{Col, Mat, MatRef};

/// Shrinks a single value toward zero by `threshold`.
#[inline]
fn shrink(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else if value.is_nan() {
        value
    } else {
        0.0
    }
}

/// Applies entry-wise soft thresholding: `x - s` where `x > s`, `x + s` where `x < -s`,
/// and `0` otherwise.
pub fn soft_threshold(x: MatRef<'_, f64>, threshold: f64) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols(), |i, j| shrink(x[(i, j)], threshold))
}

/// Returns the magnitude cap `α / √(d1·d2)` for a `nrows x ncols` matrix.
#[inline]
pub fn box_limit(nrows: usize, ncols: usize, alpha: f64) -> f64 {
    alpha / ((nrows * ncols) as f64).sqrt()
}

/// Clamps every entry of `x` into `[-limit, limit]`, with `limit` given by [`box_limit`].
pub fn box_project(x: MatRef<'_, f64>, alpha: f64) -> Mat<f64> {
    let limit = box_limit(x.nrows(), x.ncols(), alpha);
    Mat::from_fn(x.nrows(), x.ncols(), |i, j| {
        let value = x[(i, j)];
        if value > limit {
            limit
        } else if value < -limit {
            -limit
        } else {
            value
        }
    })
}

/// Computes the proximal operator of `threshold · ‖·‖_*` at `x`.
///
/// The economy SVD `x = U Σ Vᵀ` is computed, every singular value is soft-thresholded
/// by `threshold` and the matrix is rebuilt as `U Σ' Vᵀ`. Singular values not exceeding
/// `threshold` are removed, so the rank of the result is the number of singular values
/// of `x` strictly above `threshold`.
///
/// # Errors
/// Returns an error if the SVD fails to converge, which in practice only happens for
/// inputs containing non-finite entries.
pub fn nuclear_shrink(x: MatRef<'_, f64>, threshold: f64) -> Result<Mat<f64>, DecompositionError> {
    let svd = x.thin_svd()?;
    let sigma = svd.S().column_vector();
    let shrunk = Col::from_fn(sigma.nrows(), |k| (sigma[k] - threshold).max(0.0));
    Ok(svd.U() * shrunk.as_diagonal() * svd.V().transpose())
}

/// Sum of the singular values of `x`.
pub fn nuclear_norm(x: MatRef<'_, f64>) -> Result<f64, DecompositionError> {
    Ok(x.singular_values()?.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    /// Builds `U diag(sigma) Vᵀ` from two fixed orthogonal matrices so that the singular
    /// values of the result are known exactly.
    fn with_singular_values(sigma: &[f64]) -> Mat<f64> {
        let n = sigma.len();
        // Householder reflections are symmetric and orthogonal.
        let householder = |v: &[f64]| {
            let norm_sq: f64 = v.iter().map(|x| x * x).sum();
            Mat::from_fn(n, n, |i, j| {
                let identity = if i == j { 1.0 } else { 0.0 };
                identity - 2.0 * v[i] * v[j] / norm_sq
            })
        };
        let u_seed: Vec<f64> = (0..n).map(|i| 1.0 + i as f64).collect();
        let v_seed: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -0.5 }).collect();
        let u = householder(&u_seed);
        let v = householder(&v_seed);
        let s = Col::from_fn(n, |k| sigma[k]);
        &u * s.as_diagonal() * v.transpose()
    }

    #[test]
    fn test_soft_threshold_values() {
        let x: Mat<f64> = mat![[3.0, -3.0, 0.5], [-0.5, 1.0, -1.0]];
        let expected: Mat<f64> = mat![[2.0, -2.0, 0.0], [0.0, 0.0, 0.0]];
        assert_eq!(soft_threshold(x.as_ref(), 1.0), expected);
    }

    #[test]
    fn test_soft_threshold_is_idempotent_under_zero_threshold() {
        let x = Mat::from_fn(4, 6, |i, j| (i as f64 - 1.5) * (j as f64 - 2.0) * 0.7);
        for s in [0.0, 0.3, 1.0, 10.0] {
            let once = soft_threshold(x.as_ref(), s);
            assert_eq!(once.nrows(), 4);
            assert_eq!(once.ncols(), 6);
            assert_eq!(soft_threshold(once.as_ref(), 0.0), once);
            for i in 0..4 {
                for j in 0..6 {
                    if x[(i, j)].abs() <= s {
                        assert_eq!(once[(i, j)], 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_soft_threshold_passes_nan_through() {
        let x: Mat<f64> = mat![[f64::NAN, 2.0]];
        let y = soft_threshold(x.as_ref(), 1.0);
        assert!(y[(0, 0)].is_nan());
        assert_eq!(y[(0, 1)], 1.0);
    }

    #[test]
    fn test_box_limit_normalises_by_size() {
        assert_eq!(box_limit(10, 10, 20.0), 2.0);
        assert_eq!(box_limit(4, 25, 5.0), 0.5);
    }

    #[test]
    fn test_box_project_range_and_fixed_points() {
        // limit = 4 / sqrt(2 * 2) = 2
        let x: Mat<f64> = mat![[5.0, -1.5], [-7.0, 2.0]];
        let expected: Mat<f64> = mat![[2.0, -1.5], [-2.0, 2.0]];
        assert_eq!(box_project(x.as_ref(), 4.0), expected);

        let wide = Mat::from_fn(3, 7, |i, j| (i * 7 + j) as f64 - 10.0);
        let limit = box_limit(3, 7, 20.0);
        let projected = box_project(wide.as_ref(), 20.0);
        for i in 0..3 {
            for j in 0..7 {
                let value = projected[(i, j)];
                assert!((-limit..=limit).contains(&value));
                if wide[(i, j)].abs() <= limit {
                    assert_eq!(value, wide[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_nuclear_shrink_removes_small_singular_values() -> Result<(), DecompositionError> {
        let x = with_singular_values(&[5.0, 3.0, 1.0, 0.5]);
        let shrunk = nuclear_shrink(x.as_ref(), 1.0)?;
        let sigma = shrunk.as_ref().singular_values()?;

        let expected = [4.0, 2.0, 0.0, 0.0];
        for (got, want) in sigma.iter().zip(expected) {
            assert!((got - want).abs() < 1e-10, "got {got}, expected {want}");
        }
        let rank = sigma.iter().filter(|&&s| s > 1e-8).count();
        assert_eq!(rank, 2);
        Ok(())
    }

    #[test]
    fn test_nuclear_shrink_with_zero_threshold_is_identity() -> Result<(), DecompositionError> {
        let x = Mat::from_fn(5, 3, |i, j| ((i + 1) * (j + 2)) as f64 + (i as f64).sin());
        let shrunk = nuclear_shrink(x.as_ref(), 0.0)?;
        assert!((&shrunk - &x).norm_l2() < 1e-10);
        Ok(())
    }

    #[test]
    fn test_nuclear_shrink_rectangular_shapes() -> Result<(), DecompositionError> {
        let tall = Mat::from_fn(6, 2, |i, j| (i + j) as f64);
        let wide = Mat::from_fn(2, 6, |i, j| (i * j) as f64 - 1.0);
        let a = nuclear_shrink(tall.as_ref(), 0.1)?;
        let b = nuclear_shrink(wide.as_ref(), 0.1)?;
        assert_eq!((a.nrows(), a.ncols()), (6, 2));
        assert_eq!((b.nrows(), b.ncols()), (2, 6));
        Ok(())
    }

    #[test]
    fn test_nuclear_norm_of_known_spectrum() -> Result<(), DecompositionError> {
        let x = with_singular_values(&[2.0, 1.5, 0.25]);
        assert!((nuclear_norm(x.as_ref())? - 3.75).abs() < 1e-10);
        Ok(())
    }
}
