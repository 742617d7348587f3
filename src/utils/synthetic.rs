//! This module provides generators for synthetic decomposition problems.
//!
//! A test problem is built from three independent pieces:
//!
//! - a low-rank matrix, the product of two random factors, rescaled so that its largest
//!   entry has unit magnitude;
//! - a sparse "spiky" matrix holding a few entries of fixed magnitude and random sign at
//!   distinct random positions;
//! - an observation mask with each entry observed independently with a given probability.
//!
//! All generators take the random number generator explicitly so experiments can be
//! reproduced from a seed.

use crate::error::{DecompositionError, DecompositionErrorKind};
use faer::Mat;
use rand::{Rng, seq::index::sample};

/// A generated problem together with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticProblem {
    /// The exactly low-rank component.
    pub low_rank: Mat<f64>,
    /// The exactly sparse component.
    pub sparse: Mat<f64>,
    /// Observation mask with entries in {0, 1}.
    pub mask: Mat<f64>,
    /// `low_rank + sparse` on observed entries, zero elsewhere.
    pub observed: Mat<f64>,
}

fn invalid(message: String) -> DecompositionError {
    DecompositionErrorKind::InvalidParameter(message).into()
}

/// Generates a `nrows x ncols` matrix of rank `rank` with entries in `[-1, 1]`.
///
/// # Errors
/// `rank` must lie in `1..=min(nrows, ncols)`.
pub fn low_rank<R: Rng + ?Sized>(
    nrows: usize,
    ncols: usize,
    rank: usize,
    rng: &mut R,
) -> Result<Mat<f64>, DecompositionError> {
    if rank == 0 || rank > nrows.min(ncols) {
        return Err(invalid(format!(
            "rank must be between 1 and {}, got {rank}",
            nrows.min(ncols)
        )));
    }
    let left: Mat<f64> = Mat::from_fn(nrows, rank, |_, _| rng.random_range(-1.0..1.0));
    let right: Mat<f64> = Mat::from_fn(rank, ncols, |_, _| rng.random_range(-1.0..1.0));
    let product = &left * &right;

    let peak = product.as_ref().norm_max();
    if peak == 0.0 {
        return Ok(product);
    }
    Ok(Mat::from_fn(nrows, ncols, |i, j| product[(i, j)] / peak))
}

/// Generates a `nrows x ncols` matrix with exactly `count` entries equal to `±magnitude`.
///
/// # Errors
/// `count` cannot exceed the number of entries, and `magnitude` must be positive.
pub fn spiky<R: Rng + ?Sized>(
    nrows: usize,
    ncols: usize,
    count: usize,
    magnitude: f64,
    rng: &mut R,
) -> Result<Mat<f64>, DecompositionError> {
    let length = nrows * ncols;
    if count > length {
        return Err(invalid(format!(
            "cannot place {count} spikes in a {nrows}x{ncols} matrix"
        )));
    }
    if !(magnitude.is_finite() && magnitude > 0.0) {
        return Err(invalid(format!(
            "spike magnitude must be positive and finite, got {magnitude}"
        )));
    }

    let mut spikes = Mat::<f64>::zeros(nrows, ncols);
    for index in sample(rng, length, count).iter() {
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        spikes[(index / ncols, index % ncols)] = sign * magnitude;
    }
    Ok(spikes)
}

/// Generates an observation mask where each entry is observed with probability
/// `fraction`.
///
/// # Errors
/// `fraction` must lie in `[0, 1]`.
pub fn observation_mask<R: Rng + ?Sized>(
    nrows: usize,
    ncols: usize,
    fraction: f64,
    rng: &mut R,
) -> Result<Mat<f64>, DecompositionError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(invalid(format!(
            "observed fraction must lie in [0, 1], got {fraction}"
        )));
    }
    Ok(Mat::from_fn(nrows, ncols, |_, _| {
        if rng.random_bool(fraction) { 1.0 } else { 0.0 }
    }))
}

impl SyntheticProblem {
    /// Generates a square `size x size` problem with a rank-`rank` component, `spikes`
    /// entries of magnitude `spike_magnitude`, and a fraction `observed_fraction` of
    /// observed entries.
    pub fn generate<R: Rng + ?Sized>(
        size: usize,
        rank: usize,
        spikes: usize,
        spike_magnitude: f64,
        observed_fraction: f64,
        rng: &mut R,
    ) -> Result<Self, DecompositionError> {
        let low_rank = low_rank(size, size, rank, rng)?;
        let sparse = spiky(size, size, spikes, spike_magnitude, rng)?;
        let mask = observation_mask(size, size, observed_fraction, rng)?;
        let observed = Mat::from_fn(size, size, |i, j| {
            mask[(i, j)] * (low_rank[(i, j)] + sparse[(i, j)])
        });
        Ok(Self {
            low_rank,
            sparse,
            mask,
            observed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_low_rank_has_requested_rank_and_unit_peak() -> Result<(), DecompositionError> {
        let mut rng = StdRng::seed_from_u64(7);
        let m = low_rank(12, 9, 3, &mut rng)?;
        assert_eq!((m.nrows(), m.ncols()), (12, 9));
        assert!((m.as_ref().norm_max() - 1.0).abs() < 1e-12);

        let sigma = m.as_ref().singular_values()?;
        let significant = sigma.iter().filter(|&&s| s > 1e-10 * sigma[0]).count();
        assert_eq!(significant, 3);
        Ok(())
    }

    #[test]
    fn test_low_rank_rejects_bad_rank() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(low_rank(4, 6, 0, &mut rng).is_err());
        assert!(low_rank(4, 6, 5, &mut rng).is_err());
    }

    #[test]
    fn test_spiky_places_exact_count() -> Result<(), DecompositionError> {
        let mut rng = StdRng::seed_from_u64(11);
        let m = spiky(10, 8, 13, 2.5, &mut rng)?;
        let mut nonzero = 0;
        for i in 0..10 {
            for j in 0..8 {
                let value = m[(i, j)];
                if value != 0.0 {
                    nonzero += 1;
                    assert_eq!(value.abs(), 2.5);
                }
            }
        }
        assert_eq!(nonzero, 13);
        assert!(spiky(2, 2, 5, 1.0, &mut rng).is_err());
        assert!(spiky(2, 2, 1, -1.0, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn test_observation_mask_extremes_and_fraction() -> Result<(), DecompositionError> {
        let mut rng = StdRng::seed_from_u64(3);
        let full = observation_mask(5, 5, 1.0, &mut rng)?;
        let empty = observation_mask(5, 5, 0.0, &mut rng)?;
        assert_eq!(full, Mat::<f64>::from_fn(5, 5, |_, _| 1.0));
        assert_eq!(empty, Mat::<f64>::zeros(5, 5));

        let half = observation_mask(100, 100, 0.5, &mut rng)?;
        let observed: f64 = (0..100)
            .flat_map(|i| (0..100).map(move |j| (i, j)))
            .map(|(i, j)| half[(i, j)])
            .sum();
        assert!((observed / 10_000.0 - 0.5).abs() < 0.05);
        assert!(observation_mask(2, 2, 1.5, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn test_problem_zeroes_unobserved_entries() -> Result<(), DecompositionError> {
        let mut rng = StdRng::seed_from_u64(42);
        let problem = SyntheticProblem::generate(15, 2, 4, 3.0, 0.7, &mut rng)?;
        for i in 0..15 {
            for j in 0..15 {
                if problem.mask[(i, j)] == 0.0 {
                    assert_eq!(problem.observed[(i, j)], 0.0);
                } else {
                    let truth = problem.low_rank[(i, j)] + problem.sparse[(i, j)];
                    assert_eq!(problem.observed[(i, j)], truth);
                }
            }
        }
        Ok(())
    }
}
