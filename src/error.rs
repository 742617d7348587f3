//! This module defines the custom error types for the library.
//!
//! Every failure that can arise while validating the inputs of a decomposition or
//! while running the proximal iterations is collected into a single enum,
//! [`DecompositionErrorKind`], and exposed through the opaque [`DecompositionError`].
//!
//! Note that [`faer::linalg::svd::SvdError`] does not implement the standard
//! [`std::error::Error`] trait, so it is wrapped manually and rendered with its
//! `Debug` representation.
use thiserror::Error;

/// Represents all possible errors that can occur during a decomposition run.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct DecompositionError(#[from] DecompositionErrorKind);

/// Private enum containing the distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum DecompositionErrorKind {
    /// The mask (or another operand) does not have the shape of the observed matrix.
    #[error(
        "Dimension mismatch: expected a {expected_rows}x{expected_cols} matrix but got {actual_rows}x{actual_cols}."
    )]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// The observed matrix has no rows or no columns.
    #[error("Invalid input: cannot decompose an empty {rows}x{cols} matrix.")]
    EmptyMatrix { rows: usize, cols: usize },

    /// A mask entry is neither 0 nor 1.
    #[error("Invalid mask: entry ({row}, {col}) is {value}, expected 0 or 1.")]
    InvalidMask { row: usize, col: usize, value: f64 },

    /// A hyperparameter or generator argument is out of range.
    #[error("Invalid input parameter: {0}")]
    InvalidParameter(String),

    /// Wraps an error originating from [`faer`]'s singular value decomposition.
    #[error("A numerical error occurred during the singular value decomposition: {0:?}")]
    Svd(faer::linalg::svd::SvdError),
}

impl PartialEq for DecompositionError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl From<faer::linalg::svd::SvdError> for DecompositionError {
    fn from(error: faer::linalg::svd::SvdError) -> Self {
        DecompositionErrorKind::Svd(error).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_error_message() {
        let error = DecompositionError(DecompositionErrorKind::DimensionMismatch {
            expected_rows: 10,
            expected_cols: 4,
            actual_rows: 10,
            actual_cols: 5,
        });
        let expected_message =
            "Dimension mismatch: expected a 10x4 matrix but got 10x5.";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_empty_matrix_error_message() {
        let error = DecompositionError(DecompositionErrorKind::EmptyMatrix { rows: 0, cols: 3 });
        assert_eq!(
            error.to_string(),
            "Invalid input: cannot decompose an empty 0x3 matrix."
        );
    }

    #[test]
    fn test_invalid_mask_error_message() {
        let error = DecompositionError(DecompositionErrorKind::InvalidMask {
            row: 2,
            col: 1,
            value: 0.5,
        });
        assert_eq!(
            error.to_string(),
            "Invalid mask: entry (2, 1) is 0.5, expected 0 or 1."
        );
    }

    #[test]
    fn test_invalid_parameter_error_message() {
        let error = DecompositionError(DecompositionErrorKind::InvalidParameter(
            "`alpha` must be positive and finite, got -1".to_string(),
        ));
        let expected_message =
            "Invalid input parameter: `alpha` must be positive and finite, got -1";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_svd_error_message() {
        let error = DecompositionError::from(faer::linalg::svd::SvdError::NoConvergence);
        // The inner error is rendered with its `Debug` format.
        let expected_message =
            "A numerical error occurred during the singular value decomposition: NoConvergence";
        assert_eq!(error.to_string(), expected_message);
    }
}
