//! The crate's error surface (spec §4.11/§7). Shape mismatches and
//! allocation failures are reported, never panicked; the only panics on the
//! public API are in the checked element accessors ([`crate::matrix::Matrix::get`]/
//! [`crate::matrix::Matrix::set`]).

use thiserror::Error;

/// Failure constructing or mutating a [`crate::matrix::Matrix`].
#[derive(Debug, Error)]
pub enum MatrixError {
    /// `rows` or `cols` was zero, or caller-supplied data didn't match the
    /// requested shape.
    #[error("invalid matrix shape: {0}")]
    InvalidShape(String),
    /// The backing allocation could not be obtained.
    #[error("failed to allocate matrix storage")]
    Alloc,
}

/// Failure from [`crate::matmul::matmul`] (or [`crate::matrix::Matrix::matmul`]).
#[derive(Debug, Error)]
pub enum MatmulError {
    /// `a.cols() != b.rows()`.
    #[error("shape mismatch: a is {a_rows}x{a_cols}, b is {b_rows}x{b_cols}")]
    ShapeMismatch {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },
    /// The result buffer (or a per-worker scratch panel) could not be allocated.
    #[error("failed to allocate matmul output or scratch storage")]
    Alloc,
}

impl From<MatrixError> for MatmulError {
    fn from(e: MatrixError) -> Self {
        match e {
            MatrixError::Alloc => MatmulError::Alloc,
            MatrixError::InvalidShape(_) => MatmulError::Alloc,
        }
    }
}
