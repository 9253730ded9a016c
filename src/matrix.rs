//! Matrix storage and the public `Matrix` value type (spec §3, §4.4, §4.9).
//!
//! The storage layout is dictated by hardware, not taste: 64-byte alignment
//! and a stride padded to a multiple of 16 floats are what let the micro-
//! kernel and panel packer read straight off the buffer without bounds
//! checks on every row.

use crate::error::MatrixError;
use crate::matmul;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::ptr::NonNull;

const ALIGN: usize = 64;
const LANE: usize = 16;

fn round_up_to_lane(cols: usize) -> usize {
    (cols + LANE - 1) / LANE * LANE
}

/// A dense, row-major, 64-byte-aligned f32 matrix.
///
/// Exclusively owns its backing buffer: `Matrix` is a plain value type, and
/// `.clone()` duplicates the buffer (padding included) rather than sharing
/// it. Columns `[cols, stride)` of every row are always zero-initialized and
/// left untouched by every operation in this crate, which is what lets the
/// micro-kernel read past `cols` on a ragged tile without corrupting results.
pub struct Matrix {
    rows: usize,
    cols: usize,
    stride: usize,
    data: NonNull<f32>,
}

// SAFETY: `Matrix` owns its buffer exclusively; no aliasing is possible
// through a `Matrix` value itself.
unsafe impl Send for Matrix {}
unsafe impl Sync for Matrix {}

impl Matrix {
    /// Build the allocation layout for a `rows x stride` buffer. Fails
    /// (rather than panicking) if the requested size overflows `isize`, so
    /// that every allocation-path error — including this one — surfaces as
    /// [`MatrixError::Alloc`] per the crate's no-panic-on-alloc-failure
    /// contract.
    fn layout_for(rows: usize, stride: usize) -> Result<Layout, MatrixError> {
        let size = rows
            .checked_mul(stride)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
            .ok_or(MatrixError::Alloc)?;
        Layout::from_size_align(size, ALIGN).map_err(|_| MatrixError::Alloc)
    }

    fn alloc_zeroed(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidShape(format!(
                "rows and cols must be positive, got {rows}x{cols}"
            )));
        }
        let stride = round_up_to_lane(cols);
        let layout = Self::layout_for(rows, stride)?;
        let ptr = unsafe { alloc_zeroed(layout) } as *mut f32;
        let data = NonNull::new(ptr).ok_or(MatrixError::Alloc)?;
        Ok(Matrix {
            rows,
            cols,
            stride,
            data,
        })
    }

    /// A `rows x cols` matrix of all zeros (including padding).
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        Self::alloc_zeroed(rows, cols)
    }

    /// A `rows x cols` matrix with every logical element set to `value`.
    /// Padding columns remain zero.
    pub fn fill(rows: usize, cols: usize, value: f32) -> Result<Self, MatrixError> {
        let mut m = Self::alloc_zeroed(rows, cols)?;
        if value != 0.0 {
            for i in 0..rows {
                for j in 0..cols {
                    m.set(i, j, value);
                }
            }
        }
        Ok(m)
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self, MatrixError> {
        let mut m = Self::alloc_zeroed(n, n)?;
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        Ok(m)
    }

    /// Copy a `rows x cols` matrix out of row-major `data` (length must be
    /// exactly `rows * cols`).
    pub fn from_slice(rows: usize, cols: usize, data: &[f32]) -> Result<Self, MatrixError> {
        if data.len() != rows * cols {
            return Err(MatrixError::InvalidShape(format!(
                "expected {} elements for a {}x{} matrix, got {}",
                rows * cols,
                rows,
                cols,
                data.len()
            )));
        }
        let mut m = Self::alloc_zeroed(rows, cols)?;
        for i in 0..rows {
            let row_src = &data[i * cols..(i + 1) * cols];
            let row_dst = m.row_mut(i);
            row_dst[..cols].copy_from_slice(row_src);
        }
        Ok(m)
    }

    /// Build a `rows x cols` matrix from an owned row-major `Vec<f32>`
    /// (length must be exactly `rows * cols`, validated the same way as
    /// [`Self::from_slice`]). Despite taking the `Vec` by value, this still
    /// copies into the 64-byte-aligned, lane-padded backing buffer: a plain
    /// `Vec<f32>` has neither property, so its allocation can never be
    /// reused as-is.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MatrixError> {
        Self::from_slice(rows, cols, &data)
    }

    /// Number of logical rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of logical columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Physical row pitch in elements (always `cols` rounded up to a
    /// multiple of 16).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw pointer to the start of the buffer. Unchecked: the caller is
    /// responsible for respecting `rows`/`cols`/`stride`.
    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    /// Raw mutable pointer to the start of the buffer. Unchecked.
    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.data.as_ptr()
    }

    fn row(&self, i: usize) -> &[f32] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr().add(i * self.stride), self.stride) }
    }

    fn row_mut(&mut self, i: usize) -> &mut [f32] {
        unsafe {
            std::slice::from_raw_parts_mut(self.data.as_ptr().add(i * self.stride), self.stride)
        }
    }

    /// Read element `(i, j)`. Panics if out of bounds, like `Vec` indexing.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.rows && j < self.cols, "matrix index out of bounds");
        self.row(i)[j]
    }

    /// Write element `(i, j)`. Panics if out of bounds, like `Vec` indexing.
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        assert!(i < self.rows && j < self.cols, "matrix index out of bounds");
        self.row_mut(i)[j] = value;
    }

    /// Multiply `self * rhs`, dispatching to the AMX engine when available
    /// and to the scalar baseline otherwise (see [`crate::matmul::matmul`]).
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix, crate::error::MatmulError> {
        matmul::matmul(self, rhs)
    }

    /// Transpose, allocating a new `cols x rows` matrix.
    pub fn transpose(&self) -> Result<Matrix, MatrixError> {
        let mut out = Self::alloc_zeroed(self.cols, self.rows)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        Ok(out)
    }

    /// Element-wise addition. Both operands must have equal shape.
    pub fn add(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(rhs, |a, b| a + b)
    }

    /// Element-wise subtraction. Both operands must have equal shape.
    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(rhs, |a, b| a - b)
    }

    /// Scalar multiplication.
    pub fn scale(&self, k: f32) -> Result<Matrix, MatrixError> {
        let mut out = Self::alloc_zeroed(self.rows, self.cols)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(i, j, self.get(i, j) * k);
            }
        }
        Ok(out)
    }

    /// Element-wise negation.
    pub fn neg(&self) -> Result<Matrix, MatrixError> {
        self.scale(-1.0)
    }

    fn zip_with(&self, rhs: &Matrix, f: impl Fn(f32, f32) -> f32) -> Result<Matrix, MatrixError> {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            return Err(MatrixError::InvalidShape(format!(
                "shape mismatch: {}x{} vs {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        let mut out = Self::alloc_zeroed(self.rows, self.cols)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(i, j, f(self.get(i, j), rhs.get(i, j)));
            }
        }
        Ok(out)
    }
}

impl Clone for Matrix {
    fn clone(&self) -> Self {
        // Same `rows`/`stride` that already succeeded at construction time,
        // so this recomputation cannot overflow.
        let layout = Self::layout_for(self.rows, self.stride).expect("matrix layout overflow");
        let ptr = unsafe { alloc_zeroed(layout) } as *mut f32;
        let data = NonNull::new(ptr).expect("matrix clone allocation failed");
        unsafe {
            std::ptr::copy_nonoverlapping(self.data.as_ptr(), data.as_ptr(), self.rows * self.stride);
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
            data,
        }
    }
}

impl Drop for Matrix {
    fn drop(&mut self) {
        // Same `rows`/`stride` that already succeeded at construction time,
        // so this recomputation cannot overflow.
        let layout = Self::layout_for(self.rows, self.stride).expect("matrix layout overflow");
        unsafe { dealloc(self.data.as_ptr() as *mut u8, layout) };
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        if self.rows != other.rows || self.cols != other.cols {
            return false;
        }
        (0..self.rows).all(|i| self.row(i)[..self.cols] == other.row(i)[..other.cols])
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX: usize = 10;
        writeln!(f, "Matrix {}x{} (stride {}) {{", self.rows, self.cols, self.stride)?;
        for i in 0..self.rows.min(MAX) {
            write!(f, "  [")?;
            for j in 0..self.cols.min(MAX) {
                write!(f, "{:>10.4}", self.get(i, j))?;
                if j + 1 < self.cols.min(MAX) {
                    write!(f, ", ")?;
                }
            }
            if self.cols > MAX {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.rows > MAX {
            writeln!(f, "  ...")?;
        }
        write!(f, "}}")
    }
}
