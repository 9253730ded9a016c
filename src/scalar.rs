//! The scalar reference path: a plain triple loop used for shapes too small
//! to tile, for hosts without AMX, and — via [`scalar_tile`] — for partial
//! (ragged) tiles within an otherwise AMX-accelerated multiply (spec §4.7).

/// Full scalar matmul: `c[i][j] = sum_k a[i][k] * b[k][j]`, respecting each
/// matrix's own stride. `c` must already be the right shape; it is
/// overwritten, not accumulated into.
///
/// # Safety
/// `a` must have `m` rows of `k` valid floats at stride `a_stride`, `b` must
/// have `k` rows of `n` valid floats at stride `b_stride`, and `c` must have
/// `m` rows of `n` valid floats at stride `c_stride`.
pub unsafe fn scalar_matmul(
    a: *const f32,
    a_stride: usize,
    b: *const f32,
    b_stride: usize,
    c: *mut f32,
    c_stride: usize,
    m: usize,
    k: usize,
    n: usize,
) {
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0f32;
            for kk in 0..k {
                acc += *a.add(i * a_stride + kk) * *b.add(kk * b_stride + j);
            }
            *c.add(i * c_stride + j) = acc;
        }
    }
}

/// Accumulate a ragged (less than 16x16) tile into `c` using an already
/// packed A panel (column-major, stride 16) and a row-major B slice. Used
/// by the tile scheduler for the bottom/right edge of an AMX-accelerated
/// multiply, where the micro-kernel's fixed 16x16 shape doesn't apply.
///
/// # Safety
/// `a_panel` must have `k * 16` valid floats. `b` must have `k` rows of at
/// least `tile_n` valid floats at stride `b_stride`, starting at the tile's
/// first column. `c` must have `tile_m` rows of at least `tile_n` valid
/// floats at stride `c_stride`, starting at the tile's first row/column.
pub unsafe fn scalar_tile(
    a_panel: *const f32,
    k: usize,
    b: *const f32,
    b_stride: usize,
    c: *mut f32,
    c_stride: usize,
    tile_m: usize,
    tile_n: usize,
) {
    debug_assert!(tile_m <= 16 && tile_n <= 16);
    for ii in 0..tile_m {
        for jj in 0..tile_n {
            let mut acc = 0.0f32;
            for kk in 0..k {
                acc += *a_panel.add(kk * 16 + ii) * *b.add(kk * b_stride + jj);
            }
            *c.add(ii * c_stride + jj) += acc;
        }
    }
}
