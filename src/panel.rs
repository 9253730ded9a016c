//! The A-panel packer (spec §4.5).
//!
//! Repacks a 16-row x K-column slice of A from row-major, strided memory
//! into the column-major, stride-16 layout the micro-kernel needs to issue
//! straight-line `LDY` instructions. Invoked once per row-tile per worker;
//! its output is reused across every column tile of that row-tile.

/// Per-worker scratch panel: `k_max * 16` floats, column-major (element for
/// logical row `r`, step `k` lives at `panel[k*16 + r]`).
pub struct APanel {
    data: Vec<f32>,
    k_max: usize,
}

impl APanel {
    /// Allocate a panel large enough for `k_max` columns of A. Reused across
    /// every row-tile a worker processes.
    pub fn new(k_max: usize) -> Self {
        APanel {
            data: vec![0.0; k_max * 16],
            k_max,
        }
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.data.as_mut_ptr()
    }

    pub fn k_max(&self) -> usize {
        self.k_max
    }
}

/// Pack rows `[i_start, i_end)` of `a` (base pointer, row stride `a_stride`,
/// `k` columns) into `panel`, column-major with stride 16. Rows past
/// `i_end - i_start` (a ragged bottom row-tile) are zero-filled.
///
/// # Safety
/// `a` must be valid to read `k` columns from each of rows
/// `[i_start, i_end)` at stride `a_stride`. `panel` must have capacity for
/// at least `k * 16` floats.
pub unsafe fn pack_panel(
    a: *const f32,
    a_stride: usize,
    i_start: usize,
    i_end: usize,
    k: usize,
    panel: *mut f32,
) {
    debug_assert!(i_end > i_start);
    let active_rows = i_end - i_start;
    debug_assert!(active_rows <= 16);

    if active_rows == 16 {
        // Common path: straight-line scalar gathers, no branch per row.
        for kk in 0..k {
            let dst = panel.add(kk * 16);
            for r in 0..16 {
                let src = a.add((i_start + r) * a_stride + kk);
                *dst.add(r) = *src;
            }
        }
    } else {
        for kk in 0..k {
            let dst = panel.add(kk * 16);
            for r in 0..active_rows {
                let src = a.add((i_start + r) * a_stride + kk);
                *dst.add(r) = *src;
            }
            // Zero-fill the ragged pad.
            std::ptr::write_bytes(dst.add(active_rows), 0, 16 - active_rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tile_packs_column_major() {
        // 16x3 row-major A: a[i][k] = i*3 + k.
        let a_stride = 3;
        let mut a = vec![0.0f32; 16 * a_stride];
        for i in 0..16 {
            for k in 0..3 {
                a[i * a_stride + k] = (i * a_stride + k) as f32;
            }
        }
        let mut panel = APanel::new(3);
        unsafe {
            pack_panel(a.as_ptr(), a_stride, 0, 16, 3, panel.as_mut_ptr());
        }
        let data = unsafe { std::slice::from_raw_parts(panel.as_ptr(), 3 * 16) };
        for k in 0..3 {
            for r in 0..16 {
                assert_eq!(data[k * 16 + r], (r * a_stride + k) as f32);
            }
        }
    }

    #[test]
    fn ragged_tile_zero_fills_pad() {
        let a_stride = 2;
        let a = vec![1.0f32; 5 * a_stride]; // only 5 real rows available
        let mut panel = APanel::new(2);
        unsafe {
            pack_panel(a.as_ptr(), a_stride, 0, 5, 2, panel.as_mut_ptr());
        }
        let data = unsafe { std::slice::from_raw_parts(panel.as_ptr(), 2 * 16) };
        for k in 0..2 {
            for r in 0..5 {
                assert_eq!(data[k * 16 + r], 1.0);
            }
            for r in 5..16 {
                assert_eq!(data[k * 16 + r], 0.0);
            }
        }
    }

    #[test]
    fn offset_row_range_reads_correct_slice() {
        let a_stride = 1;
        let a: Vec<f32> = (0..32).map(|i| i as f32).collect();
        let mut panel = APanel::new(1);
        unsafe {
            pack_panel(a.as_ptr(), a_stride, 16, 32, 1, panel.as_mut_ptr());
        }
        let data = unsafe { std::slice::from_raw_parts(panel.as_ptr(), 16) };
        for r in 0..16 {
            assert_eq!(data[r], (16 + r) as f32);
        }
    }
}
