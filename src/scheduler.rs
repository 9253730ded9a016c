//! The parallel tile scheduler (spec §4.7, §5).
//!
//! Partitions C's rows into 16-row tiles, decides single- vs multi-threaded
//! execution, and dispatches workers via `std::thread::scope` — a fork-join
//! primitive: all workers are spawned, then joined before `dispatch` returns.
//! No task returns before the others, there is no streaming or
//! back-pressure, and workers never communicate: their output tiles are
//! disjoint row ranges of `C`, so no locking is needed across threads.

use crate::detect;
use crate::kernel;
use crate::matrix::Matrix;
use crate::panel::{pack_panel, APanel};
use crate::scalar;

#[cfg(target_arch = "aarch64")]
use crate::ops::AmxOps;
#[cfg(target_arch = "aarch64")]
use crate::scope::AmxScope;

const MAX_THREADS: usize = 16;
const SINGLE_THREAD_ROW_CUTOFF: usize = 64;
const TILE: usize = 16;

#[derive(Clone, Copy)]
struct RawSend<T>(*const T);
unsafe impl<T> Send for RawSend<T> {}

#[derive(Clone, Copy)]
struct RawSendMut<T>(*mut T);
unsafe impl<T> Send for RawSendMut<T> {}

/// Dispatch `c = a * b`. Assumes shapes are already validated
/// (`a.cols() == b.rows()`, `c` is `a.rows() x b.cols()`) and `c` has
/// already been zeroed (per [`Matrix::zeros`]), since ragged edge tiles
/// accumulate into it with `+=`.
pub fn dispatch(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    let m = a.rows();
    let k = a.cols();
    let n = b.cols();

    if m < TILE || n < TILE || !detect::is_available() {
        log::debug!(
            "amx_matmul scheduler: scalar fallback (m={}, n={}, amx_available={})",
            m,
            n,
            detect::is_available()
        );
        unsafe {
            scalar::scalar_matmul(
                a.as_ptr(),
                a.stride(),
                b.as_ptr(),
                b.stride(),
                c.as_mut_ptr(),
                c.stride(),
                m,
                k,
                n,
            );
        }
        return;
    }

    let m_tiles = (m + TILE - 1) / TILE;
    let perf_cores = detect::perf_core_count().min(MAX_THREADS);
    let threads = m_tiles.min(perf_cores).max(1);

    let a_stride = a.stride();
    let b_stride = b.stride();
    let c_stride = c.stride();
    let a_ptr = RawSend(a.as_ptr());
    let b_ptr = RawSend(b.as_ptr());
    let c_ptr = RawSendMut(c.as_mut_ptr());

    if m <= SINGLE_THREAD_ROW_CUTOFF || threads <= 1 {
        log::debug!(
            "amx_matmul scheduler: single-thread AMX path (m={}, k={}, n={})",
            m,
            k,
            n
        );
        run_worker_amx(a_ptr.0, a_stride, b_ptr.0, b_stride, c_ptr.0, c_stride, 0, m, k, n);
        return;
    }

    log::debug!(
        "amx_matmul scheduler: multi-thread AMX path across {} workers (m={}, k={}, n={})",
        threads,
        m,
        k,
        n
    );
    let ranges = partition_row_tiles(m, m_tiles, threads);
    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(ranges.len());
        for (i_start, i_end) in ranges {
            handles.push(scope.spawn(move || {
                run_worker_amx(a_ptr.0, a_stride, b_ptr.0, b_stride, c_ptr.0, c_stride, i_start, i_end, k, n);
            }));
        }
        for h in handles {
            h.join().expect("amx matmul worker panicked");
        }
    });
}

/// Split `[0, m)` into `threads` contiguous row ranges whose lengths are
/// multiples of 16 except possibly the last (which absorbs any ragged
/// bottom row-tile).
fn partition_row_tiles(m: usize, m_tiles: usize, threads: usize) -> Vec<(usize, usize)> {
    let base_tiles = m_tiles / threads;
    let extra = m_tiles % threads;
    let mut ranges = Vec::with_capacity(threads);
    let mut tile_cursor = 0usize;
    for t in 0..threads {
        // Spread the remainder tiles over the first `extra` workers so no
        // single worker gets a disproportionate share.
        let tiles_this = base_tiles + if t < extra { 1 } else { 0 };
        let start = tile_cursor * TILE;
        tile_cursor += tiles_this;
        let end = (tile_cursor * TILE).min(m);
        ranges.push((start, end));
    }
    ranges
}

fn process_row_tile<O>(
    ops: &mut O,
    a_ptr: *const f32,
    a_stride: usize,
    b_ptr: *const f32,
    b_stride: usize,
    c_ptr: *mut f32,
    c_stride: usize,
    i_start: usize,
    i_end: usize,
    k: usize,
    n: usize,
    panel: &mut APanel,
) where
    O: AmxOpsOrUnit,
{
    unsafe {
        pack_panel(a_ptr, a_stride, i_start, i_end, k, panel.as_mut_ptr());
    }
    let tile_m = i_end - i_start;
    let mut j = 0;
    while j < n {
        let tile_n = (n - j).min(TILE);
        let c_tile = unsafe { c_ptr.add(i_start * c_stride + j) };
        let b_tile = unsafe { b_ptr.add(j) };
        if tile_m == TILE && tile_n == TILE {
            unsafe {
                ops.run_kernel(panel.as_ptr(), k, b_tile, b_stride, c_tile, c_stride);
            }
        } else {
            unsafe {
                scalar::scalar_tile(panel.as_ptr(), k, b_tile, b_stride, c_tile, c_stride, tile_m, tile_n);
            }
        }
        j += TILE;
    }
}

/// Lets [`process_row_tile`] stay a single generic function whether or not
/// the AMX kernel is actually compiled in on this target.
trait AmxOpsOrUnit {
    unsafe fn run_kernel(
        &mut self,
        a_panel: *const f32,
        k: usize,
        b: *const f32,
        b_stride: usize,
        c: *mut f32,
        c_stride: usize,
    );
}

#[cfg(target_arch = "aarch64")]
impl<T: AmxOps> AmxOpsOrUnit for T {
    unsafe fn run_kernel(
        &mut self,
        a_panel: *const f32,
        k: usize,
        b: *const f32,
        b_stride: usize,
        c: *mut f32,
        c_stride: usize,
    ) {
        kernel::micro_kernel_16x16(self, a_panel, k, b, b_stride, c, c_stride);
    }
}

#[cfg(target_arch = "aarch64")]
fn run_worker_amx(
    a_ptr: *const f32,
    a_stride: usize,
    b_ptr: *const f32,
    b_stride: usize,
    c_ptr: *mut f32,
    c_stride: usize,
    i_start: usize,
    i_end: usize,
    k: usize,
    n: usize,
) {
    let mut scope = match AmxScope::enter() {
        Ok(s) => s,
        Err(_) => {
            // Should not happen: `dispatch` already checked availability
            // before spawning workers. Fall back defensively rather than
            // leaving this row range uncomputed.
            unsafe {
                scalar::scalar_matmul(
                    a_ptr.add(i_start * a_stride),
                    a_stride,
                    b_ptr,
                    b_stride,
                    c_ptr.add(i_start * c_stride),
                    c_stride,
                    i_end - i_start,
                    k,
                    n,
                );
            }
            return;
        }
    };
    let mut ops = scope.ops();
    let mut panel = APanel::new(k);
    let mut i = i_start;
    while i < i_end {
        let row_end = (i + TILE).min(i_end);
        process_row_tile(
            &mut ops, a_ptr, a_stride, b_ptr, b_stride, c_ptr, c_stride, i, row_end, k, n, &mut panel,
        );
        i += TILE;
    }
}

/// Non-`aarch64` builds never reach this path (`detect::is_available` is
/// always `false`), but it still must compile and behave correctly so the
/// crate (and its tests) build everywhere.
#[cfg(not(target_arch = "aarch64"))]
fn run_worker_amx(
    a_ptr: *const f32,
    a_stride: usize,
    b_ptr: *const f32,
    b_stride: usize,
    c_ptr: *mut f32,
    c_stride: usize,
    i_start: usize,
    i_end: usize,
    k: usize,
    n: usize,
) {
    unsafe {
        scalar::scalar_matmul(
            a_ptr.add(i_start * a_stride),
            a_stride,
            b_ptr,
            b_stride,
            c_ptr.add(i_start * c_stride),
            c_stride,
            i_end - i_start,
            k,
            n,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_every_row_exactly_once() {
        for &(m, threads) in &[(512usize, 4usize), (100, 3), (17, 1), (64, 2), (33, 5)] {
            let m_tiles = (m + TILE - 1) / TILE;
            let threads = m_tiles.min(threads).max(1);
            let ranges = partition_row_tiles(m, m_tiles, threads);
            assert_eq!(ranges.first().unwrap().0, 0);
            assert_eq!(ranges.last().unwrap().1, m);
            for w in ranges.windows(2) {
                assert_eq!(w[0].1, w[1].0, "ranges must be contiguous");
            }
            for (idx, &(s, e)) in ranges.iter().enumerate() {
                assert!(e > s, "range {idx} must be non-empty");
                if idx + 1 < ranges.len() {
                    assert_eq!((e - s) % TILE, 0, "only the last range may be ragged");
                }
            }
        }
    }

    #[test]
    fn dispatch_small_shapes_uses_scalar_path() {
        let a = Matrix::fill(4, 4, 1.0).unwrap();
        let b = Matrix::fill(4, 4, 2.0).unwrap();
        let mut c = Matrix::zeros(4, 4).unwrap();
        dispatch(&a, &b, &mut c);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(c.get(i, j), 8.0);
            }
        }
    }

    #[test]
    fn dispatch_large_shapes_matches_scalar_reference() {
        let a = Matrix::fill(48, 96, 1.0).unwrap();
        let b = Matrix::fill(96, 32, 1.0).unwrap();
        let mut c = Matrix::zeros(48, 32).unwrap();
        dispatch(&a, &b, &mut c);
        for i in 0..48 {
            for j in 0..32 {
                assert!((c.get(i, j) - 96.0).abs() <= 1e-3);
            }
        }
    }
}
