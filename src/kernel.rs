//! The 16x16 x K micro-kernel (spec §4.6).
//!
//! Generic over [`AmxOps`] so it can run against either the native hardware
//! backend or the software emulator — the emulator path is what lets this
//! file's tests assert on Z-row striding and K-unrolling without needing
//! Apple Silicon.

use crate::encode;
use crate::ops::AmxOps;
use crate::regs::{Pair, XBytes, YBytes, ZRow};

/// 64 bytes of zeros, used to `LDZ`-zero the accumulator before a tile.
static ZERO_ROW: [u8; 64] = [0u8; 64];

/// Compute a 16x16 output tile: `C[0..16, 0..16] = sum_k A[:, k] outer B[k, :]`.
///
/// `a_panel` is the packed A panel (column-major, stride 16, `k` columns —
/// see [`crate::panel::pack_panel`]). `b` points at the upper-left of the
/// `k x 16` B tile (row-major, stride `b_stride`). `c` points at the
/// upper-left of the 16x16 output tile (row-major, stride `c_stride`); it
/// is written, never read — callers must have already zeroed it if they
/// intend to accumulate across calls (the scheduler's edge-tile handling
/// does this itself rather than relying on this kernel).
///
/// # Safety
/// `ops` must be driven inside an open AMX enable scope (native backend) or
/// be the software emulator. `a_panel` must have `k * 16` valid floats, `b`
/// must have `k` rows of 16 valid floats at stride `b_stride`, and `c` must
/// have 16 rows of 16 valid floats at stride `c_stride`.
pub unsafe fn micro_kernel_16x16<O: AmxOps>(
    ops: &mut O,
    a_panel: *const f32,
    k: usize,
    b: *const f32,
    b_stride: usize,
    c: *mut f32,
    c_stride: usize,
) {
    // 1. Zero the 16 f32-matrix-mode accumulator rows (0, 4, 8, .., 60).
    let z_control_zero = |row: usize| encode::z_load_store(ZRow(row), Pair::Single);
    for i in 0..16 {
        ops.ldz(
            z_control_zero(i * 4),
            ZERO_ROW.as_ptr() as *const (),
        );
    }

    // 2. K-loop, unrolled by 8.
    let full_blocks = k / 8;
    let mut kk = 0usize;
    for _ in 0..full_blocks {
        // Load 8 A columns into Y0..Y7.
        for s in 0..8 {
            let y_ctrl = encode::xy_load_store(s, Pair::Single);
            let addr = a_panel.add((kk + s) * 16) as *const ();
            ops.ldy(y_ctrl, addr);
        }
        // Interleave LDX and FMA: LDX0, LDX1, FMA(0); LDX2, FMA(1); ...; LDX7, FMA(6); FMA(7).
        let ldx = |ops: &mut O, s: usize| {
            let x_ctrl = encode::xy_load_store(s, Pair::Single);
            let addr = b.add((kk + s) * b_stride) as *const ();
            ops.ldx(x_ctrl, addr);
        };
        let fma = |ops: &mut O, s: usize| {
            let operand = encode::fma(XBytes(s * 64), YBytes(s * 64), ZRow(0), false);
            ops.fma32(operand);
        };
        ldx(ops, 0);
        ldx(ops, 1);
        fma(ops, 0);
        for s in 1..7 {
            ldx(ops, s + 1);
            fma(ops, s);
        }
        fma(ops, 7);
        kk += 8;
    }

    // 3. K-remainder: one LDY, one LDX, one FMA32 per residual k.
    while kk < k {
        let y_ctrl = encode::xy_load_store(0, Pair::Single);
        ops.ldy(y_ctrl, a_panel.add(kk * 16) as *const ());
        let x_ctrl = encode::xy_load_store(0, Pair::Single);
        ops.ldx(x_ctrl, b.add(kk * b_stride) as *const ());
        let operand = encode::fma(XBytes(0), YBytes(0), ZRow(0), false);
        ops.fma32(operand);
        kk += 1;
    }

    // 4. Store the 16 accumulator rows to C.
    for i in 0..16 {
        let z_ctrl = encode::z_load_store(ZRow(i * 4), Pair::Single);
        let addr = c.add(i * c_stride) as *mut ();
        ops.stz(z_ctrl, addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emu::EmulatedOps;

    /// Build a 16xK A panel and Kx16 B tile and check the micro-kernel
    /// against a plain scalar reference, for several K including a full
    /// unrolled block, a remainder, and both together.
    fn check(k: usize) {
        let mut a_panel = vec![0.0f32; k * 16];
        let mut b = vec![0.0f32; k * 16];
        for kk in 0..k {
            for r in 0..16 {
                a_panel[kk * 16 + r] = ((kk * 16 + r) % 7) as f32 - 3.0;
            }
            for j in 0..16 {
                b[kk * 16 + j] = ((kk * 16 + j) % 5) as f32 - 2.0;
            }
        }
        let mut c = vec![0.0f32; 16 * 16];

        let mut ops = EmulatedOps::new();
        unsafe {
            micro_kernel_16x16(
                &mut ops,
                a_panel.as_ptr(),
                k,
                b.as_ptr(),
                16,
                c.as_mut_ptr(),
                16,
            );
        }

        for i in 0..16 {
            for j in 0..16 {
                let expected: f32 = (0..k).map(|kk| a_panel[kk * 16 + i] * b[kk * 16 + j]).sum();
                let got = c[i * 16 + j];
                assert!(
                    (got - expected).abs() <= 1e-3 * (1.0f32).max(expected.abs()),
                    "mismatch at ({i},{j}) for k={k}: got {got}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn remainder_only() {
        check(3);
    }

    #[test]
    fn one_full_unrolled_block() {
        check(8);
    }

    #[test]
    fn full_block_plus_remainder() {
        check(13);
    }

    #[test]
    fn multiple_full_blocks() {
        check(32);
    }

    #[test]
    fn zero_k_produces_zero_tile() {
        let a_panel = vec![0.0f32; 0];
        let b = vec![0.0f32; 0];
        let mut c = vec![1.0f32; 16 * 16];
        let mut ops = EmulatedOps::new();
        unsafe {
            micro_kernel_16x16(&mut ops, a_panel.as_ptr(), 0, b.as_ptr(), 16, c.as_mut_ptr(), 16);
        }
        assert!(c.iter().all(|&x| x == 0.0));
    }
}
