//! Pure operand-encoding functions (spec §4.2).
//!
//! These never touch memory or emit instructions; they only pack typed
//! arguments into the 64-bit operand word an AMX opcode expects. Callers are
//! not expected to pre-mask their inputs — every field here is masked to its
//! declared width before being OR'd in.

use crate::regs::{Pair, XBytes, YBytes, ZRow};

const XY_REG_SHIFT: u32 = 56;
const XY_REG_MASK: u64 = 0x7; // 3 bits, [0, 7]
const Z_ROW_SHIFT_LS: u32 = 56;
const Z_ROW_MASK_LS: u64 = 0x3f; // 6 bits, [0, 63]
const PAIR_BIT: u64 = 1 << 62;

const FMA_Y_MASK: u64 = 0x1ff; // bits 0..=8
const FMA_X_SHIFT: u32 = 10;
const FMA_X_MASK: u64 = 0x1ff; // bits 10..=18
const FMA_Z_SHIFT: u32 = 20;
const FMA_Z_MASK: u64 = 0x3f; // bits 20..=25
const FMA_VECTOR_BIT: u64 = 1 << 63;

/// Encode the control bits (everything but the address) for an X/Y
/// load/store of 64 or 128 bytes. The address is supplied separately by the
/// raw-layer wrapper, which ORs it into the low 56 bits.
pub fn xy_load_store(reg: usize, pair: Pair) -> u64 {
    let reg = (reg as u64) & XY_REG_MASK;
    let pair_bit = match pair {
        Pair::Single => 0,
        Pair::Pair => PAIR_BIT,
    };
    (reg << XY_REG_SHIFT) | pair_bit
}

/// Encode the control bits for a Z load/store of one or two 64-byte rows.
pub fn z_load_store(row: ZRow, pair: Pair) -> u64 {
    let row = (row.0 as u64) & Z_ROW_MASK_LS;
    let pair_bit = match pair {
        Pair::Single => 0,
        Pair::Pair => PAIR_BIT,
    };
    (row << Z_ROW_SHIFT_LS) | pair_bit
}

/// Encode an FMA/FMS/MAC operand: Y byte offset, X byte offset, Z row, and
/// the vector-mode flag (`false` = outer product, `true` = pointwise).
pub fn fma(x_off: XBytes, y_off: YBytes, z_row: ZRow, vector_mode: bool) -> u64 {
    let y = (y_off.0 as u64) & FMA_Y_MASK;
    let x = ((x_off.0 as u64) & FMA_X_MASK) << FMA_X_SHIFT;
    let z = ((z_row.0 as u64) & FMA_Z_MASK) << FMA_Z_SHIFT;
    let v = if vector_mode { FMA_VECTOR_BIT } else { 0 };
    y | x | z | v
}
