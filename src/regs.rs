//! Typed register and offset handles shared by every layer above the raw
//! opcode emitters.
//!
//! These are plain newtypes: they exist so call sites read `XRow(3)` instead
//! of a bare `3usize` that could just as easily be a `ZRow` or a byte offset.

/// Index of one of the 8 X registers, in range `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XRow(pub usize);

/// Index of one of the 8 Y registers, in range `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YRow(pub usize);

/// Index of one of the 64 Z accumulator rows, in range `0..64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZRow(pub usize);

/// Byte offset into the 512-byte X operand pool, in range `0..512`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XBytes(pub usize);

/// Byte offset into the 512-byte Y operand pool, in range `0..512`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YBytes(pub usize);

/// Whether a load/store targets one register/row or the pair starting at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    Single,
    Pair,
}

impl Default for Pair {
    fn default() -> Self {
        Pair::Single
    }
}
