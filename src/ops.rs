//! [`AmxOps`]: the low-level AMX register-file operations, generic over
//! whichever backend actually executes them (native hardware via [`crate::native`],
//! or the portable software emulator in [`crate::emu`]).
//!
//! Every method here corresponds 1:1 to one opcode ordinal from spec §4.1.
//! Load/store methods take the pre-encoded control bits (register index,
//! pair flag) separately from the pointer, so implementors can OR the
//! address in themselves; the remaining methods are fully self-contained
//! 64-bit operands (the FMA family, and the vector/matrix/lookup ops that
//! never touch memory directly).

/// The low-level AMX instruction surface.
///
/// Implementors are either the native hardware backend ([`crate::native::NativeOps`],
/// `aarch64`-only) or the software emulator ([`crate::emu::EmulatedOps`], portable).
/// The matmul engine in this crate only ever calls `ldx`, `ldy`, `ldz`, `stz`,
/// and `fma32`; the rest of the trait is carried for users building their own
/// kernels on top of the same register-file primitives.
pub trait AmxOps {
    /// Load 64 (or, with the pair bit set, 128) bytes from `ptr` into X.
    ///
    /// # Safety
    /// `ptr` must be valid to read the requested number of bytes from, and
    /// the scope's enable/disable invariant (§4.3) must already be upheld by
    /// the caller.
    unsafe fn ldx(&mut self, control: u64, ptr: *const ());
    /// Load 64 (or 128) bytes from `ptr` into Y. See [`Self::ldx`] for safety.
    unsafe fn ldy(&mut self, control: u64, ptr: *const ());
    /// Store 64 (or 128) bytes from X to `ptr`. See [`Self::ldx`] for safety.
    unsafe fn stx(&mut self, control: u64, ptr: *mut ());
    /// Store 64 (or 128) bytes from Y to `ptr`. See [`Self::ldx`] for safety.
    unsafe fn sty(&mut self, control: u64, ptr: *mut ());
    /// Load one (or two) 64-byte rows from `ptr` into Z. See [`Self::ldx`] for safety.
    unsafe fn ldz(&mut self, control: u64, ptr: *const ());
    /// Store one (or two) 64-byte rows from Z to `ptr`. See [`Self::ldx`] for safety.
    unsafe fn stz(&mut self, control: u64, ptr: *mut ());
    /// Load one (or two) 64-byte rows from `ptr` into Z, with lane interleaving.
    /// See [`Self::ldx`] for safety.
    unsafe fn ldzi(&mut self, control: u64, ptr: *const ());
    /// Store one (or two) 64-byte rows from Z to `ptr`, with lane interleaving.
    /// See [`Self::ldx`] for safety.
    unsafe fn stzi(&mut self, control: u64, ptr: *mut ());

    /// Extract a row of X into Z (no memory access).
    fn extrx(&mut self, operand: u64);
    /// Extract a row of Y into Z (no memory access).
    fn extry(&mut self, operand: u64);

    /// 64-bit float fused multiply-add into Z.
    fn fma64(&mut self, operand: u64);
    /// 64-bit float fused multiply-subtract into Z.
    fn fms64(&mut self, operand: u64);
    /// 32-bit float fused multiply-add into Z. Used by the matmul micro-kernel.
    fn fma32(&mut self, operand: u64);
    /// 32-bit float fused multiply-subtract into Z.
    fn fms32(&mut self, operand: u64);
    /// 16-bit integer multiply-accumulate into Z.
    fn mac16(&mut self, operand: u64);
    /// 16-bit float fused multiply-add into Z.
    fn fma16(&mut self, operand: u64);
    /// 16-bit float fused multiply-subtract into Z.
    fn fms16(&mut self, operand: u64);

    /// Vectorized integer ALU op (no memory access).
    fn vecint(&mut self, operand: u64);
    /// Vectorized float ALU op (no memory access).
    fn vecfp(&mut self, operand: u64);
    /// Matrix-mode integer ALU op (no memory access).
    fn matint(&mut self, operand: u64);
    /// Matrix-mode float ALU op (no memory access).
    fn matfp(&mut self, operand: u64);
    /// Generic table lookup. Exposed for custom kernels; the matmul engine
    /// in this crate never calls it.
    fn genlut(&mut self, operand: u64);
}
