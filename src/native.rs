//! The native hardware backend for [`crate::ops::AmxOps`] (`aarch64` only).
//!
//! This is the thinnest possible adapter over [`crate::raw`]: it just ORs
//! the caller-supplied control bits with the low 56 address bits of the
//! pointer and forwards to the matching raw opcode.

#![cfg(target_arch = "aarch64")]

use crate::ops::AmxOps;
use crate::raw;
use std::marker::PhantomData;

const ADDRESS_MASK: u64 = 0x00ff_ffff_ffff_ffff;

/// Issues AMX instructions directly to the hardware.
///
/// Not `Send`: AMX enable/disable state and register-file contents are
/// thread-local, so an `AmxOps` handle for the native backend must not
/// cross threads. The lifetime parameter lets callers tie a `&mut NativeOps`
/// borrow to the scope in which AMX is known to be enabled.
pub struct NativeOps<'a>(PhantomData<(&'a mut (), *mut ())>);

impl<'a> NativeOps<'a> {
    /// Construct a handle for issuing AMX instructions on this thread.
    ///
    /// # Safety
    /// The calling thread must currently be inside a matching
    /// [`crate::scope::AmxScope`] (or otherwise have issued `SET` without an
    /// intervening `CLR`), and the target processor must actually support
    /// AMX.
    #[inline]
    pub unsafe fn new() -> Self {
        Self(PhantomData)
    }

    /// Reborrow with a narrower lifetime, e.g. to pass into a helper
    /// function without giving up ownership of the outer handle.
    #[inline]
    pub fn borrow_mut(&mut self) -> NativeOps<'_> {
        NativeOps(PhantomData)
    }
}

impl AmxOps for NativeOps<'_> {
    #[inline(always)]
    unsafe fn ldx(&mut self, control: u64, ptr: *const ()) {
        raw::ldx(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn ldy(&mut self, control: u64, ptr: *const ()) {
        raw::ldy(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn stx(&mut self, control: u64, ptr: *mut ()) {
        raw::stx(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn sty(&mut self, control: u64, ptr: *mut ()) {
        raw::sty(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn ldz(&mut self, control: u64, ptr: *const ()) {
        raw::ldz(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn stz(&mut self, control: u64, ptr: *mut ()) {
        raw::stz(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn ldzi(&mut self, control: u64, ptr: *const ()) {
        raw::ldzi(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    unsafe fn stzi(&mut self, control: u64, ptr: *mut ()) {
        raw::stzi(control | (ptr as u64 & ADDRESS_MASK));
    }
    #[inline(always)]
    fn extrx(&mut self, operand: u64) {
        unsafe { raw::extrx(operand) };
    }
    #[inline(always)]
    fn extry(&mut self, operand: u64) {
        unsafe { raw::extry(operand) };
    }
    #[inline(always)]
    fn fma64(&mut self, operand: u64) {
        unsafe { raw::fma64(operand) };
    }
    #[inline(always)]
    fn fms64(&mut self, operand: u64) {
        unsafe { raw::fms64(operand) };
    }
    #[inline(always)]
    fn fma32(&mut self, operand: u64) {
        unsafe { raw::fma32(operand) };
    }
    #[inline(always)]
    fn fms32(&mut self, operand: u64) {
        unsafe { raw::fms32(operand) };
    }
    #[inline(always)]
    fn mac16(&mut self, operand: u64) {
        unsafe { raw::mac16(operand) };
    }
    #[inline(always)]
    fn fma16(&mut self, operand: u64) {
        unsafe { raw::fma16(operand) };
    }
    #[inline(always)]
    fn fms16(&mut self, operand: u64) {
        unsafe { raw::fms16(operand) };
    }
    #[inline(always)]
    fn vecint(&mut self, operand: u64) {
        unsafe { raw::vecint(operand) };
    }
    #[inline(always)]
    fn vecfp(&mut self, operand: u64) {
        unsafe { raw::vecfp(operand) };
    }
    #[inline(always)]
    fn matint(&mut self, operand: u64) {
        unsafe { raw::matint(operand) };
    }
    #[inline(always)]
    fn matfp(&mut self, operand: u64) {
        unsafe { raw::matfp(operand) };
    }
    #[inline(always)]
    fn genlut(&mut self, operand: u64) {
        unsafe { raw::genlut(operand) };
    }
}
