//! The AMX enable/disable scope (spec §4.3).
//!
//! Generalizes the teacher crate's `AmxCtx` (enable on `new`, disable on
//! `Drop`) with nesting support: opening a scope while one is already open
//! on the same thread just bumps a counter, and `CLR` is only emitted when
//! the outermost scope closes. This lets a worker call into a helper that
//! also wants to open a scope without double-issuing `SET`/`CLR`.

use crate::detect;
use std::cell::Cell;

thread_local! {
    static NEST_DEPTH: Cell<u32> = Cell::new(0);
}

/// AMX was not opened because this core/process does not support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("AMX is not available on this hardware")]
pub struct AmxUnavailable;

/// An open AMX enable scope on the calling thread.
///
/// While a `AmxScope` is alive, `AmxOps` methods (via [`crate::native::NativeOps`])
/// are well-defined to call on this thread. Dropping the outermost `AmxScope`
/// issues `CLR`. Must not be sent to another thread (AMX state is
/// thread-local hardware state); this type deliberately does not implement
/// `Send`.
pub struct AmxScope {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl AmxScope {
    /// Open (or re-enter) the AMX enable scope on the calling thread.
    ///
    /// Returns [`AmxUnavailable`] if this process has no usable AMX
    /// coprocessor; callers should fall back to the scalar path in that
    /// case rather than treating it as an error to propagate.
    pub fn enter() -> Result<Self, AmxUnavailable> {
        if !detect::is_available() {
            return Err(AmxUnavailable);
        }
        let depth = NEST_DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });
        if depth == 1 {
            // SAFETY: `is_available` confirmed AMX support, and this is the
            // outermost scope on this thread, so no SET is currently open.
            #[cfg(target_arch = "aarch64")]
            unsafe {
                crate::raw::set();
            }
        }
        Ok(AmxScope {
            _not_send: std::marker::PhantomData,
        })
    }

    /// Construct a native backend for issuing instructions inside this
    /// scope. Borrows `self` for the duration of use, which keeps the
    /// scope alive at least as long as any `NativeOps` built from it.
    #[cfg(target_arch = "aarch64")]
    pub fn ops(&mut self) -> crate::native::NativeOps<'_> {
        // SAFETY: `self` proves an enable scope is open on this thread.
        unsafe { crate::native::NativeOps::new() }
    }
}

impl Drop for AmxScope {
    fn drop(&mut self) {
        let depth = NEST_DEPTH.with(|d| {
            let next = d.get().saturating_sub(1);
            d.set(next);
            next
        });
        if depth == 0 {
            #[cfg(target_arch = "aarch64")]
            unsafe {
                crate::raw::clr();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_scope_is_err_off_hardware() {
        if !detect::is_available() {
            assert!(AmxScope::enter().is_err());
        }
    }

    #[test]
    fn nested_enter_does_not_panic() {
        if detect::is_available() {
            let _outer = AmxScope::enter().unwrap();
            let _inner = AmxScope::enter().unwrap();
        }
    }
}
