//! A dense f32 matrix-multiply engine built directly on Apple's undocumented
//! AMX (Apple Matrix Coprocessor) instructions.
//!
//! This crate issues AMX instructions itself — no BLAS, no Accelerate
//! framework — and drives a hand-tuned 16x16xK micro-kernel, a column-major
//! panel packer, and a multi-threaded tile scheduler on top of them. It
//! targets Apple Silicon (M1 through M4); on any other target, or if AMX
//! turns out to be unavailable on this particular machine, [`Matrix::matmul`]
//! transparently falls back to a scalar reference implementation.
//!
//! # Resources
//!
//!  - <https://gist.github.com/dougallj/7a75a3be1ec69ca550e7c36dc75e0d6f>
//!  - <https://www.realworldtech.com/forum/?threadid=187087&curpostid=187120>
//!
//! # Example
//!
//! ```
//! use amx_matmul::Matrix;
//!
//! let a = Matrix::from_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b = Matrix::from_slice(2, 2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
//! let c = a.matmul(&b).unwrap();
//! assert_eq!(c.get(0, 0), 19.0);
//! assert_eq!(c.get(1, 1), 50.0);
//! ```
//!
//! # Layers
//!
//! From the bottom up: [`regs`] (typed register handles) and [`ops`] (the
//! `AmxOps` trait) define the instruction surface; [`raw`] and [`native`]
//! implement it on real `aarch64` hardware, while [`emu`] implements it in
//! portable software for testing. [`encode`] packs typed arguments into the
//! 64-bit operand words those instructions expect. [`scope`] guarantees a
//! matched enable/disable pair around any use of the native backend.
//! [`panel`] and [`kernel`] are the packer and micro-kernel; [`scalar`] is
//! the reference path; [`scheduler`] partitions work across threads; and
//! [`matmul`]/[`matrix`] are the public surface most users actually call.

mod detect;
mod emu;
pub mod encode;
mod error;
mod kernel;
mod matmul;
mod matrix;
mod ops;
mod panel;
mod regs;
mod scalar;
mod scheduler;
mod scope;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "aarch64")] {
        mod native;
        mod raw;
    }
}

pub use crate::detect::{detect, is_available, perf_core_count, Chip};
pub use crate::error::{MatmulError, MatrixError};
pub use crate::matmul::matmul;
pub use crate::matrix::Matrix;
pub use crate::ops::AmxOps;
pub use crate::regs::{Pair, XBytes, XRow, YBytes, YRow, ZRow};
pub use crate::scope::{AmxScope, AmxUnavailable};

#[cfg(any(doc, target_arch = "aarch64"))]
pub use crate::native::NativeOps;

pub use crate::emu::EmulatedOps;

/// Re-exports of the commonly used names, for `use amx_matmul::prelude::*;`.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{AmxOps as _, Matrix};
}
