//! Low-level demo: load operands into X/Y directly and drive one FMA32
//! outer product by hand, bypassing the packer/micro-kernel/scheduler
//! entirely. Mirrors the teacher crate's `loads` example, adapted from
//! raw `AmxCtx` calls to this crate's `AmxScope` + `AmxOps` split.
//!
//! `AmxScope::ops` only exists on `aarch64` (it hands out the native
//! instruction-issue backend), so the actual demo body is gated on that
//! target; every other target gets a short explanatory no-op `main`.

#[cfg(target_arch = "aarch64")]
fn main() {
    use amx_matmul::{AmxOps, AmxScope, Pair, XBytes, YBytes, ZRow};

    let mut scope = match AmxScope::enter() {
        Ok(scope) => scope,
        Err(_) => {
            eprintln!("AMX is not available on this machine; nothing to demo.");
            return;
        }
    };
    let mut ops = scope.ops();

    for i in 0..8 {
        let x: [f32; 16] = std::array::from_fn(|j| (16 * i + j + 1) as f32);
        unsafe {
            ops.ldx(amx_matmul::encode::xy_load_store(i, Pair::Single), x.as_ptr() as *const ());
            ops.ldy(amx_matmul::encode::xy_load_store(i, Pair::Single), x.as_ptr() as *const ());
        }
    }

    ops.fma32(amx_matmul::encode::fma(XBytes(0), YBytes(0), ZRow(0), false));
    ops.fma32(amx_matmul::encode::fma(XBytes(196), YBytes(196), ZRow(1), false));
    ops.fma32(amx_matmul::encode::fma(XBytes(128), YBytes(128), ZRow(2), false));
    ops.fma32(amx_matmul::encode::fma(XBytes(64), YBytes(64), ZRow(3), false));

    let mut z = [0.0f32; 16];
    unsafe {
        ops.stz(amx_matmul::encode::z_load_store(ZRow(0), Pair::Single), z.as_mut_ptr() as *mut ());
    }
    for (i, v) in z.iter().enumerate() {
        println!("z[0][{i}]: {v}");
    }
}

#[cfg(not(target_arch = "aarch64"))]
fn main() {
    eprintln!("AMX demo only runs on aarch64");
}
