//! Hardware detection: chip family, AMX availability, and performance-core
//! count (spec §4.10/§6). All external collaborators in the distilled spec,
//! carried here because a usable crate needs them and they cost little.

use std::sync::OnceLock;

/// The detected Apple Silicon chip family, or lack thereof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip {
    /// Not Apple Silicon (or brand string unreadable).
    None,
    /// Apple Silicon, but not one of the recognized `M1`..`M4` families.
    Unknown,
    M1,
    M2,
    M3,
    M4,
}

static CHIP: OnceLock<Chip> = OnceLock::new();
static PERF_CORES: OnceLock<usize> = OnceLock::new();

/// Detect the chip family, caching the result for the life of the process.
pub fn detect() -> Chip {
    *CHIP.get_or_init(|| {
        let chip = brand_string().map(|s| classify(&s)).unwrap_or(Chip::None);
        log::debug!("amx_matmul: detected chip family {:?}", chip);
        chip
    })
}

/// Whether this process can use the AMX coprocessor: Apple Silicon
/// (`detect() != Chip::None`) and built for `aarch64`.
pub fn is_available() -> bool {
    cfg!(target_arch = "aarch64") && detect() != Chip::None
}

/// Number of performance cores as reported by the OS, clamped to `[1, 16]`.
/// Used by the tile scheduler to bound worker-thread fan-out.
pub fn perf_core_count() -> usize {
    *PERF_CORES.get_or_init(|| {
        let n = perf_core_count_raw().unwrap_or(1).clamp(1, 16);
        log::debug!("amx_matmul: perf_core_count = {}", n);
        n
    })
}

fn classify(brand: &str) -> Chip {
    if brand.contains("M4") {
        Chip::M4
    } else if brand.contains("M3") {
        Chip::M3
    } else if brand.contains("M2") {
        Chip::M2
    } else if brand.contains("M1") {
        Chip::M1
    } else if brand.contains("Apple") {
        Chip::Unknown
    } else {
        Chip::None
    }
}

#[cfg(target_os = "macos")]
fn brand_string() -> Option<String> {
    sysctl_string("machdep.cpu.brand_string")
}

#[cfg(not(target_os = "macos"))]
fn brand_string() -> Option<String> {
    None
}

#[cfg(target_os = "macos")]
fn perf_core_count_raw() -> Option<usize> {
    sysctl_string("hw.perflevel0.physicalcpu")
        .or_else(|| sysctl_string("hw.physicalcpu"))
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(not(target_os = "macos"))]
fn perf_core_count_raw() -> Option<usize> {
    None
}

/// Read a macOS `sysctl` string-or-integer value by name via `libc`'s raw
/// `sysctlbyname`, in the style of the `unsafe extern "C"` FFI blocks used
/// elsewhere in the corpus for macOS-only syscalls (e.g. Accelerate's
/// `cblas_sgemm`). Returns `None` if the sysctl is absent or the value isn't
/// valid UTF-8 once the trailing NUL is stripped.
#[cfg(target_os = "macos")]
fn sysctl_string(name: &str) -> Option<String> {
    use std::ffi::CString;

    let cname = CString::new(name).ok()?;
    let mut len: libc::size_t = 0;
    // First call: discover the required buffer size.
    let rc = unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            std::ptr::null_mut(),
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc != 0 || len == 0 {
        return None;
    }

    let mut buf = vec![0u8; len];
    let rc = unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc != 0 {
        return None;
    }

    // `sysctlbyname` may report the value either as a NUL-terminated string
    // or as a fixed-width integer (e.g. `hw.physicalcpu` is an `int32_t`);
    // try the string interpretation first, then fall back to a little-endian
    // integer read.
    if let Some(end) = buf.iter().position(|&b| b == 0) {
        if let Ok(s) = std::str::from_utf8(&buf[..end]) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    if buf.len() >= 4 {
        let mut le = [0u8; 4];
        le.copy_from_slice(&buf[..4]);
        return Some(i32::from_le_bytes(le).to_string());
    }
    None
}
