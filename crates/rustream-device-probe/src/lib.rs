//! Execution-target detection and enumeration for the rustream benchmark.
//!
//! Provides CPU capability queries and wgpu adapter enumeration, and flattens
//! both into the target list that `ExecutionTarget::Accelerator(i)` indexes
//! into. Stateless and side-effect-free; "zero accelerators" is a valid
//! answer, not an error.

pub mod wgpu_probe;

pub use wgpu_probe::{probe_wgpu_devices, WgpuBackend, WgpuDeviceInfo, WgpuDeviceType};

use rustream_common::ExecutionTarget;

// ── CPU capabilities ─────────────────────────────────────────────────────────

/// CPU capabilities detected at runtime.
///
/// Obtained by calling [`probe_cpu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuCapabilities {
    /// Human-readable CPU model name, when the platform exposes one.
    pub model_name: String,
    /// Number of logical CPU cores available to the process (always ≥ 1).
    pub core_count: usize,
    /// AVX2 SIMD extension available on this CPU (`x86_64` only).
    pub has_avx2: bool,
    /// NEON SIMD extension available (always `true` on `AArch64`, `false` elsewhere).
    pub has_neon: bool,
}

/// Probe the current CPU and return its capabilities.
///
/// `core_count` is derived from [`std::thread::available_parallelism`] and is
/// guaranteed to be ≥ 1. The model name comes from `/proc/cpuinfo` on Linux
/// and falls back to a generic label elsewhere.
pub fn probe_cpu() -> CpuCapabilities {
    let core_count = std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(1);

    let model_name = cpu_model_name().unwrap_or_else(|| "CPU".to_string());

    #[cfg(target_arch = "x86_64")]
    let (has_avx2, has_neon) = (is_x86_feature_detected!("avx2"), false);

    #[cfg(target_arch = "aarch64")]
    let (has_avx2, has_neon) = (false, true);

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    let (has_avx2, has_neon) = (false, false);

    CpuCapabilities { model_name, core_count, has_avx2, has_neon }
}

fn cpu_model_name() -> Option<String> {
    std::fs::read_to_string("/proc/cpuinfo").ok().and_then(|info| {
        info.lines()
            .find(|l| l.starts_with("model name"))
            .and_then(|l| l.split(':').nth(1))
            .map(|name| name.trim().to_string())
    })
}

// ── Target enumeration ───────────────────────────────────────────────────────

/// One selectable execution target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    /// The target identifier the stream constructor accepts.
    pub target: ExecutionTarget,
    /// Human-readable device name for harness display.
    pub name: String,
    /// Driver description, when the backend exposes one.
    pub driver: String,
}

/// Enumerate every execution target visible to this process.
///
/// The host CPU is always listed first, followed by one entry per wgpu
/// adapter in enumeration order; `ExecutionTarget::Accelerator(i)` refers to
/// the `i`-th adapter of that same enumeration.
pub fn enumerate_targets() -> Vec<TargetInfo> {
    let cpu = probe_cpu();
    let mut targets = vec![TargetInfo {
        target: ExecutionTarget::Host,
        name: format!("{} ({} threads)", cpu.model_name, cpu.core_count),
        driver: String::new(),
    }];

    for (idx, adapter) in probe_wgpu_devices().into_iter().enumerate() {
        targets.push(TargetInfo {
            target: ExecutionTarget::Accelerator(idx),
            name: adapter.name,
            driver: if adapter.driver_info.is_empty() {
                adapter.driver
            } else {
                format!("{} ({})", adapter.driver, adapter.driver_info)
            },
        });
    }

    tracing::debug!(count = targets.len(), "execution targets enumerated");
    targets
}
