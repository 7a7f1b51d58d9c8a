//! wgpu-based accelerator probing for Vulkan/Metal/DX12 backends.
//!
//! Provides adapter enumeration and capability extraction via the `wgpu`
//! crate. Enumeration order is stable within a process and defines the
//! accelerator indices accepted by the stream constructor.

use std::fmt;

/// Compute-relevant limits extracted from a wgpu adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WgpuLimits {
    /// Maximum size of a single GPU buffer in bytes.
    pub max_buffer_size: u64,
    /// Maximum number of storage buffers per shader stage.
    pub max_storage_buffers: u32,
    /// Maximum total invocations per compute workgroup.
    pub max_compute_invocations: u32,
    /// Maximum compute workgroups per dispatch dimension.
    pub max_workgroups_per_dimension: u32,
}

/// Device type reported by wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WgpuDeviceType {
    /// Discrete GPU (dedicated graphics card).
    DiscreteGpu,
    /// Integrated GPU (shares memory with CPU).
    IntegratedGpu,
    /// Software/CPU renderer.
    Cpu,
    /// Virtual GPU (e.g. in a VM).
    VirtualGpu,
    /// Unknown or unrecognised device type.
    Other,
}

impl fmt::Display for WgpuDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiscreteGpu => write!(f, "DiscreteGpu"),
            Self::IntegratedGpu => write!(f, "IntegratedGpu"),
            Self::Cpu => write!(f, "Cpu"),
            Self::VirtualGpu => write!(f, "VirtualGpu"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// GPU backend used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WgpuBackend {
    Vulkan,
    Metal,
    Dx12,
    Gl,
    BrowserWebGpu,
    Other,
}

impl fmt::Display for WgpuBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vulkan => write!(f, "Vulkan"),
            Self::Metal => write!(f, "Metal"),
            Self::Dx12 => write!(f, "DX12"),
            Self::Gl => write!(f, "GL"),
            Self::BrowserWebGpu => write!(f, "BrowserWebGpu"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Information about a single wgpu-discovered accelerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WgpuDeviceInfo {
    /// Human-readable adapter name.
    pub name: String,
    /// Vendor identifier (PCI vendor ID).
    pub vendor: u32,
    /// Backend API used by this adapter.
    pub backend: WgpuBackend,
    /// Device type classification.
    pub device_type: WgpuDeviceType,
    /// Driver name (may be empty on some platforms).
    pub driver: String,
    /// Additional driver information string.
    pub driver_info: String,
    /// Compute-relevant limits.
    pub limits: WgpuLimits,
}

fn convert_backend(b: wgpu::Backend) -> WgpuBackend {
    match b {
        wgpu::Backend::Vulkan => WgpuBackend::Vulkan,
        wgpu::Backend::Metal => WgpuBackend::Metal,
        wgpu::Backend::Dx12 => WgpuBackend::Dx12,
        wgpu::Backend::Gl => WgpuBackend::Gl,
        wgpu::Backend::BrowserWebGpu => WgpuBackend::BrowserWebGpu,
        _ => WgpuBackend::Other,
    }
}

fn convert_device_type(dt: wgpu::DeviceType) -> WgpuDeviceType {
    match dt {
        wgpu::DeviceType::DiscreteGpu => WgpuDeviceType::DiscreteGpu,
        wgpu::DeviceType::IntegratedGpu => WgpuDeviceType::IntegratedGpu,
        wgpu::DeviceType::Cpu => WgpuDeviceType::Cpu,
        wgpu::DeviceType::VirtualGpu => WgpuDeviceType::VirtualGpu,
        _ => WgpuDeviceType::Other,
    }
}

fn adapter_to_info(adapter: &wgpu::Adapter) -> WgpuDeviceInfo {
    let info = adapter.get_info();
    let limits = adapter.limits();

    WgpuDeviceInfo {
        name: info.name.clone(),
        vendor: info.vendor,
        backend: convert_backend(info.backend),
        device_type: convert_device_type(info.device_type),
        driver: info.driver.clone(),
        driver_info: info.driver_info.clone(),
        limits: WgpuLimits {
            max_buffer_size: limits.max_buffer_size,
            max_storage_buffers: limits.max_storage_buffers_per_shader_stage,
            max_compute_invocations: limits.max_compute_invocations_per_workgroup,
            max_workgroups_per_dimension: limits.max_compute_workgroups_per_dimension,
        },
    }
}

/// Enumerate all wgpu adapters and return their device info.
///
/// Returns an empty `Vec` if no adapters are found or wgpu initialisation
/// fails.
pub fn probe_wgpu_devices() -> Vec<WgpuDeviceInfo> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapters = instance.enumerate_adapters(wgpu::Backends::all());
        adapters.iter().map(adapter_to_info).collect()
    })
}
