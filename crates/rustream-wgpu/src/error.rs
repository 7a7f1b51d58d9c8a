//! Error types for the wgpu stream backend.

use rustream_common::StreamError;
use thiserror::Error;

/// Failures raised while setting up or driving the wgpu backend.
#[derive(Debug, Error)]
pub enum WgpuStreamError {
    /// No adapter exists at the requested accelerator index.
    #[error("no wgpu adapter at accelerator index {index}")]
    AdapterNotFound {
        /// The index that was requested.
        index: usize,
    },

    /// The adapter refused to provide a device.
    #[error("wgpu device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The array size cannot be addressed by a 32-bit shader index.
    #[error("array of {size} elements exceeds the shader-addressable range")]
    UnsupportedArraySize {
        /// The requested array size in elements.
        size: usize,
    },

    /// A single array would exceed the adapter's buffer size limit.
    #[error("array buffer of {requested} bytes exceeds the adapter limit of {limit}")]
    BufferTooLarge {
        /// Requested buffer size in bytes.
        requested: u64,
        /// The adapter's `max_buffer_size` limit.
        limit: u64,
    },

    /// Mapping a staging buffer for readback failed.
    #[error("buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    /// The map callback was dropped before delivering a result.
    #[error("buffer map callback dropped before completion")]
    MapInterrupted,
}

impl From<WgpuStreamError> for StreamError {
    fn from(err: WgpuStreamError) -> Self {
        StreamError::Device { reason: err.to_string() }
    }
}
