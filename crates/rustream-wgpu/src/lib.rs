//! wgpu compute backend for the rustream memory-bandwidth benchmark.
//!
//! Implements the `rustream-kernels` [`StreamProvider`] contract on
//! Vulkan, Metal, and DX12 via [wgpu](https://wgpu.rs/): device-resident
//! array buffers, one compute pipeline per kernel, an on-device fill for
//! initialisation, and staged readback for result retrieval. Every kernel
//! dispatch is followed by a blocking queue poll so calls return only after
//! completion.
//!
//! f32 only: WGSL compute has no f64. Hosts needing f64 use the
//! host-parallel provider, which this crate's [`create_stream`] selects
//! automatically for `ExecutionTarget::Host`.

pub mod error;
pub mod shaders;
pub mod stream;

pub use error::WgpuStreamError;
pub use stream::WgpuStream;

use rustream_common::{ExecutionTarget, Result, StreamConfig};
use rustream_kernels::StreamProvider;

/// Construct a stream provider for the configured execution target.
///
/// `Host` targets delegate to the host-parallel provider; `Accelerator`
/// targets build a [`WgpuStream`] on the adapter at the configured index.
pub fn create_stream(config: &StreamConfig) -> Result<Box<dyn StreamProvider<f32>>> {
    match config.target {
        ExecutionTarget::Host => rustream_kernels::create_stream(config),
        ExecutionTarget::Accelerator(_) => Ok(Box::new(WgpuStream::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_target_resolves_to_host_provider() {
        let config = StreamConfig::new(32, ExecutionTarget::Host);
        let stream = create_stream(&config).unwrap();
        assert_eq!(stream.name(), "host");
    }

    #[test]
    fn out_of_range_adapter_index_errors() {
        let config = StreamConfig::new(32, ExecutionTarget::Accelerator(usize::MAX));
        assert!(create_stream(&config).is_err());
    }
}
