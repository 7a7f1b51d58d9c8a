//! Core kernels and providers for the rustream memory-bandwidth benchmark.
//!
//! The benchmark runs six elementwise kernels (copy, mul, add, triad,
//! nstream, dot) over three equal-length arrays `A`, `B`, `C`. This crate
//! defines the [`StreamProvider`] contract every execution target implements,
//! the host-parallel implementation backed by rayon and 2 MiB-aligned
//! buffers, and an observation decorator for per-kernel traffic accounting.
//!
//! Accelerator execution lives in `rustream-wgpu`, which implements the same
//! trait; construction through [`create_stream`] covers the host target and
//! reports a typed error when asked for an accelerator this crate cannot
//! provide.

pub mod alloc;
pub mod host;
pub mod observe;

pub use alloc::AlignedBuffer;
pub use host::HostStream;
pub use observe::{InstrumentedStream, KernelOp, KernelTiming, ObservationLog};

use rustream_common::{KernelError, Result, StreamConfig, StreamElement};

/// Contract shared by every execution target.
///
/// A provider owns the three arrays for its lifetime. Every kernel call is
/// data-parallel over the configured array size with a single join at kernel
/// exit: when a call returns, all of its writes are visible to a subsequent
/// read, so an external harness can time the call with plain wall-clock
/// instants. At most one kernel may be in flight per provider.
pub trait StreamProvider<T: StreamElement>: Send {
    /// Backend name for harness display.
    fn name(&self) -> &'static str;

    /// Configured length of each array, in elements.
    fn array_size(&self) -> usize;

    /// Fill `A`, `B`, `C` uniformly with the three given values.
    ///
    /// This is the only operation that defines the arrays' initial contents;
    /// kernels called before it observe unspecified (but zero-initialised,
    /// memory-safe) values.
    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<()>;

    /// Copy the current contents of `A`, `B`, `C` into the caller's slices.
    ///
    /// Each output slice must have length [`array_size`](Self::array_size);
    /// on an accelerator target this synchronises device memory back to the
    /// host first.
    fn read_arrays(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<()>;

    /// `C[i] = A[i]`
    fn copy(&mut self) -> Result<()>;

    /// `B[i] = scalar * C[i]`
    fn mul(&mut self) -> Result<()>;

    /// `C[i] = A[i] + B[i]`
    fn add(&mut self) -> Result<()>;

    /// `A[i] = B[i] + scalar * C[i]`
    fn triad(&mut self) -> Result<()>;

    /// `A[i] += B[i] + scalar * C[i]`
    fn nstream(&mut self) -> Result<()>;

    /// Parallel sum reduction of `A[i] * B[i]`.
    ///
    /// The summation order is unspecified and need not be bit-reproducible
    /// across runs. Returns the additive identity for an empty array.
    fn dot(&mut self) -> Result<T>;
}

/// Construct a stream provider for the configured execution target.
///
/// This crate provides the host backend; accelerator targets are served by
/// the `rustream-wgpu` crate's `create_stream`, which delegates host targets
/// back here.
pub fn create_stream<T: StreamElement>(
    config: &StreamConfig,
) -> Result<Box<dyn StreamProvider<T>>> {
    match config.target {
        rustream_common::ExecutionTarget::Host => Ok(Box::new(HostStream::new(config)?)),
        rustream_common::ExecutionTarget::Accelerator(idx) => Err(KernelError::NoProvider {
            reason: format!("accelerator target {idx} requires the rustream-wgpu backend"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustream_common::ExecutionTarget;

    #[test]
    fn factory_builds_host_provider() {
        let config = StreamConfig::new(64, ExecutionTarget::Host);
        let stream = create_stream::<f32>(&config).unwrap();
        assert_eq!(stream.name(), "host");
        assert_eq!(stream.array_size(), 64);
    }

    #[test]
    fn factory_rejects_accelerator_targets() {
        let config = StreamConfig::new(64, ExecutionTarget::Accelerator(0));
        let err = create_stream::<f32>(&config).err().unwrap();
        assert!(err.to_string().contains("rustream-wgpu"));
    }
}
