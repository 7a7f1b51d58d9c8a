//! Error types for the rustream workspace.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Top-level error type for stream construction and kernel execution.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Host memory allocation failed.
    #[error("allocation of {bytes} bytes (alignment {alignment}) failed")]
    Allocation {
        /// Requested allocation size in bytes.
        bytes: usize,
        /// Requested alignment in bytes.
        alignment: usize,
    },

    /// Execution-target setup failed (missing adapter, device request, ...).
    #[error("device setup failed: {reason}")]
    Device {
        /// Human-readable description of the setup failure.
        reason: String,
    },

    /// A kernel-level error.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Errors raised by kernel invocations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// An output slice handed to readback does not match the array size.
    #[error("output slice length {got} does not match array size {expected}")]
    ShapeMismatch {
        /// The provider's configured array size.
        expected: usize,
        /// The caller-supplied slice length.
        got: usize,
    },

    /// No provider is available for the requested execution target.
    #[error("no stream provider available for the requested target: {reason}")]
    NoProvider {
        /// Why no provider could be constructed.
        reason: String,
    },

    /// Kernel execution failed on the device.
    #[error("kernel execution failed: {reason}")]
    ExecutionFailed {
        /// Backend-specific failure description.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_error_display() {
        let err = StreamError::Allocation { bytes: 1024, alignment: 2 * 1024 * 1024 };
        let msg = err.to_string();
        assert!(msg.contains("1024"));
        assert!(msg.contains("2097152"));
    }

    #[test]
    fn kernel_error_converts_to_stream_error() {
        let err: StreamError = KernelError::ShapeMismatch { expected: 8, got: 4 }.into();
        assert!(matches!(err, StreamError::Kernel(KernelError::ShapeMismatch { .. })));
    }

    #[test]
    fn shape_mismatch_display_names_both_lengths() {
        let err = KernelError::ShapeMismatch { expected: 100, got: 99 };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("99"));
    }
}
