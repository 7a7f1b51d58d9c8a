//! Benchmark configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default array length per buffer (2^25 elements, the reference default).
pub const DEFAULT_ARRAY_SIZE: usize = 33_554_432;

/// Default kernel scalar used by mul, triad, and nstream.
pub const DEFAULT_SCALAR: f64 = 0.4;

/// Where the arrays live and the kernels run.
///
/// Chosen once at construction and immutable for the provider's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionTarget {
    /// Multi-core host execution over host-resident arrays.
    Host,
    /// Accelerator execution; the index selects an enumerated adapter.
    Accelerator(usize),
}

impl Default for ExecutionTarget {
    fn default() -> Self {
        Self::Host
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Accelerator(idx) => write!(f, "accelerator:{idx}"),
        }
    }
}

/// Stream benchmark configuration.
///
/// The harness owns size and target selection; this struct only carries the
/// chosen values into construction. The scalar is stored as `f64` and
/// narrowed to the element type by each provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Length of each of the three arrays, in elements.
    pub array_size: usize,
    /// Execution target the arrays are resident on.
    pub target: ExecutionTarget,
    /// Constant used by the mul, triad, and nstream kernels.
    pub scalar: f64,
}

impl StreamConfig {
    /// Configuration for `array_size` elements on the given target, with the
    /// reference scalar.
    pub fn new(array_size: usize, target: ExecutionTarget) -> Self {
        Self { array_size, target, scalar: DEFAULT_SCALAR }
    }

    /// Total bytes held by the three arrays for an element of `elem_size` bytes.
    pub fn footprint_bytes(&self, elem_size: usize) -> usize {
        3 * self.array_size * elem_size
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            array_size: DEFAULT_ARRAY_SIZE,
            target: ExecutionTarget::Host,
            scalar: DEFAULT_SCALAR,
        }
    }
}
