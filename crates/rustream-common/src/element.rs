//! Numeric element trait the stream kernels are generic over.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Element type of the benchmark arrays.
///
/// Implemented for `f32` and `f64`. The bounds are exactly what the six
/// kernels need: copy/add/triad/nstream use `Add`/`AddAssign`/`Mul`, the
/// dot reduction uses `Sum`, and parallel execution requires `Send + Sync`.
pub trait StreamElement:
    Copy
    + Send
    + Sync
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + AddAssign
    + Mul<Output = Self>
    + Sum<Self>
    + 'static
{
    /// Additive identity; the result of `dot` on an empty range.
    const ZERO: Self;

    /// Short type name for logs and harness display.
    const NAME: &'static str;

    /// Lossy conversion from the configuration scalar.
    fn from_f64(v: f64) -> Self;

    /// Widening conversion for reporting.
    fn to_f64(self) -> f64;
}

impl StreamElement for f32 {
    const ZERO: Self = 0.0;
    const NAME: &'static str = "f32";

    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl StreamElement for f64 {
    const ZERO: Self = 0.0;
    const NAME: &'static str = "f64";

    fn from_f64(v: f64) -> Self {
        v
    }

    fn to_f64(self) -> f64 {
        self
    }
}
