//! Host-parallel stream provider.
//!
//! Arrays are host-resident [`AlignedBuffer`]s and every kernel is a rayon
//! parallel iterator over the element range. Rayon's implicit join at the
//! end of each `for_each`/`sum` is the single synchronisation point the
//! provider contract requires: when a kernel returns, all writes are
//! published.

use crate::alloc::AlignedBuffer;
use crate::StreamProvider;
use rayon::prelude::*;
use rustream_common::{KernelError, Result, StreamConfig, StreamElement};

/// Stream provider executing on the host CPU.
pub struct HostStream<T: StreamElement> {
    a: AlignedBuffer<T>,
    b: AlignedBuffer<T>,
    c: AlignedBuffer<T>,
    array_size: usize,
    scalar: T,
}

impl<T: StreamElement> HostStream<T> {
    /// Allocate the three arrays for the configured size.
    ///
    /// Buffers already allocated when a later allocation fails are released
    /// by their own `Drop`.
    pub fn new(config: &StreamConfig) -> Result<Self> {
        let array_size = config.array_size;
        let a = AlignedBuffer::new(array_size)?;
        let b = AlignedBuffer::new(array_size)?;
        let c = AlignedBuffer::new(array_size)?;

        tracing::debug!(
            array_size,
            elem = T::NAME,
            footprint_mib = (3 * array_size * std::mem::size_of::<T>()) >> 20,
            "host stream arrays allocated"
        );

        Ok(Self { a, b, c, array_size, scalar: T::from_f64(config.scalar) })
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len == self.array_size {
            Ok(())
        } else {
            Err(KernelError::ShapeMismatch { expected: self.array_size, got: len }.into())
        }
    }
}

impl<T: StreamElement> StreamProvider<T> for HostStream<T> {
    fn name(&self) -> &'static str {
        "host"
    }

    fn array_size(&self) -> usize {
        self.array_size
    }

    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<()> {
        self.a.as_mut_slice().par_iter_mut().for_each(|x| *x = init_a);
        self.b.as_mut_slice().par_iter_mut().for_each(|x| *x = init_b);
        self.c.as_mut_slice().par_iter_mut().for_each(|x| *x = init_c);
        Ok(())
    }

    fn read_arrays(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<()> {
        self.check_len(a.len())?;
        self.check_len(b.len())?;
        self.check_len(c.len())?;

        a.par_iter_mut().zip(self.a.as_slice().par_iter()).for_each(|(out, &x)| *out = x);
        b.par_iter_mut().zip(self.b.as_slice().par_iter()).for_each(|(out, &x)| *out = x);
        c.par_iter_mut().zip(self.c.as_slice().par_iter()).for_each(|(out, &x)| *out = x);
        Ok(())
    }

    fn copy(&mut self) -> Result<()> {
        self.c
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.a.as_slice().par_iter())
            .for_each(|(c, &a)| *c = a);
        Ok(())
    }

    fn mul(&mut self) -> Result<()> {
        let scalar = self.scalar;
        self.b
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.c.as_slice().par_iter())
            .for_each(|(b, &c)| *b = scalar * c);
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        self.c
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.a.as_slice().par_iter().zip(self.b.as_slice().par_iter()))
            .for_each(|(c, (&a, &b))| *c = a + b);
        Ok(())
    }

    fn triad(&mut self) -> Result<()> {
        let scalar = self.scalar;
        self.a
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.b.as_slice().par_iter().zip(self.c.as_slice().par_iter()))
            .for_each(|(a, (&b, &c))| *a = b + scalar * c);
        Ok(())
    }

    fn nstream(&mut self) -> Result<()> {
        let scalar = self.scalar;
        self.a
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.b.as_slice().par_iter().zip(self.c.as_slice().par_iter()))
            .for_each(|(a, (&b, &c))| *a += b + scalar * c);
        Ok(())
    }

    fn dot(&mut self) -> Result<T> {
        let sum = self
            .a
            .as_slice()
            .par_iter()
            .zip(self.b.as_slice().par_iter())
            .map(|(&a, &b)| a * b)
            .sum();
        Ok(sum)
    }
}
