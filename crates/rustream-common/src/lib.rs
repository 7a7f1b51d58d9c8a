//! Common types, traits, and utilities for the rustream benchmark workspace.
//!
//! This crate provides the foundational pieces shared by every backend:
//! the error taxonomy, the numeric element trait the kernels are generic
//! over, and the benchmark configuration types.

pub mod config;
pub mod element;
pub mod error;

pub use config::{ExecutionTarget, StreamConfig, DEFAULT_ARRAY_SIZE, DEFAULT_SCALAR};
pub use element::StreamElement;
pub use error::{KernelError, Result, StreamError};

/// Byte alignment for host array allocations.
///
/// 2 MiB keeps the three arrays on distinct cache lines and TLB entries and
/// allows transparent-huge-page-backed allocations on Linux.
pub const ALIGNMENT: usize = 2 * 1024 * 1024;
