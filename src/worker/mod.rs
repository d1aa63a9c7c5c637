//! Worker pool for parallel vanity address search.
//!
//! This module provides:
//! - Multi-threaded CPU workers
//! - A dispatcher owning the bounded result channel
//! - Shared attempt counters for progress reporting

mod cpu;
mod pool;

pub use cpu::{CpuWorker, WorkerError, WorkerReport, WorkerStats, DEFAULT_REPORT_EVERY};
pub use pool::{Dispatcher, PoolConfig, PoolError, PoolReport, VanityResult};
