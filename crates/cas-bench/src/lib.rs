//! Benchmark harness for [`cas_store::ObjectStore`] backends.
//!
//! The harness measures four operations per payload size (Put, Get,
//! Exists and a multi-threaded Put) and reports the median, the 99th
//! percentile and throughput for each.
//!
//! # Layers
//!
//! - [`measure`] / [`measure_concurrent`]: time one operation closure.
//! - [`run_backend`]: the size × operation matrix for a single store.
//! - [`BenchSuite`]: opens every configured backend in turn and produces
//!   one [`RunResult`].
//! - [`BenchHistory`]: in-process record of completed runs.
//!
//! # Failure Model
//!
//! A failing call aborts the phase it happens in and, with it, the rest of
//! that backend's matrix. The backend's result then carries only the error
//! string. Other backends in the same run are unaffected.

pub mod error;
pub mod history;
pub mod matrix;
pub mod measure;
pub mod report;
pub mod stats;
pub mod suite;

pub use error::{BenchError, BenchResult, Phase};
pub use history::BenchHistory;
pub use matrix::{run_backend, run_backend_with, BenchConfig, PayloadSize, ITERATIONS};
pub use measure::{measure, measure_concurrent, measure_concurrent_with};
pub use report::{BackendResult, RunResult, SizeResult};
pub use stats::{percentile_stats, OperationResult};
pub use suite::BenchSuite;
