//! Benchmark suite for the sequential arrangement engine.
//!
//! This crate provides:
//! - Seeded synthetic datasets (squares, convex, concave and gantry-zone sets)
//! - A runner that arranges each dataset per search policy and validates the result
//! - Result recording as JSON or CSV, with per-policy summaries

mod error;
mod result;
mod runner;
mod synthetic;

pub use error::{BenchError, Result};
pub use result::{BenchmarkMetadata, BenchmarkResult, PlacementInfo, PolicySummary, RunResult};
pub use runner::{BenchmarkConfig, BenchmarkRunner};
pub use synthetic::{Dataset, SyntheticDatasets, SyntheticGenerator};
