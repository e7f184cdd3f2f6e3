//! # seqarrange core
//!
//! Shared types for the sequential spatio-temporal arrangement engine.
//!
//! The engine places rigid 2D objects on a square plate and assigns each one a
//! processing start time, so that footprints never overlap, processing windows are
//! exclusive, and a moving head never collides with objects completed earlier.
//!
//! ## Core Components
//!
//! - **Configuration**: [`SolverConfiguration`] with builder-style setters
//! - **Arranger trait**: [`Arranger`], implemented by the 2D engine
//! - **Results**: [`ArrangementResult`], [`Placement`], per-batch [`Solution`]
//! - **Status**: [`ArrangementStatus`] (`Valid(size)`, `Infeasible`, `Indeterminate`)
//! - **Budgets**: [`Budget`] and [`CancelToken`] for cooperative cancellation
//! - **Exact arithmetic**: [`rational`] helpers around `BigRational`
//!
//! ## Configuration
//!
//! ```rust
//! use seqarrange_core::{SearchPolicy, SolverConfiguration};
//!
//! let config = SolverConfiguration::new()
//!     .with_plate_range(10.0, 200.0)
//!     .with_size_step(10.0)
//!     .with_batch_size(4)
//!     .with_search_policy(SearchPolicy::Descending)
//!     .with_time_limit(30_000);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod budget;
pub mod error;
pub mod rational;
pub mod result;
pub mod robust;
pub mod solver;
pub mod status;

// Re-exports
pub use budget::{Budget, CancelToken};
pub use error::{Error, Result};
pub use rational::BigRational;
pub use result::{ArrangementResult, ArrangementStats, ArrangementSummary, Placement, Solution};
pub use solver::{Arranger, ProgressCallback, ProgressInfo, SearchPolicy, SolverConfiguration};
pub use status::{ArrangementStatus, IndeterminateReason};
