//! # seqarrange
//!
//! Sequential spatio-temporal arrangement: rigid 2D objects are translated onto a
//! square plate and given processing start times so that
//!
//! - footprints never overlap,
//! - no two objects are processed at the same time (unless disabled),
//! - the head's clearance zones never reach an object that is already finished,
//!
//! while the plate side is kept as small as possible.
//!
//! This crate re-exports the workspace members:
//!
//! - [`core`]: configuration, results, status, budgets and exact-arithmetic helpers
//! - [`smt`]: the incremental linear real arithmetic solver session
//! - [`d2`] (feature `d2`, on by default): geometry, encoding, refinement, size
//!   search, batch scheduling and the [`d2::Arranger2D`] entry point
//!
//! ```rust
//! use seqarrange::core::{Arranger, SolverConfiguration};
//! use seqarrange::d2::{ArrangementObject, Arranger2D};
//!
//! let objects = vec![
//!     ArrangementObject::rectangle("a", 10.0, 10.0),
//!     ArrangementObject::diamond("b", 10.0, 10.0).with_duration(2.0),
//! ];
//! let result = Arranger2D::new(SolverConfiguration::new().with_plate_range(10.0, 40.0))
//!     .arrange(&objects)
//!     .unwrap();
//! assert!(result.all_placed());
//! ```

pub use seqarrange_core as core;
pub use seqarrange_smt as smt;

#[cfg(feature = "d2")]
pub use seqarrange_d2 as d2;
