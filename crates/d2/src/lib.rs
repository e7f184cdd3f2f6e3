//! # seqarrange 2D
//!
//! Sequential spatio-temporal arrangement of 2D polygons.
//!
//! Objects are translated onto a square plate and given processing start times so
//! that footprints never overlap, processing windows are exclusive, and the head's
//! clearance zones never sweep over an object that is already finished. The plate
//! side is minimised by a size search.
//!
//! ## Pipeline
//!
//! - [`encoder`]: `(x, y, t)` variables per object; bounds, weak bounding-box
//!   non-overlap, ordering and clearance constraints
//! - [`refine`]: checks solver models against the exact polygons and adds one
//!   corrective separation lemma per overlapping pair
//! - [`search`]: plate sizes tried under guard assumptions (descending, bisection
//!   or exhaustive)
//! - [`scheduler`]: bounded batches against already decided objects, with
//!   splitting of infeasible batches
//! - [`Arranger2D`]: validation, orchestration and result assembly
//!
//! Geometry is decided exactly over `BigRational` in [`polygon`].
//!
//! ## Quick Start
//!
//! ```rust
//! use seqarrange_core::{Arranger, SolverConfiguration};
//! use seqarrange_d2::{validate_arrangement, ArrangementObject, Arranger2D};
//!
//! let objects = vec![
//!     ArrangementObject::rectangle("plate", 30.0, 20.0).with_duration(4.0),
//!     ArrangementObject::l_shape("bracket", 20.0, 20.0, 8.0, 8.0),
//!     ArrangementObject::diamond("tab", 10.0, 10.0),
//! ];
//!
//! let config = SolverConfiguration::new()
//!     .with_plate_range(10.0, 100.0)
//!     .with_size_step(10.0);
//!
//! let result = Arranger2D::new(config).arrange(&objects).unwrap();
//! assert!(result.all_placed());
//! assert!(validate_arrangement(&objects, &result).unwrap().is_valid());
//!
//! for p in &result.placements {
//!     let (x, y) = p.position();
//!     println!("{} at ({:.1}, {:.1}) from t = {:.1}", p.id, x, y, p.start_time());
//! }
//! ```
//!
//! ## Clearance zones
//!
//! ```rust
//! use seqarrange_d2::ArrangementObject;
//!
//! // While this part is processed the gantry occupies the strip to its left.
//! let part = ArrangementObject::rectangle("part", 20.0, 10.0)
//!     .with_clearance_zone(vec![(-15.0, 0.0), (0.0, 0.0), (0.0, 10.0), (-15.0, 10.0)])
//!     .with_duration(3.0);
//! assert!(part.validate().is_ok());
//! ```

pub mod arranger;
pub mod encoder;
pub mod object;
pub mod polygon;
pub mod refine;
pub mod scheduler;
pub mod search;
pub mod validate;

// Re-exports
pub use arranger::Arranger2D;
pub use encoder::{Constraint, ConstraintKind, Encoder, FixedObject, Model, ObjectRef};
pub use object::{ArrangementObject, PreparedObject};
pub use polygon::{BoundingBox, ExactPolygon, SeparatingLine};
pub use refine::RefinementOutcome;
pub use scheduler::{ScheduleOutcome, Scheduler};
pub use search::{SearchOutcome, SizeSearch};
pub use validate::{validate_arrangement, validate_with_tolerance, ValidationReport, Violation};
pub use seqarrange_core::{
    Arranger, ArrangementResult, ArrangementStatus, Error, Placement, Result,
    SolverConfiguration,
};
