//! Error types for the arrangement engine.

use thiserror::Error;

/// Errors raised by the arrangement engine.
///
/// Input problems (`InvalidGeometry`, `InvalidConfig`) are returned directly from the
/// entry points. The remaining variants describe solver-level outcomes; the arranger
/// resolves them locally or reports them through
/// [`ArrangementStatus`](crate::status::ArrangementStatus), and
/// [`ArrangementResult::ensure_complete`](crate::result::ArrangementResult::ensure_complete)
/// turns them back into errors for callers that want a hard failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An object contour or clearance zone is not a usable simple polygon.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The solver configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two placed objects coincide exactly; no separating line exists.
    #[error("objects {first} and {second} coincide at the same position")]
    GeometryDegenerate {
        /// First object index (batch-local).
        first: usize,
        /// Second object index (batch-local).
        second: usize,
    },

    /// The decision procedure returned an inconclusive answer.
    #[error("solver returned unknown: {0}")]
    SolverUnknown(String),

    /// An iteration, conflict or wall-clock budget was exhausted.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// No plate size in the configured range admits a valid arrangement.
    #[error("no feasible plate size between {min} and {max}")]
    NoFeasibleSize {
        /// Smallest size tried.
        min: f64,
        /// Largest size tried.
        max: f64,
    },

    /// Only part of the objects could be placed.
    #[error("partial placement: {decided} decided, {remaining} remaining")]
    PartialPlacement {
        /// Number of decided objects.
        decided: usize,
        /// Number of objects left unplaced.
        remaining: usize,
    },

    /// The run was cancelled through its cancellation token.
    #[error("arrangement cancelled")]
    Cancelled,

    /// The solver session rejected an operation (e.g. unbalanced pop).
    #[error("solver session error: {0}")]
    Session(String),
}

/// Result type alias for arrangement operations.
pub type Result<T> = std::result::Result<T, Error>;
