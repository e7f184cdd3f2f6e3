//! Arrangement status reporting.
//!
//! Each arrangement attempt ends in one of three states:
//!
//! - `Valid(size)`: a geometrically validated arrangement exists on a plate of `size`
//! - `Infeasible`: the solver proved that no arrangement exists in the size range
//! - `Indeterminate(reason)`: the run stopped without a proof either way
//!
//! Inconclusive solver answers are never folded into `Valid` or `Infeasible`.

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why an attempt ended without a definite answer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndeterminateReason {
    /// The decision procedure returned `unknown`.
    SolverUnknown(String),
    /// A refinement, conflict, pivot or wall-clock budget ran out.
    BudgetExceeded,
    /// The caller cancelled the run.
    Cancelled,
}

impl std::fmt::Display for IndeterminateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SolverUnknown(msg) => write!(f, "SolverUnknown({})", msg),
            Self::BudgetExceeded => write!(f, "BudgetExceeded"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl From<IndeterminateReason> for Error {
    fn from(reason: IndeterminateReason) -> Self {
        match reason {
            IndeterminateReason::SolverUnknown(msg) => Error::SolverUnknown(msg),
            IndeterminateReason::BudgetExceeded => {
                Error::BudgetExceeded("refinement or search budget exhausted".to_string())
            }
            IndeterminateReason::Cancelled => Error::Cancelled,
        }
    }
}

/// Outcome of an arrangement attempt.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArrangementStatus {
    /// Validated arrangement on a square plate of the given side length.
    Valid(f64),
    /// Proven infeasible over the searched size range.
    Infeasible,
    /// Stopped without a proof.
    Indeterminate(IndeterminateReason),
    /// Nothing has been attempted yet.
    #[default]
    Pending,
}

impl ArrangementStatus {
    /// Returns true for `Valid`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns true for `Infeasible`.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }

    /// Returns true for `Indeterminate`.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate(_))
    }

    /// Returns the validated plate size, if any.
    pub fn size(&self) -> Option<f64> {
        match self {
            Self::Valid(size) => Some(*size),
            _ => None,
        }
    }

    /// Returns the indeterminate reason, if any.
    pub fn reason(&self) -> Option<&IndeterminateReason> {
        match self {
            Self::Indeterminate(reason) => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArrangementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid(size) => write!(f, "Valid({})", size),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Indeterminate(reason) => write!(f, "Indeterminate({})", reason),
            Self::Pending => write!(f, "Pending"),
        }
    }
}
