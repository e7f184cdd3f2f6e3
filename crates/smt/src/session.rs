//! The incremental solver session interface.

use crate::error::SessionError;
use crate::formula::Formula;
use crate::linear::{BoolVar, RealVar};
use num_rational::BigRational;
use seqarrange_core::{Budget, IndeterminateReason};
use std::fmt;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A model is available through `real_value` / `bool_value`.
    Sat,
    /// The assertions (with the given assumptions) have no model.
    Unsat,
    /// The check stopped before reaching a verdict.
    Unknown(IndeterminateReason),
}

impl CheckOutcome {
    /// Returns true for `Sat`.
    pub fn is_sat(&self) -> bool {
        matches!(self, CheckOutcome::Sat)
    }

    /// Returns true for `Unsat`.
    pub fn is_unsat(&self) -> bool {
        matches!(self, CheckOutcome::Unsat)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Sat => write!(f, "sat"),
            CheckOutcome::Unsat => write!(f, "unsat"),
            CheckOutcome::Unknown(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

/// Counters kept by a session over its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub checks: u64,
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub theory_conflicts: u64,
    pub pivots: u64,
    pub learned: u64,
}

/// An incremental SMT session over linear real arithmetic.
///
/// Assertions are scoped: `push` opens a scope and `pop` discards every assertion
/// made since the matching `push`. Variables and the atoms built from them are not
/// scoped and stay valid for the life of the session.
pub trait SolverSession {
    /// Declares a fresh real variable.
    fn declare_real(&mut self, name: &str) -> RealVar;

    /// Declares a fresh Boolean variable.
    fn declare_bool(&mut self, name: &str) -> BoolVar;

    /// Asserts a formula in the current scope.
    fn assert(&mut self, formula: &Formula) -> Result<(), SessionError>;

    /// Opens a scope.
    fn push(&mut self);

    /// Closes `n` scopes.
    fn pop(&mut self, n: usize) -> Result<(), SessionError>;

    /// Number of open scopes.
    fn depth(&self) -> usize;

    /// Checks the current assertions, with each assumption forced true for this
    /// call only.
    fn check(&mut self, assumptions: &[BoolVar], budget: &Budget) -> CheckOutcome;

    /// Value of a real variable in the last `Sat` model.
    fn real_value(&self, v: RealVar) -> Option<BigRational>;

    /// Value of a Boolean variable in the last `Sat` model.
    fn bool_value(&self, v: BoolVar) -> Option<bool>;

    /// Lifetime counters.
    fn stats(&self) -> SessionStats;
}
