//! Resource budgets and cooperative cancellation.
//!
//! Every potentially long-running operation (a solver check, a refinement loop, a
//! plate-size search) receives a [`Budget`]. The budget bundles a wall-clock deadline,
//! per-check conflict and pivot caps, and a shared [`CancelToken`].

use crate::status::IndeterminateReason;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag.
///
/// Cloning the token shares the underlying flag, so a caller can keep one clone and
/// cancel a run that owns another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clears the flag so the owner can be reused for another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Limits applied to a solver check or a refinement loop.
///
/// Zero caps mean "unlimited", following the `time_limit_ms = 0` convention of
/// [`SolverConfiguration`](crate::solver::SolverConfiguration).
#[derive(Debug, Clone, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    max_conflicts: u64,
    max_pivots: u64,
    cancel: CancelToken,
}

impl Budget {
    /// A budget with no limits and a private cancellation token.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Sets an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline `ms` milliseconds from now (0 = no deadline).
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.deadline = if ms == 0 {
            None
        } else {
            Some(Instant::now() + Duration::from_millis(ms))
        };
        self
    }

    /// Caps the number of conflicts per check (0 = unlimited).
    pub fn with_max_conflicts(mut self, conflicts: u64) -> Self {
        self.max_conflicts = conflicts;
        self
    }

    /// Caps the number of simplex pivots per check (0 = unlimited).
    pub fn with_max_pivots(mut self, pivots: u64) -> Self {
        self.max_pivots = pivots;
        self
    }

    /// Shares the given cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the conflict cap (0 = unlimited).
    pub fn max_conflicts(&self) -> u64 {
        self.max_conflicts
    }

    /// Returns the pivot cap (0 = unlimited).
    pub fn max_pivots(&self) -> u64 {
        self.max_pivots
    }

    /// Returns the cancellation token.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns true if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns true if the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns the reason to stop, if the budget no longer allows progress.
    ///
    /// Cancellation takes precedence over an expired deadline.
    pub fn exhausted(&self) -> Option<IndeterminateReason> {
        if self.is_cancelled() {
            Some(IndeterminateReason::Cancelled)
        } else if self.is_expired() {
            Some(IndeterminateReason::BudgetExceeded)
        } else {
            None
        }
    }

    /// Returns true if `conflicts` reaches the conflict cap.
    pub fn conflicts_exhausted(&self, conflicts: u64) -> bool {
        self.max_conflicts > 0 && conflicts >= self.max_conflicts
    }

    /// Returns true if `pivots` reaches the pivot cap.
    pub fn pivots_exhausted(&self, pivots: u64) -> bool {
        self.max_pivots > 0 && pivots >= self.max_pivots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        clone.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_budget_unlimited() {
        let budget = Budget::unlimited();
        assert!(budget.exhausted().is_none());
        assert!(!budget.conflicts_exhausted(1_000_000));
        assert!(!budget.pivots_exhausted(1_000_000));
    }

    #[test]
    fn test_budget_caps() {
        let budget = Budget::unlimited()
            .with_max_conflicts(10)
            .with_max_pivots(5);
        assert!(!budget.conflicts_exhausted(9));
        assert!(budget.conflicts_exhausted(10));
        assert!(budget.pivots_exhausted(5));
    }

    #[test]
    fn test_budget_expired_deadline() {
        let budget = Budget::unlimited().with_deadline(Instant::now());
        assert_eq!(budget.exhausted(), Some(IndeterminateReason::BudgetExceeded));
    }

    #[test]
    fn test_cancel_precedes_deadline() {
        let token = CancelToken::new();
        let budget = Budget::unlimited()
            .with_deadline(Instant::now())
            .with_cancel(token.clone());
        token.cancel();
        assert_eq!(budget.exhausted(), Some(IndeterminateReason::Cancelled));
    }
}
