//! Propositional literals used by the search.

use std::ops::Not;

/// A literal over an internal propositional variable: `var * 2 + negated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Lit(u32);

impl Lit {
    pub(crate) fn new(var: usize, negated: bool) -> Self {
        Lit((var as u32) << 1 | negated as u32)
    }

    pub(crate) fn positive(var: usize) -> Self {
        Self::new(var, false)
    }

    pub(crate) fn negative(var: usize) -> Self {
        Self::new(var, true)
    }

    pub(crate) fn var(self) -> usize {
        (self.0 >> 1) as usize
    }

    pub(crate) fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    /// Index into per-literal tables such as watch lists.
    pub(crate) fn code(self) -> usize {
        self.0 as usize
    }

    /// Truth value of the literal under a variable assignment.
    pub(crate) fn value(self, assigns: &[Option<bool>]) -> Option<bool> {
        assigns[self.var()].map(|v| v != self.is_negated())
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}
