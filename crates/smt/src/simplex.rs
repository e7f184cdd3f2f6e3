//! Bounded simplex over exact rationals.
//!
//! Every linear atom `form REL bound` becomes a bound on a single variable: an
//! original variable when the form has one term, or a slack variable defined by a
//! tableau row `s = sum(a_j * x_j)`. Bounds go on a trail and are undone by
//! checkpoint, so the search can backtrack the theory state together with its own
//! decision levels.
//!
//! Nonbasic variables always lie within their bounds. [`Simplex::check`] repairs
//! basic variables with Bland's rule and reports an infeasible row as the set of
//! bound reasons that make it infeasible.

use crate::literal::Lit;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rustc_hash::{FxHashMap, FxHashSet};

/// Tableau variable index.
pub(crate) type TVar = usize;

/// Which side(s) of a variable an atom bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BoundKind {
    Upper,
    Lower,
    Both,
}

#[derive(Debug, Clone)]
struct Bound {
    value: BigRational,
    reason: Lit,
}

#[derive(Debug)]
struct BoundChange {
    var: TVar,
    upper: bool,
    previous: Option<Bound>,
}

#[derive(Debug)]
struct Row {
    basic: TVar,
    coeffs: FxHashMap<TVar, BigRational>,
}

/// Result of [`Simplex::check`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SimplexOutcome {
    Feasible,
    /// Literals whose bounds jointly admit no solution.
    Conflict(Vec<Lit>),
    /// The pivot cap was reached.
    Exhausted,
}

#[derive(Debug, Default)]
pub(crate) struct Simplex {
    values: Vec<BigRational>,
    lower: Vec<Option<Bound>>,
    upper: Vec<Option<Bound>>,
    basic_row: Vec<Option<usize>>,
    rows: Vec<Row>,
    /// Rows in which each nonbasic variable occurs.
    cols: Vec<FxHashSet<usize>>,
    trail: Vec<BoundChange>,
    marks: Vec<usize>,
    pivots: u64,
}

fn add_coeff(coeffs: &mut FxHashMap<TVar, BigRational>, var: TVar, delta: BigRational) {
    let entry = coeffs.entry(var).or_insert_with(BigRational::zero);
    *entry += delta;
    if entry.is_zero() {
        coeffs.remove(&var);
    }
}

impl Simplex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Total pivots performed.
    pub(crate) fn pivots(&self) -> u64 {
        self.pivots
    }

    pub(crate) fn value(&self, x: TVar) -> &BigRational {
        &self.values[x]
    }

    /// Adds an unbounded nonbasic variable with value zero.
    pub(crate) fn new_var(&mut self) -> TVar {
        self.values.push(BigRational::zero());
        self.lower.push(None);
        self.upper.push(None);
        self.basic_row.push(None);
        self.cols.push(FxHashSet::default());
        self.values.len() - 1
    }

    /// Adds a slack variable `s = sum(coeff * x)` and returns it.
    pub(crate) fn add_row(&mut self, form: &[(TVar, BigRational)]) -> TVar {
        let slack = self.new_var();
        let mut coeffs: FxHashMap<TVar, BigRational> = FxHashMap::default();
        for (x, c) in form {
            match self.basic_row[*x] {
                Some(r) => {
                    for (y, d) in &self.rows[r].coeffs {
                        add_coeff(&mut coeffs, *y, c * d);
                    }
                }
                None => add_coeff(&mut coeffs, *x, c.clone()),
            }
        }

        let mut value = BigRational::zero();
        for (y, d) in &coeffs {
            value += d * &self.values[*y];
        }

        let row = self.rows.len();
        for y in coeffs.keys() {
            self.cols[*y].insert(row);
        }
        self.rows.push(Row {
            basic: slack,
            coeffs,
        });
        self.basic_row[slack] = Some(row);
        self.values[slack] = value;
        slack
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    /// Tightens the bound(s) of `x` according to `kind`.
    ///
    /// Returns the conflicting reasons if the new bound crosses the opposite one.
    pub(crate) fn assert_bound(
        &mut self,
        x: TVar,
        kind: BoundKind,
        value: &BigRational,
        reason: Lit,
    ) -> Result<(), Vec<Lit>> {
        match kind {
            BoundKind::Upper => self.assert_upper(x, value, reason),
            BoundKind::Lower => self.assert_lower(x, value, reason),
            BoundKind::Both => {
                self.assert_upper(x, value, reason)?;
                self.assert_lower(x, value, reason)
            }
        }
    }

    fn assert_upper(&mut self, x: TVar, value: &BigRational, reason: Lit) -> Result<(), Vec<Lit>> {
        if let Some(l) = &self.lower[x] {
            if *value < l.value {
                return Err(vec![reason, l.reason]);
            }
        }
        if let Some(u) = &self.upper[x] {
            if u.value <= *value {
                return Ok(());
            }
        }
        let previous = self.upper[x].replace(Bound {
            value: value.clone(),
            reason,
        });
        self.trail.push(BoundChange {
            var: x,
            upper: true,
            previous,
        });
        if self.basic_row[x].is_none() && self.values[x] > *value {
            self.update(x, value.clone());
        }
        Ok(())
    }

    fn assert_lower(&mut self, x: TVar, value: &BigRational, reason: Lit) -> Result<(), Vec<Lit>> {
        if let Some(u) = &self.upper[x] {
            if *value > u.value {
                return Err(vec![reason, u.reason]);
            }
        }
        if let Some(l) = &self.lower[x] {
            if l.value >= *value {
                return Ok(());
            }
        }
        let previous = self.lower[x].replace(Bound {
            value: value.clone(),
            reason,
        });
        self.trail.push(BoundChange {
            var: x,
            upper: false,
            previous,
        });
        if self.basic_row[x].is_none() && self.values[x] < *value {
            self.update(x, value.clone());
        }
        Ok(())
    }

    /// How far the current value of `x` is from satisfying the atom (zero if it does).
    pub(crate) fn violation(&self, x: TVar, kind: BoundKind, value: &BigRational) -> BigRational {
        let current = &self.values[x];
        let gap = current - value;
        match kind {
            BoundKind::Upper if gap.is_positive() => gap,
            BoundKind::Lower if gap.is_negative() => -gap,
            BoundKind::Both => gap.abs(),
            _ => BigRational::zero(),
        }
    }

    /// Opens a checkpoint.
    pub(crate) fn push_level(&mut self) {
        self.marks.push(self.trail.len());
    }

    /// Undoes every bound asserted after checkpoint `level`.
    pub(crate) fn backtrack(&mut self, level: usize) {
        if self.marks.len() > level {
            let mark = self.marks[level];
            self.marks.truncate(level);
            self.undo_to(mark);
        }
    }

    /// Removes every bound.
    pub(crate) fn reset(&mut self) {
        self.marks.clear();
        self.undo_to(0);
    }

    fn undo_to(&mut self, len: usize) {
        while self.trail.len() > len {
            if let Some(change) = self.trail.pop() {
                if change.upper {
                    self.upper[change.var] = change.previous;
                } else {
                    self.lower[change.var] = change.previous;
                }
            }
        }
    }

    // ========================================================================
    // Feasibility
    // ========================================================================

    fn below_lower(&self, x: TVar) -> bool {
        self.lower[x]
            .as_ref()
            .is_some_and(|l| self.values[x] < l.value)
    }

    fn above_upper(&self, x: TVar) -> bool {
        self.upper[x]
            .as_ref()
            .is_some_and(|u| self.values[x] > u.value)
    }

    fn can_increase(&self, x: TVar) -> bool {
        self.upper[x]
            .as_ref()
            .map_or(true, |u| self.values[x] < u.value)
    }

    fn can_decrease(&self, x: TVar) -> bool {
        self.lower[x]
            .as_ref()
            .map_or(true, |l| self.values[x] > l.value)
    }

    /// Repairs the assignment until every bound holds or a row is infeasible.
    ///
    /// `max_pivots` caps the pivots of this call (0 = unlimited).
    pub(crate) fn check(&mut self, max_pivots: u64) -> SimplexOutcome {
        let start = self.pivots;
        loop {
            if max_pivots > 0 && self.pivots - start >= max_pivots {
                return SimplexOutcome::Exhausted;
            }

            let violated = self
                .rows
                .iter()
                .enumerate()
                .filter_map(|(r, row)| {
                    let b = row.basic;
                    if self.below_lower(b) {
                        Some((b, r, true))
                    } else if self.above_upper(b) {
                        Some((b, r, false))
                    } else {
                        None
                    }
                })
                .min_by_key(|(b, _, _)| *b);

            let Some((basic, row, below)) = violated else {
                return SimplexOutcome::Feasible;
            };

            let mut entering: Option<TVar> = None;
            for (j, a) in &self.rows[row].coeffs {
                let movable = if below == a.is_positive() {
                    self.can_increase(*j)
                } else {
                    self.can_decrease(*j)
                };
                if movable && entering.map_or(true, |e| *j < e) {
                    entering = Some(*j);
                }
            }

            let target = if below {
                self.lower[basic].as_ref().map(|b| b.value.clone())
            } else {
                self.upper[basic].as_ref().map(|b| b.value.clone())
            };

            match (entering, target) {
                (Some(e), Some(target)) => self.pivot_and_update(row, e, target),
                _ => return SimplexOutcome::Conflict(self.explain(row, basic, below)),
            }
        }
    }

    /// Reasons of the bounds that pin row `row` away from feasibility.
    fn explain(&self, row: usize, basic: TVar, below: bool) -> Vec<Lit> {
        let mut reasons = Vec::new();
        let own = if below {
            &self.lower[basic]
        } else {
            &self.upper[basic]
        };
        if let Some(b) = own {
            reasons.push(b.reason);
        }
        for (j, a) in &self.rows[row].coeffs {
            let bound = if below == a.is_positive() {
                &self.upper[*j]
            } else {
                &self.lower[*j]
            };
            if let Some(b) = bound {
                reasons.push(b.reason);
            }
        }
        reasons.sort();
        reasons.dedup();
        reasons
    }

    /// Sets nonbasic `x` to `v` and shifts the basic variables that depend on it.
    fn update(&mut self, x: TVar, v: BigRational) {
        let delta = &v - &self.values[x];
        for &r in &self.cols[x] {
            let b = self.rows[r].basic;
            if let Some(c) = self.rows[r].coeffs.get(&x) {
                self.values[b] += c * &delta;
            }
        }
        self.values[x] = v;
    }

    /// Moves basic variable of `row` to `v` by adjusting `entering`, then swaps them.
    fn pivot_and_update(&mut self, row: usize, entering: TVar, v: BigRational) {
        let basic = self.rows[row].basic;
        let Some(a) = self.rows[row].coeffs.get(&entering).cloned() else {
            return;
        };
        let theta = (&v - &self.values[basic]) / &a;
        self.values[basic] = v;
        self.values[entering] += &theta;
        for &r in &self.cols[entering] {
            if r == row {
                continue;
            }
            let b = self.rows[r].basic;
            if let Some(c) = self.rows[r].coeffs.get(&entering) {
                self.values[b] += c * &theta;
            }
        }
        self.pivot(row, entering);
        self.pivots += 1;
    }

    fn pivot(&mut self, row: usize, entering: TVar) {
        let leaving = self.rows[row].basic;
        let mut coeffs = std::mem::take(&mut self.rows[row].coeffs);
        let Some(a) = coeffs.remove(&entering) else {
            self.rows[row].coeffs = coeffs;
            return;
        };
        let inv = a.recip();

        // entering = inv * leaving - sum(inv * c_j * x_j)
        let mut solved: FxHashMap<TVar, BigRational> = FxHashMap::default();
        for (j, c) in coeffs {
            solved.insert(j, -(c * &inv));
        }
        solved.insert(leaving, inv);

        self.cols[entering].remove(&row);
        self.cols[leaving].insert(row);
        self.basic_row[leaving] = None;
        self.basic_row[entering] = Some(row);

        let others: Vec<usize> = self.cols[entering].iter().copied().collect();
        for r in others {
            let Some(c) = self.rows[r].coeffs.remove(&entering) else {
                continue;
            };
            for (k, v) in &solved {
                let vanished = {
                    let entry = self.rows[r]
                        .coeffs
                        .entry(*k)
                        .or_insert_with(BigRational::zero);
                    *entry += &c * v;
                    entry.is_zero()
                };
                if vanished {
                    self.rows[r].coeffs.remove(k);
                    self.cols[*k].remove(&r);
                } else {
                    self.cols[*k].insert(r);
                }
            }
        }
        self.cols[entering].clear();

        self.rows[row] = Row {
            basic: entering,
            coeffs: solved,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn lit(v: usize) -> Lit {
        Lit::positive(v)
    }

    fn sum_row(s: &mut Simplex, vars: &[TVar]) -> TVar {
        let form: Vec<_> = vars.iter().map(|&v| (v, q(1))).collect();
        s.add_row(&form)
    }

    #[test]
    fn test_feasible_bounds() {
        let mut s = Simplex::new();
        let x = s.new_var();
        let y = s.new_var();
        let sum = sum_row(&mut s, &[x, y]);

        assert!(s.assert_bound(x, BoundKind::Lower, &q(2), lit(0)).is_ok());
        assert!(s.assert_bound(sum, BoundKind::Upper, &q(5), lit(1)).is_ok());
        assert_eq!(s.check(0), SimplexOutcome::Feasible);

        let xv = s.value(x).clone();
        let yv = s.value(y).clone();
        assert!(xv >= q(2));
        assert!(&xv + &yv <= q(5));
    }

    #[test]
    fn test_row_conflict_explanation() {
        let mut s = Simplex::new();
        let x = s.new_var();
        let y = s.new_var();
        let sum = sum_row(&mut s, &[x, y]);

        s.push_level();
        assert!(s.assert_bound(x, BoundKind::Lower, &q(2), lit(0)).is_ok());
        assert!(s.assert_bound(y, BoundKind::Lower, &q(3), lit(1)).is_ok());
        assert!(s.assert_bound(sum, BoundKind::Upper, &q(4), lit(2)).is_ok());

        match s.check(0) {
            SimplexOutcome::Conflict(reasons) => {
                assert_eq!(reasons, vec![lit(0), lit(1), lit(2)]);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_bound_conflict() {
        let mut s = Simplex::new();
        let x = s.new_var();
        assert!(s.assert_bound(x, BoundKind::Upper, &q(1), lit(0)).is_ok());
        let err = s.assert_bound(x, BoundKind::Lower, &q(2), lit(1));
        assert_eq!(err, Err(vec![lit(1), lit(0)]));
    }

    #[test]
    fn test_backtrack_restores_bounds() {
        let mut s = Simplex::new();
        let x = s.new_var();
        let y = s.new_var();
        let diff = s.add_row(&[(x, q(1)), (y, q(-1))]);

        assert!(s.assert_bound(x, BoundKind::Lower, &q(0), lit(0)).is_ok());
        s.push_level();
        assert!(s.assert_bound(diff, BoundKind::Lower, &q(10), lit(1)).is_ok());
        assert!(s.assert_bound(x, BoundKind::Upper, &q(3), lit(2)).is_ok());
        assert!(s.assert_bound(y, BoundKind::Lower, &q(0), lit(3)).is_ok());
        assert!(matches!(s.check(0), SimplexOutcome::Conflict(_)));

        s.backtrack(0);
        assert_eq!(s.check(0), SimplexOutcome::Feasible);
        assert!(*s.value(x) >= q(0));
    }

    #[test]
    fn test_equality_bound() {
        let mut s = Simplex::new();
        let x = s.new_var();
        let y = s.new_var();
        let two_x_plus_y = s.add_row(&[(x, q(2)), (y, q(1))]);
        assert!(s.assert_bound(two_x_plus_y, BoundKind::Both, &q(7), lit(0)).is_ok());
        assert!(s.assert_bound(y, BoundKind::Both, &q(1), lit(1)).is_ok());
        assert_eq!(s.check(0), SimplexOutcome::Feasible);
        assert_eq!(*s.value(x), q(3));
        assert_eq!(s.violation(y, BoundKind::Both, &q(1)), q(0));
        assert_eq!(s.violation(y, BoundKind::Upper, &q(0)), q(1));
    }

    #[test]
    fn test_rows_over_basic_variables() {
        let mut s = Simplex::new();
        let x = s.new_var();
        let y = s.new_var();
        let a = sum_row(&mut s, &[x, y]);
        // Force a pivot so that `a` becomes nonbasic, then build a row over it.
        assert!(s.assert_bound(a, BoundKind::Lower, &q(4), lit(0)).is_ok());
        assert_eq!(s.check(0), SimplexOutcome::Feasible);
        let b = s.add_row(&[(a, q(1)), (x, q(-1))]);
        assert!(s.assert_bound(b, BoundKind::Upper, &q(1), lit(1)).is_ok());
        assert_eq!(s.check(0), SimplexOutcome::Feasible);
        assert!(*s.value(y) <= q(1));
        assert!(s.value(x) + s.value(y) >= q(4));
        assert_eq!(s.num_rows(), 2);
    }
}
