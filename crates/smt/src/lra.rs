//! CDCL(T) session over linear real arithmetic.
//!
//! Formulas are clausified with one proxy variable per distinct normalized atom
//! and one auxiliary variable per conjunction nested in a disjunction. The search
//! is a conflict-driven clause-learning loop with two watched literals and
//! first-UIP learning. The theory is the exact [`Simplex`], kept in lockstep
//! with the decision levels: a true atom proxy asserts its bound, a false one
//! asserts nothing (atoms occur only positively in input formulas).
//!
//! Every `check` starts from an empty trail, so clauses added between checks need
//! no special handling. Theory lemmas are valid in every scope and are never
//! removed; learned clauses are tagged with the scope depth they were derived in
//! and dropped by `pop`.

use crate::error::SessionError;
use crate::formula::Formula;
use crate::linear::{BoolVar, LinearConstraint, RealVar, Relation};
use crate::literal::Lit;
use crate::session::{CheckOutcome, SessionStats, SolverSession};
use crate::simplex::{BoundKind, Simplex, SimplexOutcome, TVar};
use log::{debug, trace};
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rustc_hash::FxHashMap;
use seqarrange_core::{Budget, IndeterminateReason};

#[derive(Debug, Clone)]
struct Atom {
    tvar: TVar,
    kind: BoundKind,
    value: BigRational,
}

#[derive(Debug, Clone, Copy)]
enum VarKind {
    User,
    Atom(usize),
    Aux,
}

#[derive(Debug)]
struct Clause {
    lits: Vec<Lit>,
    scope: usize,
}

enum Conflict {
    Clause(usize),
    Theory(Vec<Lit>),
}

enum Decision {
    Branch(Lit),
    /// An assumption that already holds; opens an empty level.
    EmptyLevel,
    /// An assumption that is already false.
    Failed,
    /// A clause with every literal false.
    Falsified(usize),
    Complete,
}

enum Encoded {
    Const(bool),
    Lit(Lit),
}

/// Incremental LRA solver session.
///
/// # Example
///
/// ```rust
/// use seqarrange_core::Budget;
/// use seqarrange_smt::{Formula, LinearExpr, LraSession, SolverSession};
/// use num_rational::BigRational;
///
/// let mut session = LraSession::new();
/// let x = session.declare_real("x");
/// let ten = LinearExpr::constant(BigRational::from_integer(10.into()));
/// let zero = LinearExpr::zero();
///
/// session
///     .assert(&Formula::or([
///         LinearExpr::var(x).le(&zero).into(),
///         LinearExpr::var(x).ge(&ten).into(),
///     ]))
///     .unwrap();
/// session.assert(&LinearExpr::var(x).ge(&zero.shifted(&BigRational::from_integer(1.into()))).into()).unwrap();
///
/// assert!(session.check(&[], &Budget::unlimited()).is_sat());
/// assert!(session.real_value(x).unwrap() >= BigRational::from_integer(10.into()));
/// ```
#[derive(Debug, Default)]
pub struct LraSession {
    real_names: Vec<String>,
    real_tvars: Vec<TVar>,
    bool_names: Vec<String>,
    bool_vars: Vec<usize>,

    kinds: Vec<VarKind>,
    atoms: Vec<Atom>,
    atom_index: FxHashMap<(TVar, BoundKind, BigRational), usize>,
    slack_index: FxHashMap<Vec<(TVar, BigRational)>, TVar>,

    clauses: Vec<Clause>,
    units: Vec<(Lit, usize)>,
    falsified: Vec<usize>,
    depth: usize,

    watches: Vec<Vec<usize>>,
    assigns: Vec<Option<bool>>,
    levels: Vec<usize>,
    reasons: Vec<Option<usize>>,
    seen: Vec<bool>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,

    simplex: Simplex,
    model_valid: bool,
    stats: SessionStats,
}

impl LraSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self {
            simplex: Simplex::new(),
            ..Self::default()
        }
    }

    /// Name given to a real variable at declaration.
    pub fn real_name(&self, v: RealVar) -> Option<&str> {
        self.real_names.get(v.index()).map(String::as_str)
    }

    /// Name given to a Boolean variable at declaration.
    pub fn bool_name(&self, v: BoolVar) -> Option<&str> {
        self.bool_names.get(v.index()).map(String::as_str)
    }

    /// Number of distinct linear atoms registered so far.
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Number of clauses currently held (input, learned and lemmas).
    pub fn num_clauses(&self) -> usize {
        self.clauses.len() + self.units.len()
    }

    fn new_sat_var(&mut self, kind: VarKind) -> usize {
        let v = self.kinds.len();
        self.kinds.push(kind);
        self.assigns.push(None);
        self.levels.push(0);
        self.reasons.push(None);
        self.seen.push(false);
        self.watches.push(Vec::new());
        self.watches.push(Vec::new());
        v
    }

    fn user_var(&self, b: BoolVar) -> Result<usize, SessionError> {
        self.bool_vars
            .get(b.index())
            .copied()
            .ok_or_else(|| SessionError::UnknownVariable(format!("bool #{}", b.index())))
    }

    // ========================================================================
    // Clausification
    // ========================================================================

    /// Maps `expr REL 0` to the proxy literal of its normalized bound.
    ///
    /// The expression is divided by its leading coefficient, so `2x + 2y <= 4` and
    /// `x + y <= 2` share one slack variable and one proxy.
    fn encode_atom(&mut self, c: &LinearConstraint) -> Result<Encoded, SessionError> {
        if let Some(truth) = c.constant_truth() {
            return Ok(Encoded::Const(truth));
        }
        let Some((_, lead)) = c.expr.terms().next() else {
            return Ok(Encoded::Const(c.relation.holds(c.expr.constant_part())));
        };
        let lead = lead.clone();

        let mut form = Vec::with_capacity(c.expr.len());
        for (v, a) in c.expr.terms() {
            let tvar = *self
                .real_tvars
                .get(v.index())
                .ok_or_else(|| SessionError::UnknownVariable(format!("real #{}", v.index())))?;
            form.push((tvar, a / &lead));
        }
        let value = -(c.expr.constant_part() / &lead);
        let relation = if lead.is_negative() {
            c.relation.flipped()
        } else {
            c.relation
        };
        let kind = match relation {
            Relation::Le => BoundKind::Upper,
            Relation::Ge => BoundKind::Lower,
            Relation::Eq => BoundKind::Both,
        };

        let tvar = if form.len() == 1 {
            form[0].0
        } else if let Some(&slack) = self.slack_index.get(&form) {
            slack
        } else {
            let slack = self.simplex.add_row(&form);
            self.slack_index.insert(form, slack);
            slack
        };

        let key = (tvar, kind, value);
        if let Some(&var) = self.atom_index.get(&key) {
            return Ok(Encoded::Lit(Lit::positive(var)));
        }
        let id = self.atoms.len();
        self.atoms.push(Atom {
            tvar,
            kind,
            value: key.2.clone(),
        });
        let var = self.new_sat_var(VarKind::Atom(id));
        self.atom_index.insert(key, var);
        Ok(Encoded::Lit(Lit::positive(var)))
    }

    fn clausify(&mut self, f: &Formula, out: &mut Vec<Vec<Lit>>) -> Result<(), SessionError> {
        match f {
            Formula::Const(true) => {}
            Formula::Const(false) => out.push(Vec::new()),
            Formula::And(children) => {
                for child in children {
                    self.clausify(child, out)?;
                }
            }
            _ => {
                let mut lits = Vec::new();
                if !self.disjunct(f, &mut lits, out)? {
                    out.push(lits);
                }
            }
        }
        Ok(())
    }

    /// Appends the literals of `f` viewed as a disjunction.
    ///
    /// Returns true if the disjunction is trivially satisfied.
    fn disjunct(
        &mut self,
        f: &Formula,
        lits: &mut Vec<Lit>,
        out: &mut Vec<Vec<Lit>>,
    ) -> Result<bool, SessionError> {
        match f {
            Formula::Const(b) => Ok(*b),
            Formula::Bool(b) => {
                lits.push(Lit::positive(self.user_var(*b)?));
                Ok(false)
            }
            Formula::NotBool(b) => {
                lits.push(Lit::negative(self.user_var(*b)?));
                Ok(false)
            }
            Formula::Atom(c) => match self.encode_atom(c)? {
                Encoded::Const(b) => Ok(b),
                Encoded::Lit(l) => {
                    lits.push(l);
                    Ok(false)
                }
            },
            Formula::Or(children) => {
                for child in children {
                    if self.disjunct(child, lits, out)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Formula::And(children) => {
                if children.is_empty() {
                    return Ok(true);
                }
                if children.len() == 1 {
                    return self.disjunct(&children[0], lits, out);
                }
                let aux = self.new_sat_var(VarKind::Aux);
                let mut inner = Vec::new();
                for child in children {
                    self.clausify(child, &mut inner)?;
                }
                for mut clause in inner {
                    clause.push(Lit::negative(aux));
                    out.push(clause);
                }
                lits.push(Lit::positive(aux));
                Ok(false)
            }
        }
    }

    fn add_input_clause(&mut self, mut lits: Vec<Lit>) {
        lits.sort();
        lits.dedup();
        if lits.windows(2).any(|w| w[0] == !w[1]) {
            return;
        }
        match lits.len() {
            0 => self.falsified.push(self.depth),
            1 => self.units.push((lits[0], self.depth)),
            _ => self.clauses.push(Clause {
                lits,
                scope: self.depth,
            }),
        }
    }

    // ========================================================================
    // Search state
    // ========================================================================

    fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    fn new_level(&mut self) {
        self.trail_lim.push(self.trail.len());
        self.simplex.push_level();
    }

    fn enqueue(&mut self, lit: Lit, reason: Option<usize>) {
        let v = lit.var();
        self.assigns[v] = Some(!lit.is_negated());
        self.levels[v] = self.decision_level();
        self.reasons[v] = reason;
        self.trail.push(lit);
    }

    fn backtrack(&mut self, level: usize) {
        if self.decision_level() <= level {
            return;
        }
        let lim = self.trail_lim[level];
        for lit in self.trail.drain(lim..) {
            self.assigns[lit.var()] = None;
            self.reasons[lit.var()] = None;
        }
        self.trail_lim.truncate(level);
        self.qhead = self.qhead.min(lim);
        self.simplex.backtrack(level);
    }

    fn reset_search(&mut self) {
        for lit in self.trail.drain(..) {
            self.assigns[lit.var()] = None;
            self.reasons[lit.var()] = None;
        }
        self.trail_lim.clear();
        self.qhead = 0;
        self.simplex.reset();
    }

    fn rebuild_watches(&mut self) {
        for list in &mut self.watches {
            list.clear();
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            self.watches[clause.lits[0].code()].push(i);
            self.watches[clause.lits[1].code()].push(i);
        }
    }

    fn attach_clause(&mut self, lits: Vec<Lit>, scope: usize) -> usize {
        let cref = self.clauses.len();
        self.watches[lits[0].code()].push(cref);
        self.watches[lits[1].code()].push(cref);
        self.clauses.push(Clause { lits, scope });
        cref
    }

    // ========================================================================
    // Propagation and conflict analysis
    // ========================================================================

    fn propagate(&mut self) -> Option<Conflict> {
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.propagations += 1;

            if !p.is_negated() {
                if let VarKind::Atom(id) = self.kinds[p.var()] {
                    let atom = &self.atoms[id];
                    if let Err(reasons) =
                        self.simplex
                            .assert_bound(atom.tvar, atom.kind, &atom.value, p)
                    {
                        self.qhead = self.trail.len();
                        return Some(Conflict::Theory(reasons));
                    }
                }
            }

            let false_lit = !p;
            let mut watchers = std::mem::take(&mut self.watches[false_lit.code()]);
            let mut conflict = None;
            let mut i = 0;
            while i < watchers.len() {
                let cref = watchers[i];
                let clause = &mut self.clauses[cref];
                if clause.lits[0] == false_lit {
                    clause.lits.swap(0, 1);
                }
                let first = clause.lits[0];
                if first.value(&self.assigns) == Some(true) {
                    i += 1;
                    continue;
                }

                let mut moved = false;
                for k in 2..clause.lits.len() {
                    if clause.lits[k].value(&self.assigns) != Some(false) {
                        clause.lits.swap(1, k);
                        self.watches[clause.lits[1].code()].push(cref);
                        moved = true;
                        break;
                    }
                }
                if moved {
                    watchers.swap_remove(i);
                    continue;
                }

                if first.value(&self.assigns) == Some(false) {
                    conflict = Some(cref);
                    break;
                }
                self.enqueue(first, Some(cref));
                i += 1;
            }
            let slot = &mut self.watches[false_lit.code()];
            watchers.append(slot);
            *slot = watchers;

            if let Some(cref) = conflict {
                self.qhead = self.trail.len();
                return Some(Conflict::Clause(cref));
            }
        }
        None
    }

    /// First-UIP analysis of a conflicting clause whose highest level is the
    /// current one. Returns the learned clause (asserting literal first) and the
    /// level to jump back to.
    fn analyze(&mut self, conflict: usize) -> (Vec<Lit>, usize) {
        let current = self.decision_level();
        let mut learnt = vec![Lit::positive(0)];
        let mut path = 0usize;
        let mut implied: Option<Lit> = None;
        let mut index = self.trail.len();
        let mut reason = Some(conflict);

        loop {
            if let Some(cref) = reason {
                for &q in &self.clauses[cref].lits {
                    if Some(q) == implied {
                        continue;
                    }
                    let v = q.var();
                    if !self.seen[v] && self.levels[v] > 0 {
                        self.seen[v] = true;
                        if self.levels[v] >= current {
                            path += 1;
                        } else {
                            learnt.push(q);
                        }
                    }
                }
            }

            while index > 0 {
                index -= 1;
                if self.seen[self.trail[index].var()] {
                    break;
                }
            }
            let lit = self.trail[index];
            self.seen[lit.var()] = false;
            implied = Some(lit);
            reason = self.reasons[lit.var()];
            path = path.saturating_sub(1);
            if path == 0 {
                break;
            }
        }

        if let Some(uip) = implied {
            learnt[0] = !uip;
        }
        for l in &learnt[1..] {
            self.seen[l.var()] = false;
        }

        let mut back_level = 0;
        if learnt.len() > 1 {
            let mut max_i = 1;
            for i in 2..learnt.len() {
                if self.levels[learnt[i].var()] > self.levels[learnt[max_i].var()] {
                    max_i = i;
                }
            }
            learnt.swap(1, max_i);
            back_level = self.levels[learnt[1].var()];
        }
        (learnt, back_level)
    }

    /// Learns from a conflict and backjumps. Returns false if the conflict holds
    /// at level zero.
    fn resolve(&mut self, conflict: Conflict) -> bool {
        let cref = match conflict {
            Conflict::Clause(cref) => cref,
            Conflict::Theory(reasons) => {
                self.stats.theory_conflicts += 1;
                let mut lemma: Vec<Lit> = reasons.into_iter().map(|l| !l).collect();
                lemma.sort();
                lemma.dedup();
                lemma.sort_by_key(|l| std::cmp::Reverse(self.levels[l.var()]));
                trace!("theory lemma with {} literal(s)", lemma.len());
                match lemma.len() {
                    0 => return false,
                    1 => {
                        let lit = lemma[0];
                        if self.levels[lit.var()] == 0 {
                            return false;
                        }
                        self.units.push((lit, 0));
                        self.backtrack(0);
                        self.enqueue(lit, None);
                        return true;
                    }
                    _ => self.attach_clause(lemma, 0),
                }
            }
        };

        let max_level = self.clauses[cref]
            .lits
            .iter()
            .map(|l| self.levels[l.var()])
            .max()
            .unwrap_or(0);
        if max_level == 0 {
            return false;
        }
        self.backtrack(max_level);

        let (learnt, back_level) = self.analyze(cref);
        self.backtrack(back_level);
        self.stats.learned += 1;
        let asserting = learnt[0];
        if learnt.len() == 1 {
            self.units.push((asserting, self.depth));
            self.enqueue(asserting, None);
        } else {
            let cref = self.attach_clause(learnt, self.depth);
            self.enqueue(asserting, Some(cref));
        }
        true
    }

    // ========================================================================
    // Decisions
    // ========================================================================

    /// Ranks a branching literal: satisfied atoms and negative proxies first,
    /// Boolean structure next, then atoms by how far the current assignment
    /// would have to move.
    fn branch_cost(&self, lit: Lit) -> (u8, BigRational) {
        match self.kinds[lit.var()] {
            VarKind::Atom(id) if !lit.is_negated() => {
                let atom = &self.atoms[id];
                let violation = self.simplex.violation(atom.tvar, atom.kind, &atom.value);
                if violation.is_zero() {
                    (0, violation)
                } else {
                    (2, violation)
                }
            }
            VarKind::Atom(_) => (0, BigRational::zero()),
            VarKind::User | VarKind::Aux => (1, BigRational::zero()),
        }
    }

    fn decide(&self, assumptions: &[Lit]) -> Decision {
        let level = self.decision_level();
        if level < assumptions.len() {
            let a = assumptions[level];
            return match a.value(&self.assigns) {
                Some(true) => Decision::EmptyLevel,
                Some(false) => Decision::Failed,
                None => Decision::Branch(a),
            };
        }

        for (cref, clause) in self.clauses.iter().enumerate() {
            if clause
                .lits
                .iter()
                .any(|l| l.value(&self.assigns) == Some(true))
            {
                continue;
            }
            let mut best: Option<(Lit, u8, BigRational)> = None;
            for &l in &clause.lits {
                if l.value(&self.assigns).is_some() {
                    continue;
                }
                let (rank, cost) = self.branch_cost(l);
                let better = match &best {
                    None => true,
                    Some((_, r, c)) => (rank, &cost) < (*r, c),
                };
                if better {
                    best = Some((l, rank, cost));
                }
                if rank == 0 {
                    break;
                }
            }
            return match best {
                Some((l, _, _)) => Decision::Branch(l),
                None => Decision::Falsified(cref),
            };
        }
        Decision::Complete
    }

    fn pivot_allowance(&self, budget: &Budget, start: u64) -> Option<u64> {
        let cap = budget.max_pivots();
        if cap == 0 {
            return Some(0);
        }
        let used = self.simplex.pivots() - start;
        if used >= cap {
            None
        } else {
            Some(cap - used)
        }
    }
}

impl SolverSession for LraSession {
    fn declare_real(&mut self, name: &str) -> RealVar {
        let tvar = self.simplex.new_var();
        self.real_tvars.push(tvar);
        self.real_names.push(name.to_string());
        RealVar((self.real_tvars.len() - 1) as u32)
    }

    fn declare_bool(&mut self, name: &str) -> BoolVar {
        let v = self.new_sat_var(VarKind::User);
        self.bool_vars.push(v);
        self.bool_names.push(name.to_string());
        BoolVar((self.bool_vars.len() - 1) as u32)
    }

    fn assert(&mut self, formula: &Formula) -> Result<(), SessionError> {
        self.model_valid = false;
        let mut clauses = Vec::new();
        self.clausify(formula, &mut clauses)?;
        for lits in clauses {
            self.add_input_clause(lits);
        }
        Ok(())
    }

    fn push(&mut self) {
        self.depth += 1;
    }

    fn pop(&mut self, n: usize) -> Result<(), SessionError> {
        if n > self.depth {
            return Err(SessionError::UnbalancedPop {
                requested: n,
                depth: self.depth,
            });
        }
        self.reset_search();
        self.model_valid = false;
        self.depth -= n;
        let depth = self.depth;
        self.clauses.retain(|c| c.scope <= depth);
        self.units.retain(|(_, scope)| *scope <= depth);
        self.falsified.retain(|scope| *scope <= depth);
        Ok(())
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn check(&mut self, assumptions: &[BoolVar], budget: &Budget) -> CheckOutcome {
        self.stats.checks += 1;
        self.model_valid = false;
        self.reset_search();
        if !self.falsified.is_empty() {
            return CheckOutcome::Unsat;
        }
        self.rebuild_watches();

        let units: Vec<Lit> = self.units.iter().map(|(l, _)| *l).collect();
        for lit in units {
            match lit.value(&self.assigns) {
                Some(true) => {}
                Some(false) => return CheckOutcome::Unsat,
                None => self.enqueue(lit, None),
            }
        }

        let mut assumption_lits = Vec::with_capacity(assumptions.len());
        for b in assumptions {
            match self.user_var(*b) {
                Ok(v) => assumption_lits.push(Lit::positive(v)),
                Err(e) => {
                    return CheckOutcome::Unknown(IndeterminateReason::SolverUnknown(
                        e.to_string(),
                    ))
                }
            }
        }

        let pivot_start = self.simplex.pivots();
        let mut conflicts = 0u64;
        let outcome = loop {
            if let Some(reason) = budget.exhausted() {
                break CheckOutcome::Unknown(reason);
            }

            let conflict = match self.propagate() {
                Some(c) => Some(c),
                None => {
                    let Some(allowance) = self.pivot_allowance(budget, pivot_start) else {
                        break CheckOutcome::Unknown(IndeterminateReason::BudgetExceeded);
                    };
                    match self.simplex.check(allowance) {
                        SimplexOutcome::Feasible => None,
                        SimplexOutcome::Conflict(reasons) => Some(Conflict::Theory(reasons)),
                        SimplexOutcome::Exhausted => {
                            break CheckOutcome::Unknown(IndeterminateReason::BudgetExceeded)
                        }
                    }
                }
            };

            let conflict = match conflict {
                Some(c) => Some(c),
                None => match self.decide(&assumption_lits) {
                    Decision::Branch(lit) => {
                        self.stats.decisions += 1;
                        self.new_level();
                        self.enqueue(lit, None);
                        None
                    }
                    Decision::EmptyLevel => {
                        self.new_level();
                        None
                    }
                    Decision::Failed => break CheckOutcome::Unsat,
                    Decision::Falsified(cref) => Some(Conflict::Clause(cref)),
                    Decision::Complete => break CheckOutcome::Sat,
                },
            };

            if let Some(conflict) = conflict {
                conflicts += 1;
                self.stats.conflicts += 1;
                if !self.resolve(conflict) {
                    break CheckOutcome::Unsat;
                }
                if budget.conflicts_exhausted(conflicts) {
                    break CheckOutcome::Unknown(IndeterminateReason::BudgetExceeded);
                }
            }
        };

        self.model_valid = outcome.is_sat();
        debug!(
            "check #{}: {} ({} conflicts, {} atoms, {} clauses, {} rows)",
            self.stats.checks,
            outcome,
            conflicts,
            self.atoms.len(),
            self.clauses.len(),
            self.simplex.num_rows()
        );
        outcome
    }

    fn real_value(&self, v: RealVar) -> Option<BigRational> {
        if !self.model_valid {
            return None;
        }
        self.real_tvars
            .get(v.index())
            .map(|&t| self.simplex.value(t).clone())
    }

    fn bool_value(&self, v: BoolVar) -> Option<bool> {
        if !self.model_valid {
            return None;
        }
        self.bool_vars
            .get(v.index())
            .map(|&s| self.assigns[s].unwrap_or(false))
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            pivots: self.simplex.pivots(),
            ..self.stats.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearExpr;
    use num_bigint::BigInt;
    use seqarrange_core::CancelToken;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn c(n: i64) -> LinearExpr {
        LinearExpr::constant(q(n))
    }

    fn x(v: RealVar) -> LinearExpr {
        LinearExpr::var(v)
    }

    fn check(session: &mut LraSession) -> CheckOutcome {
        session.check(&[], &Budget::unlimited())
    }

    #[test]
    fn test_bounds_sat_and_unsat() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        s.assert(&x(a).ge(&c(1)).into()).unwrap();
        s.assert(&x(a).le(&c(3)).into()).unwrap();
        assert_eq!(check(&mut s), CheckOutcome::Sat);
        let v = s.real_value(a).unwrap();
        assert!(v >= q(1) && v <= q(3));

        s.assert(&x(a).ge(&c(4)).into()).unwrap();
        assert_eq!(check(&mut s), CheckOutcome::Unsat);
        assert!(s.real_value(a).is_none());
    }

    #[test]
    fn test_disjunction_picks_feasible_branch() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        s.assert(&Formula::or([x(a).le(&c(0)).into(), x(a).ge(&c(10)).into()]))
            .unwrap();
        s.assert(&x(a).ge(&c(1)).into()).unwrap();
        assert!(check(&mut s).is_sat());
        assert!(s.real_value(a).unwrap() >= q(10));
    }

    #[test]
    fn test_push_pop_scopes() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        let b = s.declare_real("b");
        s.assert(&x(a).plus(&x(b)).le(&c(10)).into()).unwrap();

        s.push();
        s.assert(&x(a).ge(&c(8)).into()).unwrap();
        s.assert(&x(b).ge(&c(5)).into()).unwrap();
        assert_eq!(check(&mut s), CheckOutcome::Unsat);

        s.pop(1).unwrap();
        assert_eq!(s.depth(), 0);
        assert_eq!(check(&mut s), CheckOutcome::Sat);
        let sum = s.real_value(a).unwrap() + s.real_value(b).unwrap();
        assert!(sum <= q(10));
    }

    #[test]
    fn test_unbalanced_pop() {
        let mut s = LraSession::new();
        s.push();
        assert!(s.pop(2).is_err());
        assert!(s.pop(1).is_ok());
    }

    #[test]
    fn test_assumptions_are_one_shot() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        let guard = s.declare_bool("guard");
        s.assert(&Formula::implies(guard, x(a).le(&c(1)).into()))
            .unwrap();
        s.assert(&x(a).ge(&c(2)).into()).unwrap();

        assert_eq!(s.check(&[guard], &Budget::unlimited()), CheckOutcome::Unsat);
        assert_eq!(check(&mut s), CheckOutcome::Sat);
        assert_eq!(s.bool_value(guard), Some(false));
    }

    #[test]
    fn test_exclusive_intervals() {
        let mut s = LraSession::new();
        let ts: Vec<RealVar> = (0..3).map(|i| s.declare_real(&format!("t{}", i))).collect();
        for &t in &ts {
            s.assert(&x(t).ge(&c(0)).into()).unwrap();
        }
        for i in 0..3 {
            for j in (i + 1)..3 {
                s.assert(&Formula::or([
                    x(ts[i]).shifted(&q(1)).le(&x(ts[j])).into(),
                    x(ts[j]).shifted(&q(1)).le(&x(ts[i])).into(),
                ]))
                .unwrap();
            }
        }

        s.push();
        for &t in &ts {
            s.assert(&x(t).le(&c(2)).into()).unwrap();
        }
        assert_eq!(check(&mut s), CheckOutcome::Sat);
        let mut values: Vec<BigRational> = ts.iter().map(|&t| s.real_value(t).unwrap()).collect();
        values.sort();
        assert!(&values[0] + q(1) <= values[1]);
        assert!(&values[1] + q(1) <= values[2]);
        s.pop(1).unwrap();

        s.push();
        for &t in &ts {
            s.assert(&x(t).le(&c(1)).into()).unwrap();
        }
        assert_eq!(check(&mut s), CheckOutcome::Unsat);
        s.pop(1).unwrap();

        assert_eq!(check(&mut s), CheckOutcome::Sat);
    }

    #[test]
    fn test_nested_conjunction_in_disjunction() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        let b = s.declare_real("b");
        s.assert(&Formula::or([
            Formula::and([x(a).ge(&c(5)).into(), x(b).ge(&c(5)).into()]),
            x(a).le(&c(-5)).into(),
        ]))
        .unwrap();
        s.assert(&x(a).ge(&c(0)).into()).unwrap();
        assert!(check(&mut s).is_sat());
        assert!(s.real_value(a).unwrap() >= q(5));
        assert!(s.real_value(b).unwrap() >= q(5));
    }

    #[test]
    fn test_equalities_and_normalization() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        let b = s.declare_real("b");
        s.assert(&x(a).scaled(&q(2)).plus(&x(b).scaled(&q(2))).eq_to(&c(8)).into())
            .unwrap();
        s.assert(&x(a).plus(&x(b)).le(&c(4)).into()).unwrap();
        s.assert(&x(b).eq_to(&c(1)).into()).unwrap();
        assert!(check(&mut s).is_sat());
        assert_eq!(s.real_value(a), Some(q(3)));
        // a + b shares its slack between the two atoms
        assert_eq!(s.num_atoms(), 3);
    }

    #[test]
    fn test_constant_formulas() {
        let mut s = LraSession::new();
        s.assert(&c(1).le(&c(2)).into()).unwrap();
        assert!(check(&mut s).is_sat());
        s.push();
        s.assert(&Formula::Const(false)).unwrap();
        assert!(check(&mut s).is_unsat());
        s.pop(1).unwrap();
        assert!(check(&mut s).is_sat());
    }

    #[test]
    fn test_cancelled_budget() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        s.assert(&x(a).ge(&c(0)).into()).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let budget = Budget::unlimited().with_cancel(token);
        assert_eq!(
            s.check(&[], &budget),
            CheckOutcome::Unknown(IndeterminateReason::Cancelled)
        );
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut s = LraSession::new();
        let stray = RealVar(7);
        assert!(matches!(
            s.assert(&x(stray).ge(&c(0)).into()),
            Err(SessionError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_lemmas_survive_pop() {
        let mut s = LraSession::new();
        let a = s.declare_real("a");
        s.assert(&Formula::or([x(a).le(&c(0)).into(), x(a).ge(&c(10)).into()]))
            .unwrap();
        s.push();
        s.assert(&x(a).ge(&c(1)).into()).unwrap();
        s.assert(&x(a).le(&c(9)).into()).unwrap();
        assert!(check(&mut s).is_unsat());
        s.pop(1).unwrap();
        assert!(check(&mut s).is_sat());
        assert!(s.stats().theory_conflicts > 0);
        assert_eq!(s.real_name(a), Some("a"));
    }
}
