//! Boolean combinations of linear constraints.

use crate::linear::{BoolVar, LinearConstraint, RealVar};
use num_rational::BigRational;

/// A quantifier-free formula in negation normal form.
///
/// Linear atoms appear only positively; a negated comparison is written as the
/// opposite comparison by the caller. Boolean variables may appear with either
/// polarity.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// Constant truth value.
    Const(bool),
    /// A Boolean variable.
    Bool(BoolVar),
    /// The negation of a Boolean variable.
    NotBool(BoolVar),
    /// A linear comparison.
    Atom(LinearConstraint),
    /// Conjunction (empty = true).
    And(Vec<Formula>),
    /// Disjunction (empty = false).
    Or(Vec<Formula>),
}

impl Formula {
    /// Conjunction, flattened one level.
    pub fn and(children: impl IntoIterator<Item = Formula>) -> Self {
        let mut out = Vec::new();
        for child in children {
            match child {
                Formula::And(inner) => out.extend(inner),
                Formula::Const(true) => {}
                other => out.push(other),
            }
        }
        if out.len() == 1 {
            out.pop().unwrap_or(Formula::Const(true))
        } else {
            Formula::And(out)
        }
    }

    /// Disjunction, flattened one level.
    pub fn or(children: impl IntoIterator<Item = Formula>) -> Self {
        let mut out = Vec::new();
        for child in children {
            match child {
                Formula::Or(inner) => out.extend(inner),
                Formula::Const(false) => {}
                other => out.push(other),
            }
        }
        if out.len() == 1 {
            out.pop().unwrap_or(Formula::Const(false))
        } else {
            Formula::Or(out)
        }
    }

    /// `!guard OR body`.
    pub fn implies(guard: BoolVar, body: Formula) -> Self {
        Formula::or([Formula::NotBool(guard), body])
    }

    /// Number of linear atoms in the formula.
    pub fn atom_count(&self) -> usize {
        match self {
            Formula::Atom(_) => 1,
            Formula::And(c) | Formula::Or(c) => c.iter().map(Formula::atom_count).sum(),
            _ => 0,
        }
    }

    /// Evaluates the formula under complete assignments.
    pub fn evaluate(
        &self,
        real: &impl Fn(RealVar) -> BigRational,
        boolean: &impl Fn(BoolVar) -> bool,
    ) -> bool {
        match self {
            Formula::Const(b) => *b,
            Formula::Bool(v) => boolean(*v),
            Formula::NotBool(v) => !boolean(*v),
            Formula::Atom(c) => c.holds(real),
            Formula::And(c) => c.iter().all(|f| f.evaluate(real, boolean)),
            Formula::Or(c) => c.iter().any(|f| f.evaluate(real, boolean)),
        }
    }
}

impl From<LinearConstraint> for Formula {
    fn from(c: LinearConstraint) -> Self {
        Formula::Atom(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearExpr;
    use num_bigint::BigInt;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_flattening() {
        let a = Formula::Bool(BoolVar(0));
        let b = Formula::Bool(BoolVar(1));
        let f = Formula::or([Formula::or([a.clone(), b.clone()]), Formula::Const(false)]);
        assert_eq!(f, Formula::Or(vec![a.clone(), b]));

        let single = Formula::and([Formula::Const(true), a.clone()]);
        assert_eq!(single, a);

        assert_eq!(Formula::or(Vec::new()), Formula::Or(vec![]));
    }

    #[test]
    fn test_evaluate_and_atom_count() {
        let x = RealVar(0);
        let atom: Formula = LinearExpr::var(x).le(&LinearExpr::constant(q(2))).into();
        let f = Formula::implies(BoolVar(0), atom);
        assert_eq!(f.atom_count(), 1);

        assert!(f.evaluate(&|_| q(5), &|_| false));
        assert!(!f.evaluate(&|_| q(5), &|_| true));
        assert!(f.evaluate(&|_| q(1), &|_| true));
    }
}
