//! Linear expressions and constraints over real variables.

use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::collections::BTreeMap;

/// Handle to a real-valued solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RealVar(pub(crate) u32);

impl RealVar {
    /// Position of the variable in declaration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a Boolean solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(pub(crate) u32);

impl BoolVar {
    /// Position of the variable in declaration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// `sum(coeff * var) + constant` with exact rational coefficients.
///
/// Terms are kept in variable order with zero coefficients removed, so two equal
/// expressions compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinearExpr {
    terms: BTreeMap<RealVar, BigRational>,
    constant: BigRational,
}

impl LinearExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: BigRational) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// A single variable with coefficient one.
    pub fn var(v: RealVar) -> Self {
        let mut e = Self::zero();
        e.add_term(v, BigRational::from_integer(1.into()));
        e
    }

    /// A single scaled variable.
    pub fn term(v: RealVar, coeff: BigRational) -> Self {
        let mut e = Self::zero();
        e.add_term(v, coeff);
        e
    }

    /// Adds `coeff * v`.
    pub fn add_term(&mut self, v: RealVar, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        let entry = self.terms.entry(v).or_insert_with(BigRational::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.terms.remove(&v);
        }
    }

    /// Adds a constant.
    pub fn add_constant(&mut self, value: &BigRational) {
        self.constant += value;
    }

    /// `self + other`.
    pub fn plus(mut self, other: &LinearExpr) -> Self {
        for (v, c) in &other.terms {
            self.add_term(*v, c.clone());
        }
        self.constant += &other.constant;
        self
    }

    /// `self - other`.
    pub fn minus(mut self, other: &LinearExpr) -> Self {
        for (v, c) in &other.terms {
            self.add_term(*v, -c.clone());
        }
        self.constant -= &other.constant;
        self
    }

    /// `self + value`.
    pub fn shifted(mut self, value: &BigRational) -> Self {
        self.constant += value;
        self
    }

    /// `k * self`.
    pub fn scaled(mut self, k: &BigRational) -> Self {
        if k.is_zero() {
            return Self::zero();
        }
        for c in self.terms.values_mut() {
            *c *= k;
        }
        self.constant *= k;
        self
    }

    /// Iterates over `(variable, coefficient)` pairs in variable order.
    pub fn terms(&self) -> impl Iterator<Item = (RealVar, &BigRational)> {
        self.terms.iter().map(|(v, c)| (*v, c))
    }

    /// Number of variables with a non-zero coefficient.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if the expression has no variable terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The constant part.
    pub fn constant_part(&self) -> &BigRational {
        &self.constant
    }

    /// Evaluates under a variable assignment.
    pub fn evaluate(&self, value: impl Fn(RealVar) -> BigRational) -> BigRational {
        let mut sum = self.constant.clone();
        for (v, c) in &self.terms {
            sum += c * value(*v);
        }
        sum
    }

    /// `self <= rhs`.
    pub fn le(self, rhs: &LinearExpr) -> LinearConstraint {
        LinearConstraint::new(self.minus(rhs), Relation::Le)
    }

    /// `self >= rhs`.
    pub fn ge(self, rhs: &LinearExpr) -> LinearConstraint {
        LinearConstraint::new(self.minus(rhs), Relation::Ge)
    }

    /// `self == rhs`.
    pub fn eq_to(self, rhs: &LinearExpr) -> LinearConstraint {
        LinearConstraint::new(self.minus(rhs), Relation::Eq)
    }
}

impl From<RealVar> for LinearExpr {
    fn from(v: RealVar) -> Self {
        LinearExpr::var(v)
    }
}

/// Comparison of an expression against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `expr <= 0`
    Le,
    /// `expr >= 0`
    Ge,
    /// `expr == 0`
    Eq,
}

impl Relation {
    /// The relation obtained by multiplying both sides by a negative number.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Eq => Relation::Eq,
        }
    }

    /// Tests `value REL 0`.
    pub fn holds(self, value: &BigRational) -> bool {
        match self {
            Relation::Le => !value.is_positive(),
            Relation::Ge => !value.is_negative(),
            Relation::Eq => value.is_zero(),
        }
    }
}

/// `expr REL 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Relation against zero.
    pub relation: Relation,
}

impl LinearConstraint {
    /// Creates `expr REL 0`.
    pub fn new(expr: LinearExpr, relation: Relation) -> Self {
        Self { expr, relation }
    }

    /// Evaluates the constraint under a variable assignment.
    pub fn holds(&self, value: impl Fn(RealVar) -> BigRational) -> bool {
        self.relation.holds(&self.expr.evaluate(value))
    }

    /// For variable-free constraints, the constant truth value.
    pub fn constant_truth(&self) -> Option<bool> {
        if self.expr.is_empty() {
            Some(self.relation.holds(self.expr.constant_part()))
        } else {
            None
        }
    }
}
