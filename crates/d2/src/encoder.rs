//! Symbolic encoding of one batch.
//!
//! Every object in the batch gets real variables `(x, y, t)`. The encoder emits
//! tagged [`Constraint`]s; the caller decides which scope they are asserted in.

use crate::object::PreparedObject;
use crate::polygon::{project, BoundingBox, Point, SeparatingLine};
use num_rational::BigRational;
use num_traits::Zero;
use seqarrange_core::rational::{max_ref, rational_from_f64};
use seqarrange_core::{Result, SolverConfiguration};
use seqarrange_smt::{BoolVar, Formula, LinearExpr, RealVar, SolverSession};
use std::fmt;

/// What a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Lower plate bounds and the time window.
    Bound,
    /// Weak (bounding-box) non-overlap of a pair.
    PairwiseNonOverlap,
    /// Disjoint processing windows of a pair.
    TemporalOrdering,
    /// Head clearance of one object against another.
    Clearance,
    /// Corrective lemma added by refinement.
    Refinement,
    /// Assumption-guarded upper plate bound.
    PlateSize,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bound => "bound",
            Self::PairwiseNonOverlap => "non-overlap",
            Self::TemporalOrdering => "ordering",
            Self::Clearance => "clearance",
            Self::Refinement => "refinement",
            Self::PlateSize => "plate",
        };
        write!(f, "{}", name)
    }
}

/// An object taking part in a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRef {
    /// Batch-local index.
    Batch(usize),
    /// Index into the fixed objects.
    Fixed(usize),
}

/// A formula together with what it encodes and whom it concerns.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub objects: Vec<ObjectRef>,
    pub formula: Formula,
}

impl Constraint {
    fn new(kind: ConstraintKind, objects: Vec<ObjectRef>, formula: Formula) -> Self {
        Self {
            kind,
            objects,
            formula,
        }
    }
}

/// An object decided by an earlier batch.
#[derive(Debug, Clone)]
pub struct FixedObject {
    /// Index of the object in the caller's input.
    pub index: usize,
    /// Committed translation.
    pub position: Point,
    /// Committed start time.
    pub start: BigRational,
}

/// Solver variables of one batch object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectVars {
    pub x: RealVar,
    pub y: RealVar,
    pub t: RealVar,
}

/// Exact values read back from a satisfying assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Translation per batch-local object.
    pub positions: Vec<Point>,
    /// Start time per batch-local object.
    pub times: Vec<BigRational>,
}

enum Position<'p> {
    Var(ObjectVars),
    Fixed(&'p Point),
}

/// Builds the constraints of one batch against the already fixed objects.
pub struct Encoder<'a> {
    objects: &'a [PreparedObject],
    batch: &'a [usize],
    fixed: &'a [FixedObject],
    vars: Vec<ObjectVars>,
    release: BigRational,
    horizon: BigRational,
    weak_ratio: BigRational,
    exclusive: bool,
}

impl<'a> Encoder<'a> {
    /// Declares the batch variables in `session`.
    ///
    /// `batch` holds indices into `objects`; fixed objects index `objects` as well.
    pub fn new<S: SolverSession>(
        session: &mut S,
        objects: &'a [PreparedObject],
        batch: &'a [usize],
        fixed: &'a [FixedObject],
        config: &SolverConfiguration,
    ) -> Result<Self> {
        let vars = batch
            .iter()
            .map(|&i| ObjectVars {
                x: session.declare_real(&format!("x{}", i)),
                y: session.declare_real(&format!("y{}", i)),
                t: session.declare_real(&format!("t{}", i)),
            })
            .collect();

        // New objects start after everything fixed has been processed.
        let mut release = BigRational::zero();
        for f in fixed {
            let end = &f.start + &objects[f.index].duration;
            if end > release {
                release = end;
            }
        }
        let horizon = match config.time_horizon {
            Some(h) => rational_from_f64(h)?,
            None => batch
                .iter()
                .fold(release.clone(), |acc, &i| acc + &objects[i].duration),
        };

        Ok(Self {
            objects,
            batch,
            fixed,
            vars,
            release,
            horizon,
            weak_ratio: rational_from_f64(config.weak_extent_ratio)?,
            exclusive: config.exclusive_processing,
        })
    }

    /// Number of objects in the batch.
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Original indices of the batch objects.
    pub fn batch(&self) -> &[usize] {
        self.batch
    }

    pub fn fixed(&self) -> &[FixedObject] {
        self.fixed
    }

    pub fn vars(&self) -> &[ObjectVars] {
        &self.vars
    }

    /// Earliest start time for the batch.
    pub fn release(&self) -> &BigRational {
        &self.release
    }

    /// Latest completion time for the batch.
    pub fn horizon(&self) -> &BigRational {
        &self.horizon
    }

    /// Prepared object behind a reference.
    pub fn object(&self, r: ObjectRef) -> &'a PreparedObject {
        let objects: &'a [PreparedObject] = self.objects;
        match r {
            ObjectRef::Batch(i) => &objects[self.batch[i]],
            ObjectRef::Fixed(k) => &objects[self.fixed[k].index],
        }
    }

    /// Original input index behind a reference.
    pub fn original_index(&self, r: ObjectRef) -> usize {
        match r {
            ObjectRef::Batch(i) => self.batch[i],
            ObjectRef::Fixed(k) => self.fixed[k].index,
        }
    }

    /// Translation of an object under `model`.
    pub fn position_in<'m>(&'m self, r: ObjectRef, model: &'m Model) -> &'m Point {
        match r {
            ObjectRef::Batch(i) => &model.positions[i],
            ObjectRef::Fixed(k) => &self.fixed[k].position,
        }
    }

    fn position(&self, r: ObjectRef) -> Position<'a> {
        let fixed: &'a [FixedObject] = self.fixed;
        match r {
            ObjectRef::Batch(i) => Position::Var(self.vars[i]),
            ObjectRef::Fixed(k) => Position::Fixed(&fixed[k].position),
        }
    }

    /// Every pair the batch has to keep apart: batch/batch then batch/fixed.
    pub fn pairs(&self) -> Vec<(ObjectRef, ObjectRef)> {
        let n = self.len();
        let mut pairs = Vec::with_capacity(n * (n + self.fixed.len()));
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((ObjectRef::Batch(i), ObjectRef::Batch(j)));
            }
        }
        for i in 0..n {
            for k in 0..self.fixed.len() {
                pairs.push((ObjectRef::Batch(i), ObjectRef::Fixed(k)));
            }
        }
        pairs
    }

    /// Bound, weak non-overlap, ordering and clearance constraints.
    pub fn base_constraints(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        let n = self.len();

        for i in 0..n {
            let obj = self.object(ObjectRef::Batch(i));
            let v = self.vars[i];
            let bbox = obj.bbox();
            let t = LinearExpr::var(v.t);
            let zero = LinearExpr::zero();
            let formula = Formula::and([
                LinearExpr::var(v.x).shifted(&bbox.min_x).ge(&zero).into(),
                LinearExpr::var(v.y).shifted(&bbox.min_y).ge(&zero).into(),
                t.clone().ge(&LinearExpr::constant(self.release.clone())).into(),
                t.shifted(&obj.duration)
                    .le(&LinearExpr::constant(self.horizon.clone()))
                    .into(),
            ]);
            out.push(Constraint::new(
                ConstraintKind::Bound,
                vec![ObjectRef::Batch(i)],
                formula,
            ));
        }

        for (a, b) in self.pairs() {
            let formula = match b {
                ObjectRef::Batch(_) => {
                    let box_a = self.weak_box(a);
                    let box_b = self.weak_box(b);
                    self.box_separation(a, &box_a, b, &box_b)
                }
                ObjectRef::Fixed(_) => {
                    let box_a = self.object(a).bbox().clone();
                    let box_b = self.object(b).bbox().clone();
                    self.box_separation(a, &box_a, b, &box_b)
                }
            };
            out.push(Constraint::new(
                ConstraintKind::PairwiseNonOverlap,
                vec![a, b],
                formula,
            ));
        }

        if self.exclusive {
            for i in 0..n {
                for j in (i + 1)..n {
                    out.push(Constraint::new(
                        ConstraintKind::TemporalOrdering,
                        vec![ObjectRef::Batch(i), ObjectRef::Batch(j)],
                        Formula::or([self.finishes_before(i, j), self.finishes_before(j, i)]),
                    ));
                }
            }
        }

        for i in 0..n {
            let owner = ObjectRef::Batch(i);
            for zone in &self.object(owner).zones {
                let zone_box = zone.bbox();
                for j in (0..n).filter(|&j| j != i) {
                    let other = ObjectRef::Batch(j);
                    let apart =
                        self.box_separation(owner, zone_box, other, self.object(other).bbox());
                    out.push(Constraint::new(
                        ConstraintKind::Clearance,
                        vec![owner, other],
                        Formula::or([self.finishes_before(i, j), apart]),
                    ));
                }
                for k in 0..self.fixed.len() {
                    let other = ObjectRef::Fixed(k);
                    out.push(Constraint::new(
                        ConstraintKind::Clearance,
                        vec![owner, other],
                        self.box_separation(owner, zone_box, other, self.object(other).bbox()),
                    ));
                }
            }
        }

        out
    }

    /// `x + max_x <= size` and `y + max_y <= size` for every batch object, active
    /// only while `guard` is assumed.
    pub fn plate_constraint(&self, guard: BoolVar, size: &BigRational) -> Constraint {
        let limit = LinearExpr::constant(size.clone());
        let bounds = self.vars.iter().enumerate().flat_map(|(i, v)| {
            let bbox = self.object(ObjectRef::Batch(i)).bbox();
            [
                Formula::from(LinearExpr::var(v.x).shifted(&bbox.max_x).le(&limit)),
                Formula::from(LinearExpr::var(v.y).shifted(&bbox.max_y).le(&limit)),
            ]
        });
        let formula = Formula::and(bounds.map(|b| Formula::implies(guard, b)).collect::<Vec<_>>());
        Constraint::new(
            ConstraintKind::PlateSize,
            (0..self.len()).map(ObjectRef::Batch).collect(),
            formula,
        )
    }

    /// Corrective lemma: the hulls of `a` and `b` are separated along the line's
    /// axis or its perpendicular.
    pub fn refinement(&self, a: ObjectRef, b: ObjectRef, line: &SeparatingLine) -> Constraint {
        let u = line.axis.clone();
        let perp = (-&u.1, u.0.clone());
        let formula = self.separation(
            a,
            self.object(a).footprint.hull(),
            b,
            self.object(b).footprint.hull(),
            &[u, perp],
        );
        Constraint::new(ConstraintKind::Refinement, vec![a, b], formula)
    }

    /// Fallback lemma: full bounding boxes separated along x or y.
    pub fn box_refinement(&self, a: ObjectRef, b: ObjectRef) -> Constraint {
        let formula = self.box_separation(a, self.object(a).bbox(), b, self.object(b).bbox());
        Constraint::new(ConstraintKind::Refinement, vec![a, b], formula)
    }

    /// Reads the batch variables from a satisfied session.
    pub fn extract<S: SolverSession>(&self, session: &S) -> Option<Model> {
        let mut positions = Vec::with_capacity(self.len());
        let mut times = Vec::with_capacity(self.len());
        for v in &self.vars {
            positions.push((session.real_value(v.x)?, session.real_value(v.y)?));
            times.push(session.real_value(v.t)?);
        }
        Some(Model { positions, times })
    }

    /// Largest x/y coordinate covered by the batch under `model`.
    pub fn extent(&self, model: &Model) -> BigRational {
        let mut extent = BigRational::zero();
        for (i, (x, y)) in model.positions.iter().enumerate() {
            let bbox = self.object(ObjectRef::Batch(i)).bbox();
            let right = x + &bbox.max_x;
            let top = y + &bbox.max_y;
            extent = max_ref(&extent, max_ref(&right, &top)).clone();
        }
        extent
    }

    fn weak_box(&self, r: ObjectRef) -> BoundingBox {
        self.object(r).bbox().shrunk(&self.weak_ratio)
    }

    /// `t_i + d_i <= t_j`.
    fn finishes_before(&self, i: usize, j: usize) -> Formula {
        let d = &self.object(ObjectRef::Batch(i)).duration;
        LinearExpr::var(self.vars[i].t)
            .shifted(d)
            .le(&LinearExpr::var(self.vars[j].t))
            .into()
    }

    fn box_separation(
        &self,
        a: ObjectRef,
        box_a: &BoundingBox,
        b: ObjectRef,
        box_b: &BoundingBox,
    ) -> Formula {
        let one = BigRational::from_integer(1.into());
        let zero = BigRational::zero();
        self.separation(
            a,
            &box_a.corners(),
            b,
            &box_b.corners(),
            &[(one.clone(), zero.clone()), (zero, one)],
        )
    }

    /// Disjunction over `axes`: the placed point sets are separated along some axis,
    /// in either order.
    fn separation(
        &self,
        a: ObjectRef,
        points_a: &[Point],
        b: ObjectRef,
        points_b: &[Point],
        axes: &[Point],
    ) -> Formula {
        let pos_a = self.position(a);
        let pos_b = self.position(b);
        let mut options = Vec::with_capacity(axes.len() * 2);
        for u in axes {
            let (lo_a, hi_a) = project(points_a, u);
            let (lo_b, hi_b) = project(points_b, u);
            let along_a = along(&pos_a, u);
            let along_b = along(&pos_b, u);
            options.push(Formula::from(
                along_a.clone().shifted(&hi_a).le(&along_b.clone().shifted(&lo_b)),
            ));
            options.push(Formula::from(along_b.shifted(&hi_b).le(&along_a.shifted(&lo_a))));
        }
        Formula::or(options)
    }
}

/// `u . position` as a linear expression.
fn along(position: &Position<'_>, u: &Point) -> LinearExpr {
    match position {
        Position::Var(v) => {
            let mut e = LinearExpr::term(v.x, u.0.clone());
            e.add_term(v.y, u.1.clone());
            e
        }
        Position::Fixed(p) => LinearExpr::constant(&u.0 * &p.0 + &u.1 * &p.1),
    }
}
