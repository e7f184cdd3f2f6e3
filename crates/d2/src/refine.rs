//! Counterexample-guided refinement.
//!
//! The encoder only keeps weak boxes apart, so a satisfying model may still place
//! two contours on top of each other. Each round checks the model against the exact
//! polygons and adds one corrective lemma per overlapping pair until the model is
//! geometrically valid, the solver proves the constraints unsatisfiable, or a budget
//! runs out.

use crate::encoder::{Constraint, Encoder, Model, ObjectRef};
use crate::polygon::{overlaps_with_tolerance, separating_line, PlacedShape};
use rayon::prelude::*;
use seqarrange_core::{ArrangementStats, Budget, Error, IndeterminateReason, Result};
use seqarrange_smt::{BoolVar, CheckOutcome, SolverSession};

/// Result of refining under one set of assumptions.
#[derive(Debug, Clone, PartialEq)]
pub enum RefinementOutcome {
    /// The model passed the exact overlap check.
    Valid(Model),
    /// No model exists under the assumptions.
    Infeasible,
    /// The loop stopped without a verdict.
    Indeterminate(IndeterminateReason),
}

/// Limits for one refinement run.
#[derive(Debug, Clone, Copy)]
pub struct RefineLimits {
    /// Maximum solver rounds (0 = unlimited).
    pub max_iterations: usize,
    /// Intersection area tolerated between contours.
    pub overlap_tolerance: f64,
}

/// Pairs whose placed contours overlap under `model`.
///
/// Pairs are tested in parallel; the returned order follows [`Encoder::pairs`].
pub fn overlapping_pairs(
    encoder: &Encoder<'_>,
    model: &Model,
    tolerance: f64,
) -> Vec<(ObjectRef, ObjectRef)> {
    encoder
        .pairs()
        .into_par_iter()
        .filter(|&(a, b)| {
            let shape_a = PlacedShape::new(&encoder.object(a).footprint, encoder.position_in(a, model), 0);
            let shape_b = PlacedShape::new(&encoder.object(b).footprint, encoder.position_in(b, model), 1);
            overlaps_with_tolerance(&shape_a, &shape_b, tolerance)
        })
        .collect()
}

/// Builds the corrective lemma for an overlapping pair.
///
/// Returns the lemma and whether the pair was degenerate (coincident contours).
pub fn corrective_lemma(
    encoder: &Encoder<'_>,
    model: &Model,
    a: ObjectRef,
    b: ObjectRef,
) -> Result<(Constraint, bool)> {
    let shape_a = PlacedShape::new(
        &encoder.object(a).footprint,
        encoder.position_in(a, model),
        encoder.original_index(a),
    );
    let shape_b = PlacedShape::new(
        &encoder.object(b).footprint,
        encoder.position_in(b, model),
        encoder.original_index(b),
    );
    match separating_line(&shape_a, &shape_b) {
        Ok(line) => {
            log::trace!(
                "separating {} and {}: axis ({}, {}), depth {:.4}",
                shape_a.label,
                shape_b.label,
                line.axis.0,
                line.axis.1,
                line.penetration
            );
            Ok((encoder.refinement(a, b, &line), false))
        }
        Err(err @ Error::GeometryDegenerate { .. }) => {
            log::warn!("{}; falling back to bounding-box separation", err);
            Ok((encoder.box_refinement(a, b), true))
        }
        Err(err) => Err(err),
    }
}

/// Runs the refinement loop on `session`.
///
/// Lemmas are asserted in the session's current scope and also appended to
/// `lemmas`, so the caller can re-assert them after popping.
pub fn refine<S: SolverSession>(
    session: &mut S,
    encoder: &Encoder<'_>,
    assumptions: &[BoolVar],
    limits: RefineLimits,
    budget: &Budget,
    stats: &mut ArrangementStats,
    lemmas: &mut Vec<Constraint>,
) -> Result<RefinementOutcome> {
    let mut iteration = 0usize;
    loop {
        if let Some(reason) = budget.exhausted() {
            return Ok(RefinementOutcome::Indeterminate(reason));
        }
        if limits.max_iterations > 0 && iteration >= limits.max_iterations {
            log::warn!(
                "refinement stopped after {} iterations ({} lemmas)",
                iteration,
                lemmas.len()
            );
            return Ok(RefinementOutcome::Indeterminate(
                IndeterminateReason::BudgetExceeded,
            ));
        }
        iteration += 1;

        stats.solver_checks += 1;
        let outcome = session.check(assumptions, budget);
        log::debug!("refinement round {}: {}", iteration, outcome);
        match outcome {
            CheckOutcome::Sat => {}
            CheckOutcome::Unsat => return Ok(RefinementOutcome::Infeasible),
            CheckOutcome::Unknown(reason) => return Ok(RefinementOutcome::Indeterminate(reason)),
        }

        let Some(model) = encoder.extract(session) else {
            return Ok(RefinementOutcome::Indeterminate(
                IndeterminateReason::SolverUnknown("model is missing batch variables".to_string()),
            ));
        };

        let conflicts = overlapping_pairs(encoder, &model, limits.overlap_tolerance);
        if conflicts.is_empty() {
            return Ok(RefinementOutcome::Valid(model));
        }

        for (a, b) in conflicts {
            let (lemma, degenerate) = corrective_lemma(encoder, &model, a, b)?;
            if degenerate {
                stats.degenerate_pairs += 1;
            }
            session.assert(&lemma.formula)?;
            stats.refinements += 1;
            lemmas.push(lemma);
        }
    }
}
