//! Arrangement result representation.

use crate::error::{Error, Result};
use crate::rational::{rational_to_f64, BigRational};
use crate::status::ArrangementStatus;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position and start time of one decided object.
///
/// Coordinates are kept exact; the `*_f64` accessors round only for reporting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Object identifier.
    pub id: String,
    /// Index of the object in the caller's input slice.
    pub index: usize,
    /// Translation applied to the contour along x.
    pub x: BigRational,
    /// Translation applied to the contour along y.
    pub y: BigRational,
    /// Processing start time.
    pub t: BigRational,
    /// Batch in which the object was decided.
    pub batch: usize,
}

impl Placement {
    /// Translation as `f64`.
    pub fn position(&self) -> (f64, f64) {
        (rational_to_f64(&self.x), rational_to_f64(&self.y))
    }

    /// Start time as `f64`.
    pub fn start_time(&self) -> f64 {
        rational_to_f64(&self.t)
    }
}

/// Outcome of one batch in the scheduler.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// Original indices of the objects in the batch, in batch-local order.
    pub index_map: Vec<usize>,
    /// Translations per batch-local object (meaningful for decided entries).
    pub positions: Vec<(BigRational, BigRational)>,
    /// Start times per batch-local object.
    pub times: Vec<BigRational>,
    /// Batch-local indices that were validated.
    pub decided: Vec<usize>,
    /// Batch-local indices that were not placed and go back to the queue.
    pub remaining: Vec<usize>,
    /// Plate size the batch was validated at.
    pub size: Option<BigRational>,
    /// Status of the batch's size search.
    pub status: ArrangementStatus,
}

impl Solution {
    /// A solution in which nothing was decided.
    pub fn undecided(index_map: Vec<usize>, status: ArrangementStatus) -> Self {
        let remaining = (0..index_map.len()).collect();
        Self {
            index_map,
            positions: Vec::new(),
            times: Vec::new(),
            decided: Vec::new(),
            remaining,
            size: None,
            status,
        }
    }

    /// Original indices of the decided objects.
    pub fn decided_original(&self) -> Vec<usize> {
        self.decided.iter().map(|&i| self.index_map[i]).collect()
    }

    /// Original indices of the remaining objects.
    pub fn remaining_original(&self) -> Vec<usize> {
        self.remaining.iter().map(|&i| self.index_map[i]).collect()
    }
}

/// Counters collected over a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrangementStats {
    /// Corrective constraints added by the refinement loop.
    pub refinements: usize,
    /// Pairs whose placed contours coincided exactly.
    pub degenerate_pairs: usize,
    /// Solver checks issued.
    pub solver_checks: usize,
    /// Plate sizes attempted.
    pub sizes_tried: usize,
    /// Batches solved.
    pub batches: usize,
    /// Frontier probes that contradicted the monotonicity assumption.
    pub monotonicity_violations: usize,
}

impl ArrangementStats {
    /// Adds another set of counters.
    pub fn absorb(&mut self, other: &ArrangementStats) {
        self.refinements += other.refinements;
        self.degenerate_pairs += other.degenerate_pairs;
        self.solver_checks += other.solver_checks;
        self.sizes_tried += other.sizes_tried;
        self.batches += other.batches;
        self.monotonicity_violations += other.monotonicity_violations;
    }
}

/// Result of an arrangement run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrangementResult {
    /// Decided objects, sorted by input index.
    pub placements: Vec<Placement>,

    /// Input indices of objects that could not be placed.
    pub remaining: Vec<usize>,

    /// Plate size covering every decided object.
    pub plate_size: Option<f64>,

    /// Overall status.
    pub status: ArrangementStatus,

    /// Per-batch solutions in the order they were solved.
    pub batches: Vec<Solution>,

    /// Run counters.
    pub stats: ArrangementStats,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Whether the run was cancelled.
    pub cancelled: bool,
}

impl ArrangementResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every object was decided.
    pub fn all_placed(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Number of decided objects.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Number of objects left unplaced.
    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    /// Returns true if at least one object was decided.
    pub fn is_successful(&self) -> bool {
        !self.placements.is_empty()
    }

    /// Input indices of the decided objects.
    pub fn decided_indices(&self) -> Vec<usize> {
        self.placements.iter().map(|p| p.index).collect()
    }

    /// Placement of the object with the given input index.
    pub fn placement_for(&self, index: usize) -> Option<&Placement> {
        self.placements.iter().find(|p| p.index == index)
    }

    /// Converts non-complete outcomes into the matching error.
    ///
    /// A run with leftover objects maps to `PartialPlacement`, an infeasible run to
    /// `NoFeasibleSize`, and an indeterminate run to its reason.
    pub fn ensure_complete(&self, min_size: f64, max_size: f64) -> Result<()> {
        match &self.status {
            ArrangementStatus::Valid(_) if self.remaining.is_empty() => Ok(()),
            ArrangementStatus::Infeasible if self.placements.is_empty() => {
                Err(Error::NoFeasibleSize {
                    min: min_size,
                    max: max_size,
                })
            }
            ArrangementStatus::Indeterminate(reason) if self.placements.is_empty() => {
                Err(reason.clone().into())
            }
            ArrangementStatus::Pending if self.placements.is_empty() && self.remaining.is_empty() => {
                Ok(())
            }
            _ => Err(Error::PartialPlacement {
                decided: self.placements.len(),
                remaining: self.remaining.len(),
            }),
        }
    }

    /// Builds a compact summary.
    pub fn summary(&self) -> ArrangementSummary {
        ArrangementSummary::from(self)
    }
}

/// Summary statistics for an arrangement result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrangementSummary {
    /// Total objects requested.
    pub total_requested: usize,
    /// Objects decided.
    pub total_placed: usize,
    /// Final plate size (0 when nothing was placed).
    pub plate_size: f64,
    /// Latest start time among decided objects.
    pub last_start: f64,
    /// Status as text.
    pub status: String,
    /// Refinement lemmas added.
    pub refinements: usize,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl From<&ArrangementResult> for ArrangementSummary {
    fn from(result: &ArrangementResult) -> Self {
        let last_start = result
            .batches
            .iter()
            .flat_map(|b| b.decided.iter().map(move |&i| rational_to_f64(&b.times[i])))
            .fold(0.0_f64, f64::max);
        Self {
            total_requested: result.placements.len() + result.remaining.len(),
            total_placed: result.placements.len(),
            plate_size: result.plate_size.unwrap_or(0.0),
            last_start,
            status: result.status.to_string(),
            refinements: result.stats.refinements,
            time_ms: result.computation_time_ms,
        }
    }
}
