//! Arranger trait and configuration.

use crate::error::{Error, Result};
use crate::result::ArrangementResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Order in which candidate plate sizes are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchPolicy {
    /// Walk down from `max_size` in `size_step` decrements; stop at the first failure.
    #[default]
    Descending,
    /// Bisect the candidate list; relies on the feasibility frontier being monotonic.
    Bisection,
    /// Try every candidate size and keep the smallest valid one.
    Exhaustive,
}

impl std::fmt::Display for SearchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Descending => write!(f, "Descending"),
            Self::Bisection => write!(f, "Bisection"),
            Self::Exhaustive => write!(f, "Exhaustive"),
        }
    }
}

/// Configuration for an arrangement run.
///
/// Plate sizes are side lengths of the square plate `[0, size] x [0, size]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfiguration {
    /// Smallest plate size to try.
    pub min_size: f64,

    /// Largest plate size to try.
    pub max_size: f64,

    /// Decrement between consecutive candidate sizes.
    pub size_step: f64,

    /// Upper bound on `t + duration` for every object.
    /// `None` derives the horizon from the durations of the objects being solved.
    pub time_horizon: Option<f64>,

    /// Maximum number of objects solved jointly by the batch scheduler.
    pub batch_size: usize,

    /// Maximum refinement iterations per plate size (0 = unlimited).
    pub max_refinements: usize,

    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Conflict cap per solver check (0 = unlimited).
    pub max_conflicts: u64,

    /// Simplex pivot cap per solver check (0 = unlimited).
    pub max_pivots: u64,

    /// Plate-size search policy.
    pub search_policy: SearchPolicy,

    /// Number of additional sizes probed below the first failing size.
    /// A feasible probe means the frontier is not monotonic; the search then falls back
    /// to an exhaustive scan of the remaining range.
    pub frontier_probe: usize,

    /// Intersection area below which two contours are not considered overlapping.
    pub overlap_tolerance: f64,

    /// Fraction (0, 1] of each bounding box used by the weak non-overlap relaxation.
    /// 1.0 uses the full bounding box.
    pub weak_extent_ratio: f64,

    /// When true every pair of objects is processed in disjoint time windows.
    pub exclusive_processing: bool,
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self {
            min_size: 10.0,
            max_size: 200.0,
            size_step: 10.0,
            time_horizon: None,
            batch_size: 16,
            max_refinements: 10_000,
            time_limit_ms: 60_000,
            max_conflicts: 0,
            max_pivots: 0,
            search_policy: SearchPolicy::default(),
            frontier_probe: 0,
            overlap_tolerance: 0.0,
            weak_extent_ratio: 0.5,
            exclusive_processing: true,
        }
    }
}

impl SolverConfiguration {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plate size range.
    pub fn with_plate_range(mut self, min_size: f64, max_size: f64) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Sets the size decrement.
    pub fn with_size_step(mut self, step: f64) -> Self {
        self.size_step = step;
        self
    }

    /// Sets an explicit time horizon.
    pub fn with_time_horizon(mut self, horizon: f64) -> Self {
        self.time_horizon = Some(horizon);
        self
    }

    /// Sets the batch size threshold.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    /// Sets the refinement iteration cap.
    pub fn with_max_refinements(mut self, n: usize) -> Self {
        self.max_refinements = n;
        self
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the conflict cap per check.
    pub fn with_max_conflicts(mut self, n: u64) -> Self {
        self.max_conflicts = n;
        self
    }

    /// Sets the pivot cap per check.
    pub fn with_max_pivots(mut self, n: u64) -> Self {
        self.max_pivots = n;
        self
    }

    /// Sets the search policy.
    pub fn with_search_policy(mut self, policy: SearchPolicy) -> Self {
        self.search_policy = policy;
        self
    }

    /// Sets the frontier probe depth.
    pub fn with_frontier_probe(mut self, k: usize) -> Self {
        self.frontier_probe = k;
        self
    }

    /// Sets the overlap area tolerance.
    pub fn with_overlap_tolerance(mut self, tolerance: f64) -> Self {
        self.overlap_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the weak relaxation extent ratio.
    pub fn with_weak_extent_ratio(mut self, ratio: f64) -> Self {
        self.weak_extent_ratio = ratio.clamp(f64::MIN_POSITIVE, 1.0);
        self
    }

    /// Enables or disables exclusive (one-at-a-time) processing.
    pub fn with_exclusive_processing(mut self, exclusive: bool) -> Self {
        self.exclusive_processing = exclusive;
        self
    }

    /// Checks the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_size, self.max_size, self.size_step];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig(
                "plate sizes and step must be finite".to_string(),
            ));
        }
        if self.min_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_size must be positive, got {}",
                self.min_size
            )));
        }
        if self.max_size < self.min_size {
            return Err(Error::InvalidConfig(format!(
                "max_size {} is smaller than min_size {}",
                self.max_size, self.min_size
            )));
        }
        if self.size_step <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "size_step must be positive, got {}",
                self.size_step
            )));
        }
        if let Some(h) = self.time_horizon {
            if !h.is_finite() || h <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "time_horizon must be positive, got {}",
                    h
                )));
            }
        }
        if !(self.weak_extent_ratio > 0.0 && self.weak_extent_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "weak_extent_ratio must be in (0, 1], got {}",
                self.weak_extent_ratio
            )));
        }
        if !self.overlap_tolerance.is_finite() || self.overlap_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "overlap_tolerance must be non-negative, got {}",
                self.overlap_tolerance
            )));
        }
        Ok(())
    }

    /// Candidate plate sizes from `max_size` down to `min_size`.
    ///
    /// `min_size` is included only if it lies on the step grid.
    pub fn candidate_sizes(&self) -> Vec<f64> {
        self.candidate_sizes_from(self.min_size)
    }

    /// Candidate sizes with a raised lower limit (used when earlier batches already
    /// occupy part of the plate).
    pub fn candidate_sizes_from(&self, floor: f64) -> Vec<f64> {
        let floor = floor.max(self.min_size);
        let mut sizes = Vec::new();
        if self.size_step <= 0.0 || self.max_size < floor {
            return sizes;
        }
        let mut k = 0u64;
        loop {
            let size = self.max_size - k as f64 * self.size_step;
            // Tolerate accumulated rounding when the grid lands on the floor.
            if size < floor - self.size_step * 1e-9 {
                break;
            }
            sizes.push(size.max(floor));
            k += 1;
        }
        sizes
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information during arrangement.
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    /// Current batch number (0-based).
    pub batch: usize,
    /// Plate size currently being tried.
    pub size: f64,
    /// Refinement lemmas added so far in this batch.
    pub refinements: usize,
    /// Number of objects decided so far.
    pub items_placed: usize,
    /// Total number of objects.
    pub total_items: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase description.
    pub phase: String,
    /// Whether the arranger is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the batch number.
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }

    /// Sets the plate size being tried.
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Sets the refinement count.
    pub fn with_refinements(mut self, n: usize) -> Self {
        self.refinements = n;
        self
    }

    /// Sets the items placed info.
    pub fn with_items(mut self, placed: usize, total: usize) -> Self {
        self.items_placed = placed;
        self.total_items = total;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the arranger as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Fraction of objects decided (0.0 to 1.0).
    pub fn progress_percent(&self) -> f64 {
        if self.total_items > 0 {
            self.items_placed as f64 / self.total_items as f64
        } else {
            0.0
        }
    }
}

/// Trait for arrangement engines.
pub trait Arranger {
    /// The object type this arranger places.
    type Object;

    /// Arranges the objects.
    fn arrange(&self, objects: &[Self::Object]) -> Result<ArrangementResult>;

    /// Arranges the objects, reporting progress through `callback`.
    fn arrange_with_progress(
        &self,
        objects: &[Self::Object],
        callback: ProgressCallback,
    ) -> Result<ArrangementResult>;

    /// Cancels an ongoing arrangement.
    fn cancel(&self);
}
