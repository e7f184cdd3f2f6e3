//! Plate-size search.
//!
//! Each candidate size is tried in its own scope: a fresh guard literal enables the
//! plate bound, the refinement loop runs with that guard assumed, and the scope is
//! popped afterwards. Lemmas do not depend on the plate size, so they are asserted
//! again at base scope once the scope is gone.

use crate::encoder::{Constraint, Encoder, Model};
use crate::refine::{refine, RefineLimits, RefinementOutcome};
use num_rational::BigRational;
use seqarrange_core::rational::rational_to_f64;
use seqarrange_core::{
    ArrangementStats, ArrangementStatus, Budget, IndeterminateReason, ProgressInfo, Result,
    SearchPolicy,
};
use seqarrange_smt::SolverSession;

/// Verdict for one candidate size.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeVerdict {
    Valid(Model),
    Infeasible,
    Indeterminate(IndeterminateReason),
}

/// Search settings.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub policy: SearchPolicy,
    pub frontier_probe: usize,
    pub limits: RefineLimits,
}

/// Outcome of a size search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Smallest validated size and its model.
    pub best: Option<(BigRational, Model)>,
    /// `Valid(best)`, `Infeasible`, or `Indeterminate` (with `best` preserved).
    pub status: ArrangementStatus,
    /// Lemmas learned over all sizes.
    pub lemmas: Vec<Constraint>,
}

/// Searches `sizes` (given in descending order) for the smallest feasible plate.
pub struct SizeSearch<'s, 'e, S: SolverSession> {
    session: &'s mut S,
    encoder: &'s Encoder<'e>,
    settings: SearchSettings,
    budget: &'s Budget,
    stats: &'s mut ArrangementStats,
    progress: Option<&'s dyn Fn(ProgressInfo)>,
    lemmas: Vec<Constraint>,
    best: Option<(BigRational, Model)>,
}

impl<'s, 'e, S: SolverSession> SizeSearch<'s, 'e, S> {
    pub fn new(
        session: &'s mut S,
        encoder: &'s Encoder<'e>,
        settings: SearchSettings,
        budget: &'s Budget,
        stats: &'s mut ArrangementStats,
    ) -> Self {
        Self {
            session,
            encoder,
            settings,
            budget,
            stats,
            progress: None,
            lemmas: Vec::new(),
            best: None,
        }
    }

    /// Reports every size attempt through `progress`.
    pub fn with_progress(mut self, progress: &'s dyn Fn(ProgressInfo)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Runs the search.
    pub fn run(mut self, sizes: &[BigRational]) -> Result<SearchOutcome> {
        let stopped = match self.settings.policy {
            SearchPolicy::Descending => self.descending(sizes)?,
            SearchPolicy::Bisection => self.bisection(sizes)?,
            SearchPolicy::Exhaustive => self.exhaustive(sizes)?,
        };

        let status = match (stopped, &self.best) {
            (Some(reason), _) => ArrangementStatus::Indeterminate(reason),
            (None, Some((size, _))) => ArrangementStatus::Valid(rational_to_f64(size)),
            (None, None) => ArrangementStatus::Infeasible,
        };
        Ok(SearchOutcome {
            best: self.best,
            status,
            lemmas: self.lemmas,
        })
    }

    /// Walks down until the first failure, then probes below it.
    fn descending(&mut self, sizes: &[BigRational]) -> Result<Option<IndeterminateReason>> {
        for (k, size) in sizes.iter().enumerate() {
            match self.try_size(size)? {
                SizeVerdict::Valid(model) => self.record(size, model),
                SizeVerdict::Infeasible => return self.probe_frontier(sizes, k),
                SizeVerdict::Indeterminate(reason) => return Ok(Some(reason)),
            }
        }
        Ok(None)
    }

    /// Binary search for the last feasible index of `sizes`.
    fn bisection(&mut self, sizes: &[BigRational]) -> Result<Option<IndeterminateReason>> {
        let Some(first) = sizes.first() else {
            return Ok(None);
        };
        match self.try_size(first)? {
            SizeVerdict::Valid(model) => self.record(first, model),
            SizeVerdict::Infeasible => return self.probe_frontier(sizes, 0),
            SizeVerdict::Indeterminate(reason) => return Ok(Some(reason)),
        }

        // sizes[lo] is feasible, sizes[hi] (if in range) is not.
        let (mut lo, mut hi) = (0usize, sizes.len());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            match self.try_size(&sizes[mid])? {
                SizeVerdict::Valid(model) => {
                    self.record(&sizes[mid], model);
                    lo = mid;
                }
                SizeVerdict::Infeasible => hi = mid,
                SizeVerdict::Indeterminate(reason) => return Ok(Some(reason)),
            }
        }
        if hi < sizes.len() {
            return self.probe_frontier(sizes, hi);
        }
        Ok(None)
    }

    /// Tries every size and keeps the smallest valid one.
    fn exhaustive(&mut self, sizes: &[BigRational]) -> Result<Option<IndeterminateReason>> {
        for size in sizes {
            match self.try_size(size)? {
                SizeVerdict::Valid(model) => self.record(size, model),
                SizeVerdict::Infeasible => {}
                SizeVerdict::Indeterminate(reason) => return Ok(Some(reason)),
            }
        }
        Ok(None)
    }

    /// Checks up to `frontier_probe` sizes below the failure at `failed`. A feasible
    /// probe contradicts monotonicity; the rest of the range is then scanned.
    fn probe_frontier(
        &mut self,
        sizes: &[BigRational],
        failed: usize,
    ) -> Result<Option<IndeterminateReason>> {
        let below = &sizes[(failed + 1).min(sizes.len())..];
        let depth = self.settings.frontier_probe.min(below.len());
        for (k, size) in below[..depth].iter().enumerate() {
            match self.try_size(size)? {
                SizeVerdict::Valid(model) => {
                    log::warn!(
                        "size {} is feasible below infeasible size {}; scanning the remaining range",
                        size,
                        sizes[failed]
                    );
                    self.stats.monotonicity_violations += 1;
                    self.record(size, model);
                    return self.exhaustive(&below[k + 1..]);
                }
                SizeVerdict::Infeasible => {}
                SizeVerdict::Indeterminate(reason) => return Ok(Some(reason)),
            }
        }
        Ok(None)
    }

    fn record(&mut self, size: &BigRational, model: Model) {
        let smaller = self.best.as_ref().map_or(true, |(best, _)| size < best);
        if smaller {
            self.best = Some((size.clone(), model));
        }
    }

    /// One size attempt in its own scope.
    pub fn try_size(&mut self, size: &BigRational) -> Result<SizeVerdict> {
        self.stats.sizes_tried += 1;
        if let Some(report) = self.progress {
            report(
                ProgressInfo::new()
                    .with_size(rational_to_f64(size))
                    .with_refinements(self.lemmas.len())
                    .with_phase("size"),
            );
        }

        self.session.push();
        let guard = self.session.declare_bool(&format!("plate<={}", size));
        let plate = self.encoder.plate_constraint(guard, size);
        let mut learned = Vec::new();
        let outcome = match self.session.assert(&plate.formula) {
            Ok(()) => refine(
                self.session,
                self.encoder,
                &[guard],
                self.settings.limits,
                self.budget,
                self.stats,
                &mut learned,
            ),
            Err(e) => Err(e.into()),
        };
        self.session.pop(1)?;
        for lemma in &learned {
            self.session.assert(&lemma.formula)?;
        }
        self.lemmas.extend(learned);

        let verdict = match outcome? {
            RefinementOutcome::Valid(model) => SizeVerdict::Valid(model),
            RefinementOutcome::Infeasible => SizeVerdict::Infeasible,
            RefinementOutcome::Indeterminate(reason) => SizeVerdict::Indeterminate(reason),
        };
        log::debug!(
            "size {}: {}",
            size,
            match &verdict {
                SizeVerdict::Valid(_) => "valid".to_string(),
                SizeVerdict::Infeasible => "infeasible".to_string(),
                SizeVerdict::Indeterminate(reason) => format!("indeterminate ({})", reason),
            }
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ArrangementObject, PreparedObject};
    use seqarrange_core::rational::rational_from_int;
    use seqarrange_core::SolverConfiguration;
    use seqarrange_smt::LraSession;

    fn sizes(range: impl Iterator<Item = i64>) -> Vec<BigRational> {
        range.map(rational_from_int).collect()
    }

    fn settings(policy: SearchPolicy, frontier_probe: usize) -> SearchSettings {
        SearchSettings {
            policy,
            frontier_probe,
            limits: RefineLimits {
                max_iterations: 0,
                overlap_tolerance: 0.0,
            },
        }
    }

    fn squares(n: usize, side: f64) -> Vec<PreparedObject> {
        (0..n)
            .map(|i| {
                ArrangementObject::rectangle(format!("s{}", i), side, side)
                    .prepare()
                    .unwrap()
            })
            .collect()
    }

    fn search(
        objects: &[PreparedObject],
        candidates: &[BigRational],
        settings: SearchSettings,
    ) -> (SearchOutcome, ArrangementStats) {
        let batch: Vec<usize> = (0..objects.len()).collect();
        let mut session = LraSession::new();
        let config = SolverConfiguration::default();
        let encoder = Encoder::new(&mut session, objects, &batch, &[], &config).unwrap();
        for c in encoder.base_constraints() {
            session.assert(&c.formula).unwrap();
        }
        let budget = Budget::unlimited();
        let mut stats = ArrangementStats::default();
        let outcome = SizeSearch::new(&mut session, &encoder, settings, &budget, &mut stats)
            .run(candidates)
            .unwrap();
        assert_eq!(session.depth(), 0);
        (outcome, stats)
    }

    #[test]
    fn test_descending_finds_frontier() {
        // Two 10x10 squares need a 20-wide plate.
        let objects = squares(2, 10.0);
        let (outcome, stats) = search(
            &objects,
            &sizes((10..=40).rev().step_by(5)),
            settings(SearchPolicy::Descending, 0),
        );
        assert_eq!(outcome.status, ArrangementStatus::Valid(20.0));
        assert_eq!(outcome.best.as_ref().map(|(s, _)| s.clone()), Some(rational_from_int(20)));
        // 40, 35, 30, 25, 20 valid; 15 fails.
        assert_eq!(stats.sizes_tried, 6);
    }

    #[test]
    fn test_policies_agree() {
        let objects = squares(3, 10.0);
        let candidates = sizes((10..=40).rev().step_by(5));
        let (descending, _) =
            search(&objects, &candidates, settings(SearchPolicy::Descending, 0));
        let (bisection, bisect_stats) =
            search(&objects, &candidates, settings(SearchPolicy::Bisection, 0));
        let (exhaustive, exhaustive_stats) =
            search(&objects, &candidates, settings(SearchPolicy::Exhaustive, 0));

        assert_eq!(descending.status, ArrangementStatus::Valid(20.0));
        assert_eq!(bisection.status, descending.status);
        assert_eq!(exhaustive.status, descending.status);
        assert!(bisect_stats.sizes_tried < exhaustive_stats.sizes_tried);
        assert_eq!(exhaustive_stats.sizes_tried, candidates.len());
    }

    #[test]
    fn test_infeasible_everywhere() {
        let objects = squares(2, 10.0);
        let (outcome, _) = search(
            &objects,
            &sizes([15, 12, 10].into_iter()),
            settings(SearchPolicy::Descending, 2),
        );
        assert_eq!(outcome.status, ArrangementStatus::Infeasible);
        assert!(outcome.best.is_none());
    }

    #[test]
    fn test_probe_reports_non_monotone_candidates() {
        // A candidate list that is not sorted exposes a feasible size after a failure.
        let objects = squares(2, 10.0);
        let (outcome, stats) = search(
            &objects,
            &sizes([30, 15, 25, 22].into_iter()),
            settings(SearchPolicy::Descending, 1),
        );
        assert_eq!(stats.monotonicity_violations, 1);
        assert_eq!(outcome.status, ArrangementStatus::Valid(22.0));
    }

    #[test]
    fn test_lemmas_survive_scopes() {
        let objects = squares(3, 10.0);
        let (outcome, stats) = search(
            &objects,
            &sizes([60, 30].into_iter()),
            settings(SearchPolicy::Exhaustive, 0),
        );
        assert_eq!(outcome.lemmas.len(), stats.refinements);
        assert!(outcome.lemmas.len() <= 3);
        assert!(outcome.status.is_valid());
    }
}
