//! Batch decomposition.
//!
//! Large object sets are solved in bounded batches. Each batch gets its own solver
//! session, is arranged against the objects decided so far, and is committed as a
//! whole. Batches that cannot be arranged are halved; single objects that still
//! fail are retried in the next pass.

use crate::encoder::{Encoder, FixedObject, Model};
use crate::object::PreparedObject;
use crate::refine::RefineLimits;
use crate::search::{SearchSettings, SizeSearch};
use num_rational::BigRational;
use num_traits::Zero;
use seqarrange_core::rational::{max_ref, rational_from_f64, rational_to_f64};
use seqarrange_core::{
    ArrangementStats, ArrangementStatus, Budget, IndeterminateReason, ProgressInfo, Result,
    Solution, SolverConfiguration,
};
use seqarrange_smt::{LraSession, SolverSession};
use std::collections::VecDeque;

/// Everything the scheduler decided.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    /// Batch attempts in solving order (including the ones that decided nothing).
    pub solutions: Vec<Solution>,
    /// Decided objects in commit order.
    pub fixed: Vec<FixedObject>,
    /// Batch number (index into `solutions`) for every entry of `fixed`.
    pub fixed_batch: Vec<usize>,
    /// Input indices left undecided.
    pub remaining: Vec<usize>,
    /// Smallest plate covering every decided object.
    pub plate_size: Option<BigRational>,
    /// Overall status.
    pub status: ArrangementStatus,
    pub stats: ArrangementStats,
}

enum BatchVerdict {
    Decided { size: BigRational, model: Model },
    Failed(ArrangementStatus),
}

/// Runs batches over a prepared object set.
pub struct Scheduler<'a> {
    objects: &'a [PreparedObject],
    config: &'a SolverConfiguration,
    budget: &'a Budget,
    progress: Option<&'a dyn Fn(ProgressInfo)>,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        objects: &'a [PreparedObject],
        config: &'a SolverConfiguration,
        budget: &'a Budget,
    ) -> Self {
        Self {
            objects,
            config,
            budget,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn Fn(ProgressInfo)) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, info: ProgressInfo) {
        if let Some(report) = self.progress {
            report(info);
        }
    }

    /// Decides as many objects as possible.
    pub fn run(&self) -> Result<ScheduleOutcome> {
        let total = self.objects.len();
        let batch_size = self.config.batch_size.max(1);
        let mut outcome = ScheduleOutcome {
            solutions: Vec::new(),
            fixed: Vec::new(),
            fixed_batch: Vec::new(),
            remaining: Vec::new(),
            plate_size: None,
            status: ArrangementStatus::Pending,
            stats: ArrangementStats::default(),
        };

        let mut pending: VecDeque<usize> = (0..total).collect();
        let mut last_failure = ArrangementStatus::Infeasible;
        let mut pass = 0usize;

        loop {
            pass += 1;
            let mut split: VecDeque<Vec<usize>> = VecDeque::new();
            let mut deferred = Vec::new();
            let mut progressed = false;
            log::info!("pass {}: {} objects queued", pass, pending.len());

            loop {
                let group = match split.pop_front() {
                    Some(group) => group,
                    None if !pending.is_empty() => {
                        let take = batch_size.min(pending.len());
                        pending.drain(..take).collect()
                    }
                    None => break,
                };

                let batch_no = outcome.solutions.len();
                self.report(
                    ProgressInfo::new()
                        .with_batch(batch_no)
                        .with_items(outcome.fixed.len(), total)
                        .with_phase("batch"),
                );

                match self.solve_batch(&group, &outcome.fixed, &mut outcome.stats)? {
                    BatchVerdict::Decided { size, model } => {
                        log::info!(
                            "batch {}: {} objects decided at size {}",
                            batch_no,
                            group.len(),
                            rational_to_f64(&size)
                        );
                        for (k, &index) in group.iter().enumerate() {
                            outcome.fixed.push(FixedObject {
                                index,
                                position: model.positions[k].clone(),
                                start: model.times[k].clone(),
                            });
                            outcome.fixed_batch.push(batch_no);
                        }
                        outcome.plate_size = Some(match outcome.plate_size.take() {
                            Some(current) => max_ref(&current, &size).clone(),
                            None => size.clone(),
                        });
                        outcome.solutions.push(Solution {
                            decided: (0..group.len()).collect(),
                            remaining: Vec::new(),
                            positions: model.positions,
                            times: model.times,
                            index_map: group,
                            status: ArrangementStatus::Valid(rational_to_f64(&size)),
                            size: Some(size),
                        });
                        outcome.stats.batches += 1;
                        progressed = true;
                    }
                    BatchVerdict::Failed(ArrangementStatus::Indeterminate(reason)) => {
                        log::warn!("batch {} stopped: {}", batch_no, reason);
                        let status = ArrangementStatus::Indeterminate(reason);
                        outcome
                            .solutions
                            .push(Solution::undecided(group.clone(), status.clone()));
                        outcome.remaining = group
                            .into_iter()
                            .chain(split.into_iter().flatten())
                            .chain(pending)
                            .chain(deferred)
                            .collect();
                        outcome.remaining.sort_unstable();
                        outcome.status = status;
                        return Ok(outcome);
                    }
                    BatchVerdict::Failed(status) => {
                        outcome
                            .solutions
                            .push(Solution::undecided(group.clone(), status.clone()));
                        last_failure = status;
                        if group.len() > 1 {
                            let (left, right) = group.split_at(group.len() / 2);
                            log::debug!(
                                "batch {} infeasible; splitting into {} + {}",
                                batch_no,
                                left.len(),
                                right.len()
                            );
                            split.push_front(right.to_vec());
                            split.push_front(left.to_vec());
                        } else {
                            log::debug!("object {} deferred to the next pass", group[0]);
                            deferred.extend(group);
                        }
                    }
                }
            }

            if deferred.is_empty() {
                break;
            }
            if !progressed {
                log::warn!(
                    "no progress in pass {}; {} objects left unplaced",
                    pass,
                    deferred.len()
                );
                outcome.remaining = deferred;
                break;
            }
            pending = deferred.into_iter().collect();
        }

        outcome.remaining.sort_unstable();
        outcome.status = match &outcome.plate_size {
            Some(size) => ArrangementStatus::Valid(rational_to_f64(size)),
            None if total == 0 => ArrangementStatus::Pending,
            None => last_failure,
        };
        self.report(
            ProgressInfo::new()
                .with_batch(outcome.solutions.len())
                .with_items(outcome.fixed.len(), total)
                .with_phase("done")
                .finished(),
        );
        Ok(outcome)
    }

    /// Extent of the decided objects along either axis.
    fn fixed_extent(&self, fixed: &[FixedObject]) -> BigRational {
        let mut extent = BigRational::zero();
        for f in fixed {
            let bbox = self.objects[f.index].bbox();
            let right = &f.position.0 + &bbox.max_x;
            let top = &f.position.1 + &bbox.max_y;
            extent = max_ref(&extent, max_ref(&right, &top)).clone();
        }
        extent
    }

    /// Candidate sizes for a batch: the configured grid, never below the extent of
    /// what is already fixed.
    fn candidate_sizes(&self, fixed: &[FixedObject]) -> Result<Vec<BigRational>> {
        let floor = self.fixed_extent(fixed);
        let mut sizes = Vec::new();
        for size in self.config.candidate_sizes_from(rational_to_f64(&floor)) {
            let exact = rational_from_f64(size)?;
            if exact >= floor && sizes.last() != Some(&exact) {
                sizes.push(exact);
            }
        }
        Ok(sizes)
    }

    fn solve_batch(
        &self,
        group: &[usize],
        fixed: &[FixedObject],
        stats: &mut ArrangementStats,
    ) -> Result<BatchVerdict> {
        if let Some(reason) = self.budget.exhausted() {
            return Ok(BatchVerdict::Failed(ArrangementStatus::Indeterminate(reason)));
        }
        let sizes = self.candidate_sizes(fixed)?;
        if sizes.is_empty() {
            return Ok(BatchVerdict::Failed(ArrangementStatus::Infeasible));
        }

        let mut session = LraSession::new();
        let encoder = Encoder::new(&mut session, self.objects, group, fixed, self.config)?;
        let base = encoder.base_constraints();
        log::debug!(
            "batch of {} against {} fixed: {} constraints",
            group.len(),
            fixed.len(),
            base.len()
        );
        for constraint in &base {
            session.assert(&constraint.formula)?;
        }

        let settings = SearchSettings {
            policy: self.config.search_policy,
            frontier_probe: self.config.frontier_probe,
            limits: RefineLimits {
                max_iterations: self.config.max_refinements,
                overlap_tolerance: self.config.overlap_tolerance,
            },
        };
        let mut search = SizeSearch::new(&mut session, &encoder, settings, self.budget, stats);
        if let Some(progress) = self.progress {
            search = search.with_progress(progress);
        }
        let found = search.run(&sizes)?;
        log::debug!(
            "batch search: {} ({} lemmas)",
            found.status,
            found.lemmas.len()
        );

        match (found.best, found.status) {
            // A cancelled batch is discarded even if a size was validated.
            (_, ArrangementStatus::Indeterminate(IndeterminateReason::Cancelled)) => Ok(
                BatchVerdict::Failed(ArrangementStatus::Indeterminate(
                    IndeterminateReason::Cancelled,
                )),
            ),
            (Some((size, model)), status) => {
                if let ArrangementStatus::Indeterminate(reason) = &status {
                    log::warn!(
                        "size search stopped early ({}); keeping size {}",
                        reason,
                        rational_to_f64(&size)
                    );
                }
                debug_assert!(encoder.extent(&model) <= size);
                debug_assert!(model.positions.len() == encoder.len());
                Ok(BatchVerdict::Decided { size, model })
            }
            (None, status) => Ok(BatchVerdict::Failed(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ArrangementObject;

    fn prepared(objects: &[ArrangementObject]) -> Vec<PreparedObject> {
        objects.iter().map(|o| o.prepare().unwrap()).collect()
    }

    #[test]
    fn test_batches_are_committed_in_order() {
        let objects = prepared(
            &(0..6)
                .map(|i| ArrangementObject::rectangle(format!("r{}", i), 10.0, 10.0))
                .collect::<Vec<_>>(),
        );
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 60.0)
            .with_batch_size(3);
        let budget = Budget::unlimited();
        let outcome = Scheduler::new(&objects, &config, &budget).run().unwrap();

        assert!(outcome.remaining.is_empty());
        assert_eq!(outcome.fixed.len(), 6);
        assert_eq!(outcome.stats.batches, 2);
        assert_eq!(outcome.fixed_batch, vec![0, 0, 0, 1, 1, 1]);
        assert!(outcome.status.is_valid());

        // The second batch starts after the first one is processed.
        let first_end = outcome.fixed[..3]
            .iter()
            .map(|f| &f.start + &objects[f.index].duration)
            .max()
            .unwrap();
        assert!(outcome.fixed[3..].iter().all(|f| f.start >= first_end));
    }

    #[test]
    fn test_oversized_object_is_left_over() {
        let objects = prepared(&[
            ArrangementObject::rectangle("small", 10.0, 10.0),
            ArrangementObject::rectangle("huge", 500.0, 10.0),
            ArrangementObject::rectangle("small2", 10.0, 10.0),
        ]);
        let config = SolverConfiguration::new()
            .with_plate_range(10.0, 50.0)
            .with_batch_size(3);
        let budget = Budget::unlimited();
        let outcome = Scheduler::new(&objects, &config, &budget).run().unwrap();

        assert_eq!(outcome.remaining, vec![1]);
        assert_eq!(outcome.fixed.len(), 2);
        assert!(outcome.status.is_valid());
        assert!(outcome
            .solutions
            .iter()
            .any(|s| s.status.is_infeasible() && s.index_map == vec![0, 1, 2]));
    }

    #[test]
    fn test_all_infeasible() {
        let objects = prepared(&[ArrangementObject::rectangle("huge", 500.0, 500.0)]);
        let config = SolverConfiguration::new().with_plate_range(10.0, 50.0);
        let budget = Budget::unlimited();
        let outcome = Scheduler::new(&objects, &config, &budget).run().unwrap();
        assert_eq!(outcome.remaining, vec![0]);
        assert_eq!(outcome.status, ArrangementStatus::Infeasible);
        assert!(outcome.plate_size.is_none());
    }

    #[test]
    fn test_empty_input() {
        let config = SolverConfiguration::default();
        let budget = Budget::unlimited();
        let outcome = Scheduler::new(&[], &config, &budget).run().unwrap();
        assert_eq!(outcome.status, ArrangementStatus::Pending);
        assert!(outcome.solutions.is_empty());
    }
}
