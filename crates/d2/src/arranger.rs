//! The 2D arranger.

use crate::object::{ArrangementObject, PreparedObject};
use crate::scheduler::Scheduler;
use crate::validate::validate_with_tolerance;
use seqarrange_core::rational::rational_to_f64;
use seqarrange_core::{
    Arranger, ArrangementResult, ArrangementStatus, Budget, CancelToken, IndeterminateReason,
    Placement, ProgressCallback, ProgressInfo, Result, SolverConfiguration,
};
use std::time::Instant;

/// Places objects on a square plate and schedules their processing.
///
/// ```rust
/// use seqarrange_core::{Arranger, SolverConfiguration};
/// use seqarrange_d2::{ArrangementObject, Arranger2D};
///
/// let objects = vec![
///     ArrangementObject::rectangle("a", 10.0, 10.0),
///     ArrangementObject::rectangle("b", 10.0, 10.0),
/// ];
/// let config = SolverConfiguration::new().with_plate_range(10.0, 40.0);
/// let result = Arranger2D::new(config).arrange(&objects).unwrap();
/// assert!(result.all_placed());
/// assert_eq!(result.plate_size, Some(20.0));
/// ```
pub struct Arranger2D {
    config: SolverConfiguration,
    cancel: CancelToken,
}

impl Arranger2D {
    /// Creates an arranger with the given configuration.
    pub fn new(config: SolverConfiguration) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Creates an arranger with the default configuration.
    pub fn default_config() -> Self {
        Self::new(SolverConfiguration::default())
    }

    pub fn config(&self) -> &SolverConfiguration {
        &self.config
    }

    /// A handle that cancels runs of this arranger from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn budget(&self) -> Budget {
        Budget::unlimited()
            .with_time_limit_ms(self.config.time_limit_ms)
            .with_max_conflicts(self.config.max_conflicts)
            .with_max_pivots(self.config.max_pivots)
            .with_cancel(self.cancel.clone())
    }

    fn run(
        &self,
        objects: &[ArrangementObject],
        progress: Option<&dyn Fn(ProgressInfo)>,
    ) -> Result<ArrangementResult> {
        self.config.validate()?;
        let prepared = objects
            .iter()
            .map(ArrangementObject::prepare)
            .collect::<Result<Vec<PreparedObject>>>()?;

        // Reset cancellation flag
        self.cancel.reset();
        let start = Instant::now();
        let budget = self.budget();
        log::info!(
            "arranging {} objects (plate {}..{}, batch size {}, {} search)",
            objects.len(),
            self.config.min_size,
            self.config.max_size,
            self.config.batch_size,
            self.config.search_policy
        );

        let forward = |info: ProgressInfo| {
            if let Some(report) = progress {
                report(info.with_elapsed(start.elapsed().as_millis() as u64));
            }
        };
        let mut scheduler = Scheduler::new(&prepared, &self.config, &budget);
        if progress.is_some() {
            scheduler = scheduler.with_progress(&forward);
        }
        let outcome = scheduler.run()?;

        let mut placements: Vec<Placement> = outcome
            .fixed
            .iter()
            .zip(&outcome.fixed_batch)
            .map(|(f, &batch)| Placement {
                id: prepared[f.index].id.clone(),
                index: f.index,
                x: f.position.0.clone(),
                y: f.position.1.clone(),
                t: f.start.clone(),
                batch,
            })
            .collect();
        placements.sort_by_key(|p| p.index);

        let cancelled = matches!(
            outcome.status,
            ArrangementStatus::Indeterminate(IndeterminateReason::Cancelled)
        );
        let result = ArrangementResult {
            placements,
            remaining: outcome.remaining,
            plate_size: outcome.plate_size.as_ref().map(rational_to_f64),
            status: outcome.status,
            batches: outcome.solutions,
            stats: outcome.stats,
            computation_time_ms: start.elapsed().as_millis() as u64,
            cancelled,
        };
        log::info!(
            "{}: {} placed, {} remaining, {} lemmas in {} ms",
            result.status,
            result.placements.len(),
            result.remaining.len(),
            result.stats.refinements,
            result.computation_time_ms
        );

        if cfg!(debug_assertions) {
            match validate_with_tolerance(objects, &result, self.config.overlap_tolerance) {
                Ok(report) if !report.is_valid() => log::error!(
                    "arrangement failed validation with {} violations",
                    report.violations.len()
                ),
                Err(e) => log::error!("arrangement could not be validated: {}", e),
                Ok(_) => {}
            }
        }
        Ok(result)
    }
}

impl Arranger for Arranger2D {
    type Object = ArrangementObject;

    fn arrange(&self, objects: &[Self::Object]) -> Result<ArrangementResult> {
        self.run(objects, None)
    }

    fn arrange_with_progress(
        &self,
        objects: &[Self::Object],
        callback: ProgressCallback,
    ) -> Result<ArrangementResult> {
        self.run(objects, Some(callback.as_ref()))
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_arrangement;
    use seqarrange_core::Error;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_simple_arrangement() {
        let objects = vec![
            ArrangementObject::rectangle("a", 10.0, 10.0),
            ArrangementObject::rectangle("b", 10.0, 10.0).with_duration(2.0),
            ArrangementObject::rectangle("c", 10.0, 10.0),
        ];
        let arranger = Arranger2D::new(SolverConfiguration::new().with_plate_range(10.0, 50.0));
        let result = arranger.arrange(&objects).unwrap();

        assert!(result.all_placed());
        assert_eq!(result.status, ArrangementStatus::Valid(20.0));
        assert_eq!(result.decided_indices(), vec![0, 1, 2]);
        assert!(!result.cancelled);
        assert!(validate_arrangement(&objects, &result).unwrap().is_valid());
    }

    #[test]
    fn test_empty_input_is_pending() {
        let result = Arranger2D::default_config().arrange(&[]).unwrap();
        assert_eq!(result.status, ArrangementStatus::Pending);
        assert!(result.placements.is_empty());
        assert!(result.ensure_complete(10.0, 200.0).is_ok());
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let bad = vec![ArrangementObject::new("empty")];
        assert!(matches!(
            Arranger2D::default_config().arrange(&bad),
            Err(Error::InvalidGeometry(_))
        ));

        let objects = vec![ArrangementObject::rectangle("a", 1.0, 1.0)];
        let config = SolverConfiguration::new().with_plate_range(50.0, 10.0);
        assert!(matches!(
            Arranger2D::new(config).arrange(&objects),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_infeasible_maps_to_status() {
        let objects = vec![ArrangementObject::rectangle("big", 300.0, 300.0)];
        let result = Arranger2D::default_config().arrange(&objects).unwrap();
        assert_eq!(result.status, ArrangementStatus::Infeasible);
        assert_eq!(result.remaining, vec![0]);
        assert!(matches!(
            result.ensure_complete(10.0, 200.0),
            Err(Error::NoFeasibleSize { .. })
        ));
    }

    #[test]
    fn test_cancel_before_run_is_cleared() {
        let arranger = Arranger2D::new(SolverConfiguration::new().with_plate_range(10.0, 30.0));
        arranger.cancel();
        let objects = vec![ArrangementObject::rectangle("a", 10.0, 10.0)];
        let result = arranger.arrange(&objects).unwrap();
        assert!(result.all_placed());
        assert!(!result.cancelled);
    }

    #[test]
    fn test_progress_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |info: ProgressInfo| {
            if let Ok(mut phases) = sink.lock() {
                phases.push((info.phase.clone(), info.running));
            }
        });
        let objects = vec![
            ArrangementObject::rectangle("a", 10.0, 10.0),
            ArrangementObject::rectangle("b", 10.0, 10.0),
        ];
        let arranger = Arranger2D::new(SolverConfiguration::new().with_plate_range(10.0, 30.0));
        let result = arranger.arrange_with_progress(&objects, callback).unwrap();
        assert!(result.all_placed());

        let phases = seen.lock().unwrap();
        assert!(phases.iter().any(|(p, _)| p == "batch"));
        assert!(phases.iter().any(|(p, _)| p == "size"));
        assert_eq!(phases.last(), Some(&("done".to_string(), false)));
    }
}
