//! Benchmark runner for synthetic datasets.

use crate::error::Result;
use crate::result::{BenchmarkResult, PlacementInfo, RunResult};
use crate::synthetic::Dataset;
use instant::Instant;
use seqarrange_core::{Arranger, SearchPolicy, SolverConfiguration};
use seqarrange_d2::{validate_arrangement, ArrangementResult, Arranger2D};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for benchmark runs.
///
/// Can be loaded from TOML; missing keys keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Search policies to benchmark.
    pub policies: Vec<SearchPolicy>,
    /// Smallest plate size tried.
    pub min_size: f64,
    /// Largest plate size tried.
    pub max_size: f64,
    /// Decrement between candidate sizes.
    pub size_step: f64,
    /// Objects solved jointly per batch.
    pub batch_size: usize,
    /// Time limit per run in milliseconds.
    pub time_limit_ms: u64,
    /// Refinement cap per plate size.
    pub max_refinements: usize,
    /// Number of runs per configuration.
    pub runs_per_config: usize,
    /// Keep placements in the results.
    pub record_placements: bool,
    /// Whether to print progress.
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            policies: vec![SearchPolicy::Descending, SearchPolicy::Bisection],
            min_size: 10.0,
            max_size: 200.0,
            size_step: 5.0,
            batch_size: 8,
            time_limit_ms: 60_000,
            max_refinements: 10_000,
            runs_per_config: 1,
            record_placements: false,
            show_progress: true,
        }
    }
}

impl BenchmarkConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Sets the policies to benchmark.
    pub fn with_policies(mut self, policies: Vec<SearchPolicy>) -> Self {
        self.policies = policies;
        self
    }

    /// Sets the time limit per run.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    /// Sets the number of runs per configuration.
    pub fn with_runs_per_config(mut self, n: usize) -> Self {
        self.runs_per_config = n.max(1);
        self
    }

    /// Quick preset: descending search, short time limit.
    pub fn quick() -> Self {
        Self {
            policies: vec![SearchPolicy::Descending],
            time_limit_ms: 5_000,
            ..Self::default()
        }
    }

    /// Standard preset: every policy, three runs each.
    pub fn standard() -> Self {
        Self {
            policies: vec![
                SearchPolicy::Descending,
                SearchPolicy::Bisection,
                SearchPolicy::Exhaustive,
            ],
            runs_per_config: 3,
            ..Self::default()
        }
    }

    fn solver_config(&self, policy: SearchPolicy) -> SolverConfiguration {
        SolverConfiguration::new()
            .with_plate_range(self.min_size, self.max_size)
            .with_size_step(self.size_step)
            .with_batch_size(self.batch_size)
            .with_time_limit(self.time_limit_ms)
            .with_max_refinements(self.max_refinements)
            .with_search_policy(policy)
    }
}

/// Benchmark runner.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    /// Creates a new benchmark runner.
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Runs every configured policy on one dataset.
    pub fn run_dataset(&self, dataset: &Dataset) -> BenchmarkResult {
        let mut results = BenchmarkResult::new();

        if self.config.show_progress {
            println!("\nBenchmarking dataset: {}", dataset.name);
            println!("  Objects: {}", dataset.objects.len());
            println!("  Area lower bound: {:.2}", dataset.area_lower_bound());
            println!("  Total duration: {}", dataset.total_duration());
        }

        for &policy in &self.config.policies {
            if self.config.show_progress {
                println!("  Running {}...", policy);
            }
            for run_idx in 0..self.config.runs_per_config {
                let run = self.run_once(dataset, policy);
                if self.config.show_progress {
                    println!(
                        "    Run {}: {} size={} placed={}/{} lemmas={} time={}ms",
                        run_idx + 1,
                        run.status,
                        run.plate_size
                            .map_or("-".to_string(), |s| format!("{:.2}", s)),
                        run.objects_placed,
                        run.total_objects,
                        run.refinements,
                        run.time_ms
                    );
                }
                results.add_run(run);
            }
        }

        results
    }

    /// Runs a single arrangement and validates it.
    pub fn run_once(&self, dataset: &Dataset, policy: SearchPolicy) -> RunResult {
        let record = RunResult::new(&dataset.name, policy.to_string(), dataset.objects.len());
        let arranger = Arranger2D::new(self.config.solver_config(policy));

        let start = Instant::now();
        let arranged = arranger.arrange(&dataset.objects);
        let elapsed = start.elapsed().as_millis() as u64;

        let result = match arranged {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{} with {} failed: {}", dataset.name, policy, e);
                let mut failed = record.failed(e);
                failed.time_ms = elapsed;
                return failed;
            }
        };

        let mut record = self.record(record, dataset, &result);
        record.time_ms = elapsed;
        match validate_arrangement(&dataset.objects, &result) {
            Ok(report) => {
                record.valid = report.is_valid();
                record.violations = report.violations.len();
                if !report.is_valid() {
                    log::error!(
                        "{} with {}: {} violations",
                        dataset.name,
                        policy,
                        report.violations.len()
                    );
                }
            }
            Err(e) => record.error = Some(e.to_string()),
        }

        match dataset.best_known {
            Some(best) => record.with_best_known(best),
            None => record,
        }
    }

    fn record(&self, mut run: RunResult, dataset: &Dataset, result: &ArrangementResult) -> RunResult {
        run.status = result.status.to_string();
        run.plate_size = result.plate_size;
        run.objects_placed = result.placed_count();
        run.refinements = result.stats.refinements;
        run.sizes_tried = result.stats.sizes_tried;
        run.batches = result.stats.batches;

        let placed_area: f64 = result
            .placements
            .iter()
            .map(|p| dataset.objects[p.index].area())
            .sum();
        run.density = match result.plate_size {
            Some(size) if size > 0.0 => placed_area / (size * size),
            _ => 0.0,
        };
        run.makespan = result
            .placements
            .iter()
            .map(|p| p.start_time() + dataset.objects[p.index].duration())
            .fold(0.0, f64::max);

        if self.config.record_placements {
            let placements = result
                .placements
                .iter()
                .map(|p| {
                    let (x, y) = p.position();
                    PlacementInfo {
                        object_id: p.id.clone(),
                        position: [x, y],
                        start_time: p.start_time(),
                        batch: p.batch,
                    }
                })
                .collect();
            run = run.with_placements(placements);
        }
        run
    }
}
