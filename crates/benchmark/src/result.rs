//! Benchmark result types and recording.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Placement info for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementInfo {
    pub object_id: String,
    pub position: [f64; 2],
    pub start_time: f64,
    pub batch: usize,
}

/// Result of a single benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Dataset name
    pub dataset: String,
    /// Search policy used
    pub policy: String,
    /// Arrangement status as text
    pub status: String,
    /// Plate size reached, if any object was placed
    pub plate_size: Option<f64>,
    /// Objects decided
    pub objects_placed: usize,
    /// Objects in the dataset
    pub total_objects: usize,
    /// Footprint area over plate area
    pub density: f64,
    /// Latest processing end among decided objects
    pub makespan: f64,
    /// Refinement lemmas added
    pub refinements: usize,
    /// Plate sizes attempted
    pub sizes_tried: usize,
    /// Scheduler batches
    pub batches: usize,
    /// Computation time in milliseconds
    pub time_ms: u64,
    /// Whether the independent validation found no violation
    pub valid: bool,
    /// Number of violations reported by validation
    pub violations: usize,
    /// Best known plate size for comparison
    pub best_known: Option<f64>,
    /// Gap from best known (percentage)
    pub gap_percent: Option<f64>,
    /// Error message when the arranger failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Placements (optional, for visualization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<Vec<PlacementInfo>>,
}

impl RunResult {
    /// Creates an empty run record.
    pub fn new(dataset: impl Into<String>, policy: impl Into<String>, total_objects: usize) -> Self {
        Self {
            dataset: dataset.into(),
            policy: policy.into(),
            status: String::new(),
            plate_size: None,
            objects_placed: 0,
            total_objects,
            density: 0.0,
            makespan: 0.0,
            refinements: 0,
            sizes_tried: 0,
            batches: 0,
            time_ms: 0,
            valid: false,
            violations: 0,
            best_known: None,
            gap_percent: None,
            error: None,
            placements: None,
        }
    }

    /// Records a failed run.
    pub fn failed(mut self, error: impl ToString) -> Self {
        self.status = "Error".to_string();
        self.error = Some(error.to_string());
        self
    }

    /// Sets the best known size and computes the gap.
    pub fn with_best_known(mut self, best: f64) -> Self {
        self.best_known = Some(best);
        if let Some(size) = self.plate_size {
            if best > 0.0 {
                self.gap_percent = Some((size - best) / best * 100.0);
            }
        }
        self
    }

    /// Sets the placements for visualization.
    pub fn with_placements(mut self, placements: Vec<PlacementInfo>) -> Self {
        self.placements = Some(placements);
        self
    }

    /// True when every object was placed and validation passed.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.valid && self.objects_placed == self.total_objects
    }
}

/// Collection of benchmark results.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Individual run results
    pub runs: Vec<RunResult>,
    /// Seconds since the Unix epoch when the collection was created
    pub timestamp: u64,
    /// Additional metadata
    pub metadata: BenchmarkMetadata,
}

/// Metadata about the benchmark run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BenchmarkMetadata {
    /// Crate version
    pub version: String,
    /// Seed of the synthetic generator
    pub seed: Option<u64>,
    /// Configuration used, as TOML
    pub config: String,
}

/// Per-policy aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySummary {
    pub policy: String,
    pub run_count: usize,
    pub complete_runs: usize,
    pub avg_density: f64,
    pub avg_time_ms: u64,
    pub avg_gap_percent: Option<f64>,
}

impl BenchmarkResult {
    /// Creates an empty collection stamped with the current time.
    pub fn new() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            runs: Vec::new(),
            timestamp,
            metadata: BenchmarkMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
        }
    }

    /// Adds a run result.
    pub fn add_run(&mut self, result: RunResult) {
        self.runs.push(result);
    }

    /// Appends every run of `other`.
    pub fn merge(&mut self, other: BenchmarkResult) {
        self.runs.extend(other.runs);
    }

    /// Saves results to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads results written by [`BenchmarkResult::save_json`].
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Saves results to a CSV file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(
            file,
            "dataset,policy,status,plate_size,objects_placed,total_objects,density,makespan,refinements,sizes_tried,batches,time_ms,valid,gap_percent"
        )?;

        for run in &self.runs {
            writeln!(
                file,
                "{},{},{},{},{},{},{:.4},{:.2},{},{},{},{},{},{}",
                run.dataset,
                run.policy,
                run.status,
                run.plate_size.map_or(String::new(), |s| format!("{:.2}", s)),
                run.objects_placed,
                run.total_objects,
                run.density,
                run.makespan,
                run.refinements,
                run.sizes_tried,
                run.batches,
                run.time_ms,
                run.valid,
                run.gap_percent
                    .map_or(String::new(), |g| format!("{:.2}", g)),
            )?;
        }

        Ok(())
    }

    /// Prints a summary table to stdout.
    pub fn print_summary(&self) {
        println!("\n{:=<104}", "");
        println!("BENCHMARK RESULTS");
        println!("{:=<104}", "");
        println!(
            "{:<14} {:<12} {:<28} {:>8} {:>8} {:>8} {:>10} {:>8}",
            "Dataset", "Policy", "Status", "Size", "Placed", "Lemmas", "Time(ms)", "Gap%"
        );
        println!("{:-<104}", "");

        for run in &self.runs {
            let size = run
                .plate_size
                .map_or("-".to_string(), |s| format!("{:.1}", s));
            let gap = run
                .gap_percent
                .map_or("-".to_string(), |g| format!("{:.1}", g));
            let mark = if run.valid { "" } else { " (!)" };
            println!(
                "{:<14} {:<12} {:<28} {:>8} {:>8} {:>8} {:>10} {:>8}",
                run.dataset,
                run.policy,
                format!("{}{}", run.status, mark),
                size,
                format!("{}/{}", run.objects_placed, run.total_objects),
                run.refinements,
                run.time_ms,
                gap
            );
        }

        println!("{:=<104}\n", "");
    }

    /// Aggregates runs per search policy, ordered by policy name.
    pub fn summary_by_policy(&self) -> Vec<PolicySummary> {
        let mut by_policy: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for run in &self.runs {
            by_policy.entry(run.policy.as_str()).or_default().push(run);
        }

        by_policy
            .into_iter()
            .map(|(policy, runs)| {
                let n = runs.len() as f64;
                let gaps: Vec<f64> = runs.iter().filter_map(|r| r.gap_percent).collect();
                PolicySummary {
                    policy: policy.to_string(),
                    run_count: runs.len(),
                    complete_runs: runs.iter().filter(|r| r.is_complete()).count(),
                    avg_density: runs.iter().map(|r| r.density).sum::<f64>() / n,
                    avg_time_ms: (runs.iter().map(|r| r.time_ms).sum::<u64>() as f64 / n) as u64,
                    avg_gap_percent: if gaps.is_empty() {
                        None
                    } else {
                        Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(policy: &str, size: f64, time_ms: u64) -> RunResult {
        let mut r = RunResult::new("squares_4", policy, 4);
        r.status = format!("Valid({})", size);
        r.plate_size = Some(size);
        r.objects_placed = 4;
        r.valid = true;
        r.density = 400.0 / (size * size);
        r.time_ms = time_ms;
        r.with_best_known(20.0)
    }

    #[test]
    fn test_gap() {
        let r = run("Descending", 25.0, 10);
        assert_relative_eq!(r.gap_percent.unwrap(), 25.0);
        assert!(r.is_complete());

        let failed = RunResult::new("x", "Bisection", 2).failed("boom");
        assert!(!failed.is_complete());
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_summary_by_policy() {
        let mut results = BenchmarkResult::new();
        results.add_run(run("Descending", 20.0, 10));
        results.add_run(run("Descending", 30.0, 30));
        results.add_run(run("Bisection", 20.0, 5));

        let summary = results.summary_by_policy();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].policy, "Bisection");
        assert_eq!(summary[1].run_count, 2);
        assert_eq!(summary[1].avg_time_ms, 20);
        assert_relative_eq!(summary[1].avg_gap_percent.unwrap(), 25.0);
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let mut results = BenchmarkResult::new();
        results.add_run(run("Exhaustive", 20.0, 1));
        let path = std::env::temp_dir().join(format!("arrange-bench-{}.json", std::process::id()));
        results.save_json(&path).unwrap();
        let loaded = BenchmarkResult::load_json(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.runs.len(), 1);
        assert_eq!(loaded.runs[0].plate_size, Some(20.0));
        assert!(loaded.runs[0].placements.is_none());
    }
}
