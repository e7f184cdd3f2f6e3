//! Arrangement benchmark CLI

use clap::{Parser, Subcommand, ValueEnum};
use seqarrange_benchmark::{
    BenchError, BenchmarkConfig, BenchmarkResult, BenchmarkRunner, SyntheticDatasets,
};
use seqarrange_core::SearchPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arrange-bench")]
#[command(about = "Synthetic benchmark runner for the sequential arrangement engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available synthetic datasets
    List,

    /// Run benchmark on a single synthetic dataset
    Run {
        /// Dataset name (squares, convex, concave, gantry)
        #[arg(short, long)]
        dataset: String,

        /// Number of objects to generate
        #[arg(short = 'n', long, default_value = "8")]
        count: usize,

        /// Random seed for reproducibility
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Search policies to benchmark
        #[arg(short, long, value_enum, default_values_t = vec![PolicyArg::Descending])]
        policies: Vec<PolicyArg>,

        /// Objects solved jointly per batch
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Time limit per run in seconds
        #[arg(short, long)]
        time_limit: Option<u64>,

        /// Number of runs per configuration
        #[arg(short, long)]
        runs: Option<usize>,

        /// TOML file with a benchmark configuration; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file for results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for CSV results
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Run benchmarks on every predefined dataset
    RunAll {
        /// Preset configuration
        #[arg(short, long, value_enum, default_value = "quick")]
        preset: Preset,

        /// TOML file with a benchmark configuration; replaces the preset
        #[arg(long)]
        config: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output file for results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for CSV results
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Write the predefined datasets as JSON files
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "datasets/synthetic")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Print a summary of a saved result file
    Summary {
        /// JSON file written by `run` or `run-all`
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Walk down from the largest size
    Descending,
    /// Bisect the candidate sizes
    Bisection,
    /// Try every candidate size
    Exhaustive,
}

impl From<PolicyArg> for SearchPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Descending => SearchPolicy::Descending,
            PolicyArg::Bisection => SearchPolicy::Bisection,
            PolicyArg::Exhaustive => SearchPolicy::Exhaustive,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Descending search only, 5s timeout
    Quick,
    /// Every policy, three runs, 60s timeout
    Standard,
}

fn load_config(path: Option<&PathBuf>) -> Result<Option<BenchmarkConfig>, BenchError> {
    path.map(BenchmarkConfig::from_toml_file).transpose()
}

fn save(
    results: &BenchmarkResult,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> Result<(), BenchError> {
    if let Some(path) = output {
        results.save_json(&path)?;
        println!("Results saved to: {}", path.display());
    }
    if let Some(path) = csv {
        results.save_csv(&path)?;
        println!("CSV saved to: {}", path.display());
    }
    Ok(())
}

fn print_policy_comparison(results: &BenchmarkResult) {
    println!("\nPolicy Comparison:");
    println!("{:-<72}", "");
    for summary in results.summary_by_policy() {
        println!(
            "  {:<12} runs={:<3} complete={:<3} avg_density={:.1}% avg_time={}ms avg_gap={}",
            summary.policy,
            summary.run_count,
            summary.complete_runs,
            summary.avg_density * 100.0,
            summary.avg_time_ms,
            summary
                .avg_gap_percent
                .map_or("-".to_string(), |g| format!("{:.1}%", g))
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            println!("Available synthetic datasets:");
            println!("=============================");
            for name in SyntheticDatasets::names() {
                println!("  - {}", name);
            }
            println!("\nUse 'arrange-bench run -d <DATASET>' to run benchmarks");
        }

        Commands::Run {
            dataset,
            count,
            seed,
            policies,
            batch_size,
            time_limit,
            runs,
            config,
            output,
            csv,
        } => {
            let ds = SyntheticDatasets::by_name(&dataset, count, seed)
                .ok_or_else(|| BenchError::UnknownDataset(dataset.clone()))?;

            let mut config = load_config(config.as_ref())?
                .unwrap_or_default()
                .with_policies(policies.into_iter().map(Into::into).collect());
            if let Some(n) = batch_size {
                config = config.with_batch_size(n);
            }
            if let Some(secs) = time_limit {
                config = config.with_time_limit(secs * 1000);
            }
            if let Some(n) = runs {
                config = config.with_runs_per_config(n);
            }

            let runner = BenchmarkRunner::new(config);
            let mut results = runner.run_dataset(&ds);
            results.metadata.seed = Some(seed);
            results.metadata.config = toml::to_string(runner.config()).unwrap_or_default();

            results.print_summary();
            save(&results, output, csv)?;
        }

        Commands::RunAll {
            preset,
            config,
            seed,
            output,
            csv,
        } => {
            let config = match load_config(config.as_ref())? {
                Some(config) => config,
                None => match preset {
                    Preset::Quick => BenchmarkConfig::quick(),
                    Preset::Standard => BenchmarkConfig::standard(),
                },
            };
            let runner = BenchmarkRunner::new(config);

            let mut all_results = BenchmarkResult::new();
            all_results.metadata.seed = Some(seed);
            all_results.metadata.config = toml::to_string(runner.config()).unwrap_or_default();
            for ds in SyntheticDatasets::all(seed) {
                all_results.merge(runner.run_dataset(&ds));
            }

            all_results.print_summary();
            print_policy_comparison(&all_results);
            save(&all_results, output, csv)?;
        }

        Commands::Generate { output, seed } => {
            std::fs::create_dir_all(&output)?;
            for ds in SyntheticDatasets::all(seed) {
                let path = output.join(format!("{}.json", ds.name));
                std::fs::write(&path, serde_json::to_string_pretty(&ds)?)?;
                println!(
                    "Generated: {} ({} objects)",
                    path.display(),
                    ds.objects.len()
                );
            }
        }

        Commands::Summary { file } => {
            let results = BenchmarkResult::load_json(&file)?;
            results.print_summary();
            print_policy_comparison(&results);
        }
    }

    Ok(())
}
