use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "msbfs workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the traversal and partitioning benchmarks
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Also benchmark with the `parallel` feature enabled
        #[arg(long, default_value_t = false)]
        with_parallel: bool,
    },
}

const BENCHES: &[&str] = &["msbfs_benchmark", "partition_benchmark"];

/// Baseline name and the cargo features it is built with.
const VARIANTS: &[(&str, Option<&str>)] = &[("default", None), ("parallel", Some("parallel"))];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            with_parallel,
        } => {
            let variants = if with_parallel { VARIANTS } else { &VARIANTS[..1] };
            if !report_only {
                run_benchmarks(quick, variants)?;
            }
            generate_report(variants)?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool, variants: &[(&str, Option<&str>)]) -> Result<()> {
    println!("Running benchmarks...");

    for &(baseline, features) in variants {
        // Build first to avoid measuring build time
        println!("Compiling benchmarks ({baseline})...");
        let mut build = Command::new("cargo");
        build.args(["build", "--benches", "--release"]);
        if let Some(features) = features {
            build.args(["--features", features]);
        }
        if !build.status()?.success() {
            anyhow::bail!("Failed to compile benchmarks for {baseline}");
        }

        for bench in BENCHES {
            println!("\n>>> {bench} [{baseline}]");
            let start = Instant::now();

            let mut cmd = Command::new("cargo");
            cmd.env("CARGO_INCREMENTAL", "0");
            cmd.args(["bench", "--bench", bench]);
            if let Some(features) = features {
                cmd.args(["--features", features]);
            }

            // Args for the test runner (Criterion) go after --
            cmd.arg("--");
            cmd.arg("--save-baseline").arg(baseline);

            if quick {
                cmd.arg("--measurement-time").arg("0.1");
                cmd.arg("--noplot");
                cmd.arg("--sample-size").arg("10");
            }

            let status = cmd
                .status()
                .with_context(|| format!("Failed to run {bench} for {baseline}"))?;

            if status.success() {
                println!("Finished {bench} in {:.2?}", start.elapsed());
            } else {
                eprintln!("Warning: {bench} failed for {baseline}");
            }
        }
    }

    Ok(())
}

fn generate_report(variants: &[(&str, Option<&str>)]) -> Result<()> {
    println!("\n>>> Generating Report...");
    let mut results: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    collect_results(criterion_dir, criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# msbfs Benchmark Report")?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for (baseline, _) in variants {
        write!(file, " {baseline} (ops/s) |")?;
    }
    if variants.len() > 1 {
        write!(file, " parallel vs default |")?;
    }
    writeln!(file)?;

    write!(file, "|---|")?;
    for _ in variants {
        write!(file, "---|")?;
    }
    if variants.len() > 1 {
        write!(file, "---|")?;
    }
    writeln!(file)?;

    for (workload, by_baseline) in &results {
        write!(file, "| {workload} |")?;
        for (baseline, _) in variants {
            match by_baseline.get(*baseline) {
                Some(ops) => write!(file, " {} |", format_ops(*ops))?,
                None => write!(file, " N/A |")?,
            }
        }
        if variants.len() > 1 {
            match (by_baseline.get("default"), by_baseline.get("parallel")) {
                (Some(base), Some(parallel)) if *base > 0.0 => {
                    write!(file, " **{:.2}x** |", parallel / base)?;
                }
                _ => write!(file, " - |")?,
            }
        }
        writeln!(file)?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Walks criterion's output. Layout: `<workload...>/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, results: &mut BTreeMap<String, BTreeMap<String, f64>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(root, &path, results);
            continue;
        }
        if file_name(&path) != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let Some(baseline) = file_name(baseline_dir) else { continue };
        if baseline == "report" || baseline == "new" || baseline == "base" {
            continue;
        }
        let Ok(workload) = workload_dir.strip_prefix(root) else { continue };
        let workload = workload.to_string_lossy().replace('\\', "/");

        if let Some(metric) = read_metric(&path, &workload_dir.join(baseline).join("benchmark.json")) {
            results
                .entry(workload)
                .or_default()
                .insert(baseline.to_string(), metric);
        }
    }
}

/// Elements per second when the benchmark declares a throughput, iterations per second otherwise.
fn read_metric(estimates: &Path, benchmark: &Path) -> Option<f64> {
    let elements = fs::read_to_string(benchmark)
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64());

    let content = fs::read_to_string(estimates).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    let time_ns = json.get("mean")?.get("point_estimate")?.as_f64()?;
    if time_ns <= 0.0 {
        return None;
    }
    Some(elements.unwrap_or(1.0) * 1e9 / time_ns)
}
