//! Reviewmine evaluation tool.
//!
//! Runs a review graph mining algorithm against the synthetic labeled
//! dataset and reports ranking-quality metrics as newline-delimited JSON.
//!
//! # Usage
//!
//! ```bash
//! # Threshold sweep confusion counts
//! reviewmine-eval threshold deviation --data-dir data/synthetic
//!
//! # Per-iteration top-57 ranking precision, with an algorithm parameter
//! reviewmine-eval ranking deviation --loop 30 --param damping=0.3
//!
//! # Normalized DCG per top-k cut, into a file
//! reviewmine-eval dcg spread --output ndcg.jsonl
//! ```
//!
//! Records go to stdout (or `--output`); logs go to stderr.

mod algorithms;
mod registry;

use algorithms::Params;
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use registry::{installed_algorithms, AlgorithmEntry};
use reviewmine_core::config::THRESHOLD_STEPS;
use reviewmine_core::dataset;
use reviewmine_core::evaluation::metrics::{
    auc, ndcg_report, ranking_report, roc_points, threshold_sweep,
};
use reviewmine_core::graph::ReviewGraph;
use reviewmine_core::ANOMALOUS_REVIEWER_SIZE;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Evaluate a review graph mining algorithm with the synthetic dataset.
#[derive(Parser)]
#[command(name = "reviewmine-eval", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing reviewer.dat, product.dat, and review.dat
    #[arg(long, global = true, default_value = "data/synthetic")]
    data_dir: PathBuf,

    /// File path to store results (default: stdout)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Threshold based classification.
    ///
    /// Classifies reviewers whose anomalous degree is greater than or
    /// equal to a threshold as anomalous. Moving the threshold over
    /// [0, 1], emits one JSON record per threshold with the confusion
    /// counts.
    Threshold(RunArgs),

    /// Ranking based classification.
    ///
    /// Classifies the reviewers with the top 57 highest anomalous degrees
    /// as anomalous and emits one JSON record per iteration with the
    /// per-class counts and precisions.
    Ranking(RunArgs),

    /// Evaluate the anomalous degree ranking by normalized DCG.
    ///
    /// Emits one JSON record with the nDCG score for each k in 1 to 57.
    Dcg(RunArgs),
}

impl Command {
    fn run_args(&self) -> &RunArgs {
        match self {
            Command::Threshold(args) | Command::Ranking(args) | Command::Dcg(args) => args,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Algorithm to evaluate
    method: String,

    /// Number of iterations
    #[arg(long = "loop", default_value_t = 20)]
    loops: usize,

    /// Algorithm parameter as key=value; can be set multiple times
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,
}

/// Parses a `key=value` algorithm parameter.
fn parse_param(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let value: f64 = value
        .parse()
        .map_err(|_| format!("parameter {key:?} has non-numeric value {value:?}"))?;
    Ok((key.to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = cli.command.run_args();
    let registry = installed_algorithms();
    let entry = registry.get(args.method.as_str()).ok_or_else(|| {
        let installed: Vec<&str> = registry.keys().copied().collect();
        anyhow!(
            "unknown algorithm {:?} (installed: {})",
            args.method,
            installed.join(", ")
        )
    })?;

    let params: Params = args.params.iter().cloned().collect();
    let mut graph = (entry.constructor)(&params)
        .with_context(|| format!("failed to initialize the {:?} graph", args.method))?;
    dataset::load(graph.as_mut(), &cli.data_dir).with_context(|| {
        format!("failed to load the dataset from {}", cli.data_dir.display())
    })?;
    info!(
        "loaded {} reviewers from {}",
        graph.reviewers().len(),
        cli.data_dir.display()
    );

    let loops = entry.effective_loops(args.loops);
    let mut output = open_output(cli.output.as_deref())?;

    match &cli.command {
        Command::Threshold(_) => {
            run_updates(graph.as_mut(), loops, entry);
            let reviewers = graph.reviewers();
            let records = threshold_sweep(&reviewers, THRESHOLD_STEPS);
            write_records(&mut output, &records)?;
            match roc_points(&records, reviewers.len()) {
                Ok(points) => info!("AUC: {:.5}", auc(&points)),
                Err(e) => warn!("skipping AUC: {e}"),
            }
        }
        Command::Ranking(_) => {
            let records = ranking_report(graph.as_mut(), loops)?;
            write_records(&mut output, &records)?;
        }
        Command::Dcg(_) => {
            run_updates(graph.as_mut(), loops, entry);
            let records = ndcg_report(&graph.reviewers(), ANOMALOUS_REVIEWER_SIZE);
            write_records(&mut output, &records)?;
        }
    }

    Ok(())
}

/// Runs the algorithm's update loop with a progress bar on stderr.
fn run_updates(graph: &mut dyn ReviewGraph, loops: usize, entry: &AlgorithmEntry) {
    if entry.single_shot {
        info!("single-shot algorithm; running one iteration");
    }
    let pb = ProgressBar::new(loops as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap(),
    );
    pb.set_message("Iterations");
    for _ in 0..loops {
        graph.update();
        pb.inc(1);
    }
    pb.finish();
}

/// Opens the record sink: a buffered file, or stdout.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Writes records as newline-delimited JSON.
fn write_records<T: Serialize>(out: &mut dyn Write, records: &[T]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("damping=0.3").unwrap(), ("damping".to_string(), 0.3));
        assert!(parse_param("damping").is_err());
        assert!(parse_param("damping=high").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "reviewmine-eval",
            "ranking",
            "deviation",
            "--loop",
            "5",
            "--param",
            "damping=0.2",
        ])
        .unwrap();
        let args = cli.command.run_args();
        assert_eq!(args.method, "deviation");
        assert_eq!(args.loops, 5);
        assert_eq!(args.params, vec![("damping".to_string(), 0.2)]);
    }

    #[test]
    fn test_cli_rejects_malformed_param() {
        assert!(Cli::try_parse_from([
            "reviewmine-eval",
            "threshold",
            "deviation",
            "--param",
            "damping",
        ])
        .is_err());
    }

    /// Writes a minimal dataset: one product rated high by two honest
    /// reviewers, low by one reviewer of each anomaly class.
    fn write_dataset() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("reviewer.dat"),
            "1 alice\n2 bob\n3 anomaly1\n4 anomaly2_1\n5 anomaly3_2\n",
        )
        .unwrap();
        fs::write(dir.path().join("product.dat"), "1 widget\n").unwrap();
        fs::write(
            dir.path().join("review.dat"),
            "1 1 4\n2 1 4\n3 1 0\n4 1 0\n5 1 0\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_end_to_end_threshold_run() {
        let dir = write_dataset();
        let registry = installed_algorithms();
        let entry = &registry["deviation"];

        let mut graph = (entry.constructor)(&Params::new()).unwrap();
        dataset::load(graph.as_mut(), dir.path()).unwrap();
        run_updates(graph.as_mut(), entry.effective_loops(5), entry);

        let records = threshold_sweep(&graph.reviewers(), THRESHOLD_STEPS);
        let mut out = Vec::new();
        write_records(&mut out, &records).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), THRESHOLD_STEPS);
        assert!(text.lines().next().unwrap().contains("\"true-positive\":3"));
    }

    #[test]
    fn test_end_to_end_ranking_run_reports_all_classes() {
        let dir = write_dataset();
        let registry = installed_algorithms();
        let entry = &registry["spread"];

        let mut graph = (entry.constructor)(&Params::new()).unwrap();
        dataset::load(graph.as_mut(), dir.path()).unwrap();

        let records = ranking_report(graph.as_mut(), entry.effective_loops(20)).unwrap();
        // Single-shot: one record despite the requested 20 loops.
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].a1, records[0].a2, records[0].a3), (1, 1, 1));
    }
}
