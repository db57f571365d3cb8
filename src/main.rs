//! MiniSeg: segments the records of a CSV file
//! by a pruned decision tree and by k-means,
//! and writes the evaluation tables.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use miniseg::{Segmentation, SegmentationConfig, SegmentationReport};

use std::path::PathBuf;
use std::time::Instant;


const WIDTH: usize = 9;


/// Customer segmentation by pruned decision trees and k-means
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Input CSV file (overrides the configuration)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory receiving the output tables
    #[arg(short, long)]
    output: PathBuf,

    /// Print a colored run summary
    #[arg(short, long)]
    verbose: bool,
}


fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "miniseg=debug" } else { "miniseg=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();


    let mut config = SegmentationConfig::from_file(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    if let Some(input) = args.input {
        config.input = input;
    }

    let start_time = Instant::now();
    let dataset = config.reader()
        .read()
        .with_context(|| format!("reading {}", config.input.display()))?;

    let report = Segmentation::new(config)
        .verbose(args.verbose)
        .run(&dataset)?;
    let written = report.write(&args.output)
        .with_context(|| format!("writing into {}", args.output.display()))?;


    if args.verbose {
        print_summary(&report);
        println!(
            "{} {} files into {} in {:.2}s",
            "Wrote".bold().green(),
            written.len(),
            args.output.display(),
            start_time.elapsed().as_secs_f64(),
        );
    }
    Ok(())
}


fn print_summary(report: &SegmentationReport) {
    println!(
        "\n{}    {}",
        format!("[RECORDS {:>WIDTH$}]", report.n_records).bold().red(),
        format!("[POSITIVE {:>WIDTH$}]", report.n_positive).bold().yellow(),
    );


    println!("\n{}", "Decision tree".bold().cyan());
    println!("{}", report.tree.cp_table());
    for rule in report.tree.rules() {
        println!("  {rule}");
    }
    let separation = &report.tree_evaluation.separation;
    println!(
        "  separation: total {:.4}, mean {:.4}",
        separation.total, separation.mean,
    );


    println!("\n{}", "K-means".bold().cyan());
    let kmeans = &report.kmeans;
    for (c, size) in kmeans.sizes().iter().enumerate() {
        let share = 100.0 * *size as f64 / report.n_records as f64;
        println!("  cluster {}: {size} records ({share:.1}%)", c + 1);
    }
    println!(
        "  within SS {:.4}, between SS {:.4}, {} iterations",
        kmeans.total_within_ss(), kmeans.between_ss(), kmeans.n_iter(),
    );
    let separation = &report.cluster_evaluation.separation;
    println!(
        "  separation: total {:.4}, mean {:.4}",
        separation.total, separation.mean,
    );


    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings".bold().yellow());
        for warning in &report.warnings {
            println!("  {warning}");
        }
    }
}
