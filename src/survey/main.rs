//! Training-table survey.
//!
//! Measures every sport facility against the medical and stop datasets and
//! labels it with the rule-based classifier, producing the CSV a model is
//! trained on.

mod dataset;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use medreach::config::Config;
use medreach::data::load_data;
use medreach::{AccessContext, AccessibilityLabel, RuleClassifier};

use crate::dataset::{survey_row, write_rows, SurveyRow};

#[derive(Parser, Debug)]
#[command(name = "survey")]
#[command(about = "Build the accessibility training table for all sport facilities")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "medreach.toml")]
    config: PathBuf,

    /// Output CSV
    #[arg(short, long, default_value = "data/processed/training_dataset.csv")]
    output: PathBuf,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Log per-query detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Medreach Survey");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = Config::load_from_file(&args.config)?;
    let datasets = load_data(&config.data).context("Failed to load datasets")?;
    let classifier = RuleClassifier::new(config.access.thresholds);
    let ctx = AccessContext::new(datasets, Box::new(classifier), config.access.missing_distance_m)?;

    let facilities = ctx.sport().features();
    let pb = ProgressBar::new(facilities.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let rows = facilities
        .par_iter()
        .map(|facility| {
            let row = survey_row(&ctx, facility);
            pb.inc(1);
            row
        })
        .collect::<Result<Vec<SurveyRow>>>()?;
    pb.finish();

    for label in AccessibilityLabel::all() {
        let count = rows.iter().filter(|r| r.label == label.as_str()).count();
        info!("  {}: {} facilities", label, count);
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    write_rows(BufWriter::new(file), &rows)?;

    info!("Wrote {} rows to {}", rows.len(), args.output.display());
    Ok(())
}
