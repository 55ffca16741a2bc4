// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagediff — Page-by-page visual diff of two PDF documents.
//
// Entry point. Parses arguments, initialises logging, runs one comparison and
// prints either the human summary or the JSON record.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use pagediff_core::human_errors::humanize_error;
use pagediff_core::{ComparisonResult, DiffConfig, PageDiffError};
use pagediff_document::{compare_files, render_summary};

#[derive(Debug, Parser)]
#[command(name = "pagediff")]
#[command(version)]
#[command(about = "Compare two PDFs for visual differences", long_about = None)]
struct Cli {
    /// Reference PDF
    #[arg(value_name = "PDF1")]
    pdf1: PathBuf,

    /// Candidate PDF
    #[arg(value_name = "PDF2")]
    pdf2: PathBuf,

    /// Parent directory for run output [default: diff_output]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// SSIM score below which a page counts as different (0.0-1.0) [default: 0.999]
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Per-channel difference that marks a pixel as changed [default: 20]
    #[arg(long)]
    pixel_threshold: Option<u8>,

    /// Rendering scale; 1.0 renders at 72 DPI [default: 1.0]
    #[arg(long)]
    scale: Option<f32>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Outline the changed region on highlight images
    #[arg(long)]
    outline: bool,

    /// Print the result record as JSON instead of the summary
    #[arg(long)]
    json: bool,

    /// Exit with status 1 when any difference or extra page is found
    #[arg(long)]
    fail_on_diff: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the file (or default) config.
    fn resolve_config(&self) -> Result<DiffConfig, PageDiffError> {
        let mut config = match &self.config {
            Some(path) => DiffConfig::load(path)?,
            None => DiffConfig::default(),
        };
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(threshold) = self.threshold {
            config.similarity_threshold = threshold;
        }
        if let Some(pixel_threshold) = self.pixel_threshold {
            config.pixel_threshold = pixel_threshold;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if self.outline {
            config.outline_regions = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(result) => {
            if cli.fail_on_diff && !result.identical {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            report_error(&err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ComparisonResult> {
    let config = cli.resolve_config()?;
    tracing::info!(dpi = config.dpi(), threshold = config.similarity_threshold, "pagediff starting");

    let result = compare_files(&cli.pdf1, &cli.pdf2, &config)?;

    if cli.json {
        let record = serde_json::to_string_pretty(&result).context("encoding result record")?;
        println!("{record}");
    } else {
        println!("{}", render_summary(&result));
    }
    Ok(result)
}

/// Print a domain error in plain English; anything else with its cause chain.
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<PageDiffError>() {
        Some(domain) => {
            let human = humanize_error(domain);
            eprintln!("Error: {}", human.message);
            eprintln!("{}", human.suggestion);
            tracing::debug!(severity = ?human.severity, detail = %domain, "Run failed");
        }
        None => eprintln!("Error: {err:#}"),
    }
}
