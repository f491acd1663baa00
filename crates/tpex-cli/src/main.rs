//! # tpex
//!
//! Binary entry point for Azure DevOps test-case extraction.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Credential and configuration loading from the environment
//! - The sequential extraction driver and run summary
//! - JSON and Excel output writers

mod driver;
mod excel_writer;
mod json_writer;

use anyhow::{Context, Result, bail};
use clap::Parser;
use json_writer::PlanContext;
use std::fs;
use std::path::PathBuf;
use tpex_ado::SuiteExtractor;
use tracing::{info, warn};

const DEFAULT_FIRST_SUITE: u64 = 1_410_044;
const DEFAULT_LAST_SUITE: u64 = 1_410_100;

/// Extract test-case data from Azure DevOps Test Plans.
///
/// Reads the AZURE_DEVOPS_PAT environment variable for authentication and
/// writes one JSON file (and, when built with Excel support, one
/// spreadsheet) per suite.
#[derive(Parser, Debug)]
#[command(name = "tpex", version, about)]
struct Cli {
    /// Specific suite IDs to extract, processed in the given order
    #[arg(long, value_name = "ID", num_args = 1.., conflicts_with = "range")]
    suites: Option<Vec<u64>>,

    /// Inclusive range of suite IDs to extract
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    range: Option<Vec<u64>>,

    /// Directory for JSON output files
    #[arg(long, value_name = "PATH", default_value = "json_output")]
    json_dir: PathBuf,

    /// Directory for Excel output files
    #[arg(long, value_name = "PATH", default_value = "excel_output")]
    excel_dir: PathBuf,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

/// Resolve the list of suite IDs to process.
///
/// Explicit IDs keep their given order; a range expands ascending. With
/// neither, the documented default range applies.
fn resolve_suite_ids(cli: &Cli) -> Result<Vec<u64>> {
    if let Some(ids) = &cli.suites {
        return Ok(ids.clone());
    }
    if let Some(range) = &cli.range {
        let (start, end) = (range[0], range[1]);
        if start > end {
            bail!("invalid range: start {start} is greater than end {end}");
        }
        return Ok((start..=end).collect());
    }
    Ok((DEFAULT_FIRST_SUITE..=DEFAULT_LAST_SUITE).collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Usage errors must surface before the credential check, and both
    // before any network traffic.
    let suite_ids = resolve_suite_ids(&cli)?;
    let extractor = SuiteExtractor::from_env()?;

    let config = extractor.config();
    let plan = PlanContext {
        plan_id: config.plan_id,
        plan_name: config.plan_name.clone(),
        project: config.project.clone(),
    };

    fs::create_dir_all(&cli.json_dir)
        .with_context(|| format!("creating JSON output directory {}", cli.json_dir.display()))?;
    let excel_enabled = excel_writer::available();
    if excel_enabled {
        fs::create_dir_all(&cli.excel_dir).with_context(|| {
            format!("creating Excel output directory {}", cli.excel_dir.display())
        })?;
    } else {
        warn!("spreadsheet support not compiled in (excel feature disabled); Excel output will be skipped");
    }

    match (suite_ids.first(), suite_ids.last()) {
        (Some(first), Some(last)) if suite_ids.len() > 10 => {
            info!(count = suite_ids.len(), first, last, "starting extraction");
        }
        _ => info!(suites = ?suite_ids, "starting extraction"),
    }
    info!(json_dir = %cli.json_dir.display(), excel_dir = %cli.excel_dir.display(), excel_enabled, "output targets");

    let outputs = driver::OutputTargets {
        json_dir: cli.json_dir.clone(),
        excel_dir: cli.excel_dir.clone(),
        excel_enabled,
        plan,
    };
    let summary = driver::run(&extractor, &suite_ids, &outputs).await;

    println!("{}", summary.report());

    // Per-suite failures are reported above but never change the exit code;
    // only configuration errors abort with a non-zero status.
    Ok(())
}
