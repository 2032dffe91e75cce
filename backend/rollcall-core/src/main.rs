// src/main.rs
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall_core::config::parse_now;
use rollcall_core::report::{
    classified_row, classify_rows, render_table, render_text, to_json, write_csv, ClassifiedRow,
};
use rollcall_core::{classify, ClassificationContext, Dataset, Summary, ThresholdConfig, ThresholdPreset};

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Shift attendance summaries from Hubstaff-style exports")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Evaluation instant, e.g. 2025-11-17T14:00:00 (defaults to the local clock)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Named threshold set; overrides ROLLCALL_* environment thresholds
    #[arg(long, value_enum, global = true)]
    preset: Option<ThresholdPreset>,

    /// Minutes after shift start still counted on time
    #[arg(long, global = true)]
    grace: Option<u32>,

    /// Lateness in minutes beyond which a shift counts as missed
    #[arg(long, global = true)]
    late_threshold: Option<u32>,

    /// Elapsed-minus-logged minutes that mark a running shift abandoned
    #[arg(long, global = true)]
    abandoned_gap: Option<u32>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// KPI counts, attendance trend, departments and top late arrivals
    Summary {
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classified employee table
    Table {
        file: PathBuf,
        /// Case-insensitive filter on employee name
        #[arg(long)]
        search: Option<String>,
    },
    /// Write the classified table as CSV
    Export {
        file: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = if verbose > 0 { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_context(cli: &Cli) -> Result<ClassificationContext> {
    let base = match cli.preset {
        Some(preset) => preset.thresholds(),
        None => ThresholdConfig::from_env().context("Loading thresholds from environment failed")?,
    };
    let thresholds = base.with_overrides(cli.grace, cli.late_threshold, cli.abandoned_gap);

    let ctx = match &cli.now {
        Some(value) => ClassificationContext::new(parse_now(value)?, thresholds),
        None => ClassificationContext::now_local(thresholds),
    };
    Ok(ctx)
}

async fn load(file: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::default();
    dataset
        .try_reload(file)
        .await
        .with_context(|| format!("Failed to load {}", file.display()))?;
    Ok(dataset)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!("CLI arguments: {:?}", cli);

    let ctx = build_context(&cli)?;

    match &cli.command {
        Command::Summary { file, json } => {
            let dataset = load(file).await?;
            let summary = Summary::build(dataset.records(), &ctx);
            if *json {
                println!("{}", to_json(&summary)?);
            } else {
                let rows = classify_rows(dataset.records(), &ctx);
                print!("{}", render_text(&summary, &rows, ctx.now));
                println!();
                println!("Attendance trend:");
                for day in &summary.trend {
                    println!(
                        "  {}: on time {}, late {}, absent {}",
                        day.date, day.on_time, day.late, day.absent
                    );
                }
                println!("Departments:");
                for dept in &summary.departments {
                    println!("  {}: {}", dept.organization, dept.count);
                }
                println!("Top late arrivals:");
                for arrival in &summary.top_late {
                    println!("  {}: {} minutes", arrival.member, arrival.minutes);
                }
            }
        }
        Command::Table { file, search } => {
            let dataset = load(file).await?;
            let rows: Vec<ClassifiedRow> = match search {
                Some(query) => dataset
                    .search(query)
                    .into_iter()
                    .map(|(i, r)| classified_row(i, r, classify(r, &ctx)))
                    .collect(),
                None => classify_rows(dataset.records(), &ctx),
            };
            info!("Showing {} of {} rows", rows.len(), dataset.len());
            print!("{}", render_table(&rows));
        }
        Command::Export { file, out } => {
            let dataset = load(file).await?;
            let rows = classify_rows(dataset.records(), &ctx);
            let handle = File::create(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            write_csv(&rows, BufWriter::new(handle))?;
            info!("Exported {} rows to {}", rows.len(), out.display());
        }
    }

    Ok(())
}
