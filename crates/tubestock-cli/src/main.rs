//! tubestock CLI - plan structural tube stock from job files
//!
//! Reads a TOML or JSON job, plans the tube and writes the kernel document.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tubestock::{Job, TubePlan};

#[derive(Parser)]
#[command(name = "tubestock")]
#[command(about = "Parametric structural tube stock planner", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a job and write its kernel document as JSON
    Plan {
        /// Job file (.json, otherwise TOML)
        job: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display a summary of a planned job
    Info {
        /// Job file (.json, otherwise TOML)
        job: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Plan { job, output } => plan_job(&job, output.as_deref())?,
        Commands::Info { job } => show_info(&job)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_job(path: &Path) -> Result<Job> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let job = match ext.to_lowercase().as_str() {
        "json" => Job::from_json_str(&text),
        _ => Job::from_toml_str(&text),
    }
    .with_context(|| format!("parsing {}", path.display()))?;
    debug!(units = ?job.units, features = job.features.len(), "loaded job");
    Ok(job)
}

fn load_plan(path: &Path) -> Result<TubePlan> {
    let job = read_job(path)?;
    job.plan()
        .with_context(|| format!("planning {}", path.display()))
}

fn plan_job(path: &Path, output: Option<&Path>) -> Result<()> {
    let doc = load_plan(path)?.to_document();
    let json = doc.to_json()?;

    match output {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
            eprintln!("Wrote {} nodes to {}", doc.nodes.len(), out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let plan = load_plan(path)?;
    let doc = plan.to_document();
    let counts = doc.op_counts();

    println!("tube job: {}", path.display());
    println!("  Material: {}", plan.spec.profile.kind());
    println!("  Nominal length: {:.3} mm", plan.spec.nominal_length);
    println!(
        "  Effective length: {:.3} mm",
        plan.end_cuts.effective_length
    );
    println!(
        "  Rotational offset: {} (effective {})",
        plan.spec.rotational_offset, plan.end_cuts.effective_offset
    );
    println!(
        "  Operations: {} sketches, {} pads, {} pockets",
        counts.sketches, counts.pads, counts.pockets
    );

    if !plan.features.is_empty() {
        println!("\nFeatures:");
        for f in &plan.features {
            println!(
                "  {}: {} ({} instances)",
                f.index + 1,
                f.feature.label(),
                f.placed.len()
            );
        }
    }
    if !plan.skipped.is_empty() {
        let skipped: Vec<String> = plan.skipped.iter().map(|i| (i + 1).to_string()).collect();
        println!("\nSkipped undefined features: {}", skipped.join(", "));
    }

    Ok(())
}
