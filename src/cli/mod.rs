// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and hands the work to Layer 2 (application).
//
// Two commands are supported:
//   1. `run`      — the full train / evaluate / plot pipeline
//   2. `describe` — dataset overview, no training
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DescribeArgs, RunArgs};

#[derive(Parser, Debug)]
#[command(
    name = "breast-cancer-models",
    version,
    about = "Train a decision tree, a random forest and a dense network on the Wisconsin breast cancer data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case; nothing is computed here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Run(args)      => run_pipeline(args),
            Commands::Describe(args) => describe(args),
        }
    }
}

fn run_pipeline(args: RunArgs) -> Result<()> {
    use crate::application::run_use_case::RunUseCase;

    tracing::info!("Starting run on '{}'", args.source.data);
    let report = RunUseCase::new(args.into()).execute()?;

    println!("\nRun complete. {} files written.", report.outputs.len());
    Ok(())
}

fn describe(args: DescribeArgs) -> Result<()> {
    use crate::application::describe_use_case::DescribeUseCase;

    DescribeUseCase::new(args.into()).execute()?;
    Ok(())
}
