// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `run` and `describe`, and all
// their configurable flags.
//
// clap's derive macros generate the help text, the errors for
// bad values and the string → number conversions.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{describe_use_case::DescribeConfig, run_use_case::RunConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the decision tree, random forest and dense network, then
    /// write reports, plots and the accuracy summary
    Run(RunArgs),

    /// Print the dataset's shape, class balance and feature statistics
    Describe(DescribeArgs),
}

/// Where the table comes from; shared by both commands.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// UCI wdbc.data file, or a headered CSV with a `target` or
    /// `diagnosis` column
    #[arg(long, default_value = "data/wdbc.data")]
    pub data: String,

    /// Fetch wdbc.data from the UCI archive into --data if it is missing
    #[arg(long)]
    pub download: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: DataArgs,

    /// Directory for plots, CSV files, config and network weights
    #[arg(long, default_value = ".")]
    pub output_dir: String,

    /// Fraction of rows held out for testing
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Seed for the split, the trees and the network
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    pub n_estimators: usize,

    /// Depth limit for every tree; unlimited when omitted
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Passes over the network's training rows
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Rows per network gradient step
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Fraction of the training rows (taken from the end) used for
    /// network validation
    #[arg(long, default_value_t = 0.2)]
    pub validation_split: f64,

    /// Width of the first hidden layer
    #[arg(long, default_value_t = 128)]
    pub hidden1: usize,

    /// Width of the second hidden layer
    #[arg(long, default_value_t = 64)]
    pub hidden2: usize,
}

/// The application layer never sees clap types.
impl From<RunArgs> for RunConfig {
    fn from(a: RunArgs) -> Self {
        RunConfig {
            data:             a.source.data,
            download:         a.source.download,
            output_dir:       a.output_dir,
            test_size:        a.test_size,
            seed:             a.seed,
            n_estimators:     a.n_estimators,
            max_depth:        a.max_depth,
            epochs:           a.epochs,
            batch_size:       a.batch_size,
            lr:               a.lr,
            validation_split: a.validation_split,
            hidden1:          a.hidden1,
            hidden2:          a.hidden2,
        }
    }
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub source: DataArgs,
}

impl From<DescribeArgs> for DescribeConfig {
    fn from(a: DescribeArgs) -> Self {
        DescribeConfig {
            data:     a.source.data,
            download: a.source.download,
        }
    }
}
