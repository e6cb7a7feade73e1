use clap::{Args, Parser, Subcommand};
use pairbench::bench_config::{DEFAULT_AGGREGATE_CMD, DEFAULT_SUMMARY_FILENAME};
use pairbench::runners::{AggregateDescriptor, MetricAggregator};
use pairbench::{BatchConfig, BatchRunner, BenchError, BenchResult};
use std::path::PathBuf;
use tracing::info;

mod logging;

use logging::setup_logging;

#[derive(Parser)]
#[command(name = "pairbench", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DatasetArgs {
    /// Dataset root with one directory per context/article
    #[arg(
        long,
        value_name = "DIR",
        help = "Dataset root with one directory per context/article, each holding metric subdirectories"
    )]
    data_root: PathBuf,

    /// Root directory for per-group outputs and the summary JSON
    #[arg(
        long,
        value_name = "DIR",
        help = "Root directory where per-group outputs and the summary JSON are written"
    )]
    output_root: PathBuf,

    /// Comparison budget forwarded to the evaluator
    #[arg(
        long,
        value_name = "N",
        help = "Number of directed comparisons per metric directory; omitted, the evaluator runs its full matrix"
    )]
    budget: Option<u64>,

    /// Override the evaluate program
    #[arg(
        long,
        value_name = "COMMAND",
        help = "Evaluate program to run per metric directory, as a single shell-style string"
    )]
    evaluate_cmd: Option<String>,

    /// KEY=VALUE file applied to every child process
    #[arg(
        long,
        value_name = "FILE",
        help = "Environment file (KEY=VALUE lines) applied to every child process"
    )]
    env_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AggregateArgs {
    /// Override the aggregate program
    #[arg(
        long,
        value_name = "COMMAND",
        help = "Aggregate program that rewrites the Spearman summary JSON"
    )]
    aggregate_cmd: Option<String>,

    /// Name of the summary JSON inside the output root
    #[arg(
        long,
        value_name = "NAME",
        default_value = DEFAULT_SUMMARY_FILENAME,
        help = "File name of the Spearman summary JSON inside the output root"
    )]
    summary_json: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run evaluations over a TopicalChat context tree
    #[command(about = "Run evaluations over a TopicalChat context tree")]
    Topicalchat {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Run evaluations over a CNN/SummEval article tree
    #[command(about = "Run evaluations over a CNN/SummEval article tree")]
    Summeval {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        aggregate: AggregateArgs,

        /// Skip the per-metric aggregation passes
        #[arg(
            long,
            help = "Do not refresh the Spearman summary after each metric; run 'pairbench aggregate' separately instead"
        )]
        no_aggregate: bool,
    },

    /// Refresh the Spearman summary JSON from existing outputs
    #[command(about = "Refresh the Spearman summary JSON from existing outputs")]
    Aggregate {
        /// Root directory holding per-group outputs
        #[arg(
            long,
            value_name = "DIR",
            help = "Root directory holding per-group outputs from earlier runs"
        )]
        output_root: PathBuf,

        #[command(flatten)]
        aggregate: AggregateArgs,
    },
}

/// Split a shell-style command string into program + arguments.
fn parse_cmd(raw: &str) -> BenchResult<Vec<String>> {
    match shlex::split(raw) {
        Some(parts) if !parts.is_empty() => Ok(parts),
        _ => Err(BenchError::ConfigError(format!(
            "Invalid command string: {:?}",
            raw
        ))),
    }
}

fn parse_cmd_or(raw: Option<&str>, default: &[&str]) -> BenchResult<Vec<String>> {
    match raw {
        Some(raw) => parse_cmd(raw),
        None => Ok(default.iter().map(|s| s.to_string()).collect()),
    }
}

fn build_config(command: &Command) -> BenchResult<BatchConfig> {
    match command {
        Command::Topicalchat { dataset } => Ok(BatchConfig {
            data_root: dataset.data_root.clone(),
            output_root: dataset.output_root.clone(),
            budget: dataset.budget,
            // No aggregation program exists for TopicalChat
            aggregate_after_each: false,
            evaluate_cmd: parse_cmd_or(
                dataset.evaluate_cmd.as_deref(),
                &["python3", "main_topicalchat.py"],
            )?,
            aggregate_cmd: DEFAULT_AGGREGATE_CMD.iter().map(|s| s.to_string()).collect(),
            summary_filename: DEFAULT_SUMMARY_FILENAME.to_string(),
            env_file: dataset.env_file.clone(),
        }),
        Command::Summeval {
            dataset,
            aggregate,
            no_aggregate,
        } => Ok(BatchConfig {
            data_root: dataset.data_root.clone(),
            output_root: dataset.output_root.clone(),
            budget: dataset.budget,
            aggregate_after_each: !no_aggregate,
            evaluate_cmd: parse_cmd_or(
                dataset.evaluate_cmd.as_deref(),
                &["python3", "main_summeval.py"],
            )?,
            aggregate_cmd: parse_cmd_or(aggregate.aggregate_cmd.as_deref(), DEFAULT_AGGREGATE_CMD)?,
            summary_filename: aggregate.summary_json.clone(),
            env_file: dataset.env_file.clone(),
        }),
        Command::Aggregate { .. } => Err(BenchError::ConfigError(
            "Aggregate runs standalone, not as a batch".to_string(),
        )),
    }
}

fn run(cli: Cli) -> BenchResult<()> {
    match &cli.command {
        Command::Aggregate {
            output_root,
            aggregate,
        } => {
            let aggregate_cmd =
                parse_cmd_or(aggregate.aggregate_cmd.as_deref(), DEFAULT_AGGREGATE_CMD)?;
            info!("Refreshing summary under {}", output_root.display());
            let aggregator = MetricAggregator::new(aggregate_cmd, Vec::new());
            aggregator.run(&AggregateDescriptor {
                out_root: output_root.clone(),
                out_json: output_root.join(&aggregate.summary_json),
            })
        }
        command => {
            let runner = BatchRunner::new(build_config(command)?)?;
            runner.run()
        }
    }
}

fn main() {
    setup_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(err.child_exit_code().unwrap_or(1));
    }
}
