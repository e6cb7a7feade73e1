pub mod batch_runner;
pub mod eval_runner;
pub mod metric_aggregator;

pub use batch_runner::BatchRunner;
pub use eval_runner::EvalRunner;
pub use metric_aggregator::MetricAggregator;

use crate::bench_config::ConfigManager;
use crate::errors::BenchResult;
use std::path::PathBuf;

/// One evaluate invocation: built per metric directory, used once,
/// discarded when the child process returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDescriptor {
    pub metric_dir: PathBuf,
    pub round_root: PathBuf,
    pub budget: Option<u64>,
}

/// One aggregate invocation refreshing the summary JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDescriptor {
    pub out_root: PathBuf,
    pub out_json: PathBuf,
}

/// Seam between the batch loop and the external processes it drives.
pub trait Dispatch {
    fn evaluate(&mut self, run: &RunDescriptor) -> BenchResult<()>;
    fn aggregate(&mut self, agg: &AggregateDescriptor) -> BenchResult<()>;
}

/// Production dispatch: spawns the configured evaluate and aggregate
/// programs as child processes.
pub struct SubprocessDispatch {
    eval_runner: EvalRunner,
    aggregator: MetricAggregator,
}

impl SubprocessDispatch {
    pub fn new(manager: &ConfigManager) -> Self {
        let envs = manager.get_environment_variables();
        Self {
            eval_runner: EvalRunner::new(manager.config().evaluate_cmd.clone(), envs.clone()),
            aggregator: MetricAggregator::new(manager.config().aggregate_cmd.clone(), envs),
        }
    }
}

impl Dispatch for SubprocessDispatch {
    fn evaluate(&mut self, run: &RunDescriptor) -> BenchResult<()> {
        self.eval_runner.run(run)
    }

    fn aggregate(&mut self, agg: &AggregateDescriptor) -> BenchResult<()> {
        self.aggregator.run(agg)
    }
}
