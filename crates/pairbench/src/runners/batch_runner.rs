use crate::bench_config::{BatchConfig, ConfigManager};
use crate::dataset::collect_metric_dirs;
use crate::errors::BenchResult;
use crate::runners::{AggregateDescriptor, Dispatch, RunDescriptor, SubprocessDispatch};
use std::fs;
use tracing::info;

/// Name of the file recording a run's effective configuration.
pub const CONFIG_SNAPSHOT_FILENAME: &str = "batch_config.json";

/// Drives one batch: walks the dataset tree and dispatches one evaluate
/// invocation per metric directory, strictly sequentially, optionally
/// interleaving an aggregate invocation after each one.
pub struct BatchRunner {
    manager: ConfigManager,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> BenchResult<Self> {
        let manager = ConfigManager::new(config)?;
        Ok(Self { manager })
    }

    pub fn config(&self) -> &BatchConfig {
        self.manager.config()
    }

    /// Run the batch against the configured external programs.
    pub fn run(&self) -> BenchResult<()> {
        let mut dispatch = SubprocessDispatch::new(&self.manager);
        self.run_with(&mut dispatch)
    }

    /// Run the batch through an arbitrary dispatch implementation.
    ///
    /// The first dispatch error aborts the whole batch; outputs written
    /// before that point stay on disk.
    pub fn run_with(&self, dispatch: &mut dyn Dispatch) -> BenchResult<()> {
        let config = self.manager.config();

        // Validate the data root before touching the output root
        let metric_dirs = collect_metric_dirs(&config.data_root)?;

        fs::create_dir_all(&config.output_root)?;
        config.save(config.output_root.join(CONFIG_SNAPSHOT_FILENAME))?;

        info!(
            "Running {} evaluations from {} (aggregate_after_each={})",
            metric_dirs.len(),
            config.data_root.display(),
            config.aggregate_after_each
        );

        for metric_dir in &metric_dirs {
            let round_root = config.output_root.join(&metric_dir.group_id);
            fs::create_dir_all(&round_root)?;

            let run = RunDescriptor {
                metric_dir: metric_dir.path.clone(),
                round_root,
                budget: config.budget,
            };
            dispatch.evaluate(&run)?;

            if config.aggregate_after_each {
                dispatch.aggregate(&self.aggregate_descriptor())?;
            }
        }

        info!("Completed {} evaluations", metric_dirs.len());
        Ok(())
    }

    /// Run aggregation once, outside the batch loop. Used when a batch ran
    /// with aggregation disabled and the summary should be refreshed now.
    pub fn aggregate_once(&self) -> BenchResult<()> {
        let mut dispatch = SubprocessDispatch::new(&self.manager);
        dispatch.aggregate(&self.aggregate_descriptor())
    }

    fn aggregate_descriptor(&self) -> AggregateDescriptor {
        let config = self.manager.config();
        AggregateDescriptor {
            out_root: config.output_root.clone(),
            out_json: config.summary_path(),
        }
    }
}
