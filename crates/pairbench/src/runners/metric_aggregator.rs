use crate::errors::{BenchError, BenchResult};
use crate::runners::AggregateDescriptor;
use std::process::Command;
use tracing::{error, info};

/// Re-runs the external aggregation program that rewrites the Spearman
/// summary JSON from all per-article outputs produced so far.
#[derive(Debug, Clone)]
pub struct MetricAggregator {
    aggregate_cmd: Vec<String>,
    envs: Vec<(String, String)>,
}

impl MetricAggregator {
    pub fn new(aggregate_cmd: Vec<String>, envs: Vec<(String, String)>) -> Self {
        Self { aggregate_cmd, envs }
    }

    pub fn run(&self, agg: &AggregateDescriptor) -> BenchResult<()> {
        let (program, leading_args) = self.aggregate_cmd.split_first().ok_or_else(|| {
            BenchError::ConfigError("Aggregate command is empty".to_string())
        })?;

        info!(
            "Aggregating Spearman results from {} into {}",
            agg.out_root.display(),
            agg.out_json.display()
        );

        let output = Command::new(program)
            .args(leading_args)
            .arg("--out_root")
            .arg(&agg.out_root)
            .arg("--out_json")
            .arg(&agg.out_json)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Aggregation failed: {}", stderr.trim());
            return Err(BenchError::AggregateFailed {
                status: output.status.code().unwrap_or(1),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            info!("{}", stdout.trim());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_command_is_config_error() {
        let aggregator = MetricAggregator::new(Vec::new(), Vec::new());
        let agg = AggregateDescriptor {
            out_root: PathBuf::from("out"),
            out_json: PathBuf::from("out/summeval_spearman.json"),
        };
        let err = aggregator.run(&agg).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));
    }
}
