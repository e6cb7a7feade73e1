use crate::errors::{BenchError, BenchResult};
use crate::runners::RunDescriptor;
use std::ffi::OsString;
use std::process::Command;
use tracing::info;

/// Runs the external evaluate program once per metric directory.
///
/// The child inherits stdio so evaluator progress streams through, and
/// the runner blocks until it exits; a non-zero exit aborts the batch.
#[derive(Debug, Clone)]
pub struct EvalRunner {
    evaluate_cmd: Vec<String>,
    envs: Vec<(String, String)>,
}

impl EvalRunner {
    pub fn new(evaluate_cmd: Vec<String>, envs: Vec<(String, String)>) -> Self {
        Self { evaluate_cmd, envs }
    }

    pub fn run(&self, run: &RunDescriptor) -> BenchResult<()> {
        let (program, leading_args) = self.evaluate_cmd.split_first().ok_or_else(|| {
            BenchError::ConfigError("Evaluate command is empty".to_string())
        })?;

        info!(
            "Evaluating {} into {}",
            run.metric_dir.display(),
            run.round_root.display()
        );

        let status = Command::new(program)
            .args(leading_args)
            .args(Self::build_args(run))
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()?;

        if !status.success() {
            return Err(BenchError::EvaluateFailed {
                metric_dir: run.metric_dir.clone(),
                status: status.code().unwrap_or(1),
            });
        }
        Ok(())
    }

    /// Flags forwarded to the evaluate program. `--budget` is appended
    /// only when a budget is set; absence is never encoded as 0 or "".
    pub fn build_args(run: &RunDescriptor) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--metric_dir".into(),
            run.metric_dir.clone().into(),
            "--round_root".into(),
            run.round_root.clone().into(),
        ];
        if let Some(budget) = run.budget {
            args.push("--budget".into());
            args.push(budget.to_string().into());
        }
        args
    }
}
