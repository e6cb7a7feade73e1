use crate::errors::{BenchError, BenchResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Default program used to refresh the Spearman summary JSON.
pub const DEFAULT_AGGREGATE_CMD: &[&str] = &["python3", "aggregate_summeval_spearman_json.py"];

/// Default name of the summary JSON written under the output root.
pub const DEFAULT_SUMMARY_FILENAME: &str = "summeval_spearman.json";

/// Configuration for one batch run over a dataset tree.
///
/// A run walks `data_root/<group>/<metric>` and calls the evaluate program
/// once per metric directory. When `aggregate_after_each` is set, the
/// aggregate program is re-run after every evaluate call to keep the
/// summary JSON current.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Dataset root holding one directory per context/article.
    pub data_root: PathBuf,
    /// Root under which per-group outputs and the summary JSON are written.
    pub output_root: PathBuf,
    /// Comparison budget forwarded to the evaluate program. When unset the
    /// flag is omitted entirely and the evaluator runs its full matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
    /// Re-run aggregation after every evaluate invocation.
    #[serde(default)]
    pub aggregate_after_each: bool,
    /// Evaluate program and leading arguments, e.g. ["python3", "main_summeval.py"].
    pub evaluate_cmd: Vec<String>,
    /// Aggregate program and leading arguments.
    #[serde(default = "default_aggregate_cmd")]
    pub aggregate_cmd: Vec<String>,
    /// File name of the summary JSON inside `output_root`.
    #[serde(default = "default_summary_filename")]
    pub summary_filename: String,
    /// Optional KEY=VALUE file whose entries are applied to every child
    /// process, overriding the inherited environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
}

fn default_aggregate_cmd() -> Vec<String> {
    DEFAULT_AGGREGATE_CMD.iter().map(|s| s.to_string()).collect()
}

fn default_summary_filename() -> String {
    DEFAULT_SUMMARY_FILENAME.to_string()
}

impl BatchConfig {
    pub fn from_string(config_str: &str) -> Result<Self> {
        serde_json::from_str(config_str).context("Failed to parse batch config JSON")
    }

    pub fn to_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize batch config")
    }

    /// Write the effective config next to the run outputs so a finished
    /// run records the parameters that produced it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BenchResult<()> {
        let serialized = self.to_string().map_err(BenchError::from)?;
        fs::write(path.as_ref(), serialized)?;
        Ok(())
    }

    /// Absolute location of the summary JSON for this run.
    pub fn summary_path(&self) -> PathBuf {
        self.output_root.join(&self.summary_filename)
    }
}

/// Resolves the environment passed to child processes: the inherited
/// process environment overlaid with entries from the config's env file.
pub struct ConfigManager {
    config: BatchConfig,
    env_vars: HashMap<String, String>,
}

impl ConfigManager {
    pub fn new(config: BatchConfig) -> Result<Self> {
        let mut manager = Self {
            config,
            env_vars: HashMap::new(),
        };
        manager.load_environment_variables()?;
        Ok(manager)
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn load_environment_variables(&mut self) -> Result<()> {
        for (key, value) in env::vars() {
            self.env_vars.insert(key, value);
        }

        if let Some(env_file) = &self.config.env_file {
            // Env file entries override the inherited environment
            for (key, value) in Self::parse_env_file(env_file)? {
                self.env_vars.insert(key, value);
            }
        }

        Ok(())
    }

    /// Parse a KEY=VALUE environment file, skipping blanks and comments.
    fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>> {
        let file = File::open(path).context(format!("Failed to open env file at {:?}", path))?;
        let reader = io::BufReader::new(file);
        let mut env_vars = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            // Split on first '=' only
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value
                    .trim()
                    .trim_matches('"')
                    .trim_matches('\'')
                    .to_string();
                env_vars.push((key, value));
            }
        }

        Ok(env_vars)
    }

    pub fn get_environment_variables(&self) -> Vec<(String, String)> {
        self.env_vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn get_env(&self, key: &str) -> Option<&String> {
        self.env_vars.get(key)
    }
}
