pub mod bench_config;
pub mod dataset;
pub mod errors;
pub mod runners;

// Re-export main components for easier use
pub use bench_config::{BatchConfig, ConfigManager};
pub use dataset::{collect_metric_dirs, MetricDir};
pub use errors::{BenchError, BenchResult};
pub use runners::batch_runner::BatchRunner;
