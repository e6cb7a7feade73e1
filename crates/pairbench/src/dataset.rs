use crate::errors::{BenchError, BenchResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One metric directory discovered under `data_root/<group>/<metric>`.
///
/// `group_id` is the context/article directory name and `metric_id` the
/// scoring-method directory name; both come straight from the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDir {
    pub group_id: String,
    pub metric_id: String,
    pub path: PathBuf,
}

/// Walk the two-level dataset tree and return every metric directory in
/// group-major, name-sorted order.
///
/// Non-directory entries at either level are skipped silently; a stray
/// README or .DS_Store in the tree must not produce an invocation.
pub fn collect_metric_dirs(data_root: &Path) -> BenchResult<Vec<MetricDir>> {
    if !data_root.is_dir() {
        return Err(BenchError::DataRootNotFound(data_root.to_path_buf()));
    }

    let mut metric_dirs = Vec::new();
    for group in sorted_subdirs(data_root)? {
        let group_id = dir_name(&group);
        for metric in sorted_subdirs(&group)? {
            metric_dirs.push(MetricDir {
                group_id: group_id.clone(),
                metric_id: dir_name(&metric),
                path: metric,
            });
        }
    }

    debug!(
        "Found {} metric directories under {}",
        metric_dirs.len(),
        data_root.display()
    );
    Ok(metric_dirs)
}

/// Subdirectories of `dir`, sorted by file name so runs visit metric
/// directories in a deterministic order.
fn sorted_subdirs(dir: &Path) -> BenchResult<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
