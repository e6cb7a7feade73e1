#![cfg(unix)]

use pairbench::{BatchConfig, BatchRunner, BenchError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn make_tree(root: &Path, layout: &[(&str, &[&str])]) -> PathBuf {
    let data_root = root.join("data");
    fs::create_dir(&data_root).unwrap();
    for (group, metrics) in layout {
        let group_dir = data_root.join(group);
        fs::create_dir(&group_dir).unwrap();
        for metric in *metrics {
            fs::create_dir(group_dir.join(metric)).unwrap();
        }
    }
    data_root
}

fn write_script(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn sh(script: &Path) -> Vec<String> {
    vec!["sh".to_string(), script.to_string_lossy().into_owned()]
}

#[test]
fn evaluate_receives_expected_flags_per_metric_dir() {
    let root = TempDir::new().unwrap();
    let data_root = make_tree(root.path(), &[("a1", &["coherence", "fluency"])]);
    let record = root.path().join("record.txt");
    let script = write_script(
        root.path(),
        "fake_evaluate.sh",
        &format!("echo \"$@\" >> {}\n", record.display()),
    );

    let config = BatchConfig {
        data_root: data_root.clone(),
        output_root: root.path().join("out"),
        budget: Some(12),
        aggregate_after_each: false,
        evaluate_cmd: sh(&script),
        aggregate_cmd: vec!["false".to_string()],
        summary_filename: "summeval_spearman.json".to_string(),
        env_file: None,
    };
    BatchRunner::new(config).unwrap().run().unwrap();

    let recorded = fs::read_to_string(&record).unwrap();
    let lines: Vec<&str> = recorded.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!(
            "--metric_dir {} --round_root {} --budget 12",
            data_root.join("a1").join("coherence").display(),
            root.path().join("out").join("a1").display()
        )
    );
    assert!(lines[1].contains("fluency"));
}

#[test]
fn unset_budget_never_reaches_the_child() {
    let root = TempDir::new().unwrap();
    let data_root = make_tree(root.path(), &[("a1", &["coherence"])]);
    let record = root.path().join("record.txt");
    let script = write_script(
        root.path(),
        "fake_evaluate.sh",
        &format!("echo \"$@\" >> {}\n", record.display()),
    );

    let config = BatchConfig {
        data_root,
        output_root: root.path().join("out"),
        budget: None,
        aggregate_after_each: false,
        evaluate_cmd: sh(&script),
        aggregate_cmd: vec!["false".to_string()],
        summary_filename: "summeval_spearman.json".to_string(),
        env_file: None,
    };
    BatchRunner::new(config).unwrap().run().unwrap();

    let recorded = fs::read_to_string(&record).unwrap();
    assert!(!recorded.contains("--budget"));
}

#[test]
fn failing_evaluate_aborts_with_the_child_exit_code() {
    let root = TempDir::new().unwrap();
    let data_root = make_tree(root.path(), &[("a1", &["coherence"]), ("a2", &["coherence"])]);
    let record = root.path().join("record.txt");
    let script = write_script(
        root.path(),
        "fake_evaluate.sh",
        &format!("echo \"$@\" >> {}\nexit 7\n", record.display()),
    );

    let config = BatchConfig {
        data_root,
        output_root: root.path().join("out"),
        budget: None,
        aggregate_after_each: false,
        evaluate_cmd: sh(&script),
        aggregate_cmd: vec!["false".to_string()],
        summary_filename: "summeval_spearman.json".to_string(),
        env_file: None,
    };
    let err = BatchRunner::new(config).unwrap().run().unwrap_err();

    assert!(matches!(err, BenchError::EvaluateFailed { status: 7, .. }));
    assert_eq!(err.child_exit_code(), Some(7));

    // a2 never ran
    let recorded = fs::read_to_string(&record).unwrap();
    assert_eq!(recorded.lines().count(), 1);
}

#[test]
fn aggregation_interleaves_and_receives_out_flags() {
    let root = TempDir::new().unwrap();
    let data_root = make_tree(root.path(), &[("a1", &["coherence", "fluency"])]);
    let record = root.path().join("record.txt");
    let eval_script = write_script(
        root.path(),
        "fake_evaluate.sh",
        &format!("echo \"eval $@\" >> {}\n", record.display()),
    );
    let agg_script = write_script(
        root.path(),
        "fake_aggregate.sh",
        &format!("echo \"agg $@\" >> {}\n", record.display()),
    );

    let config = BatchConfig {
        data_root,
        output_root: root.path().join("out"),
        budget: None,
        aggregate_after_each: true,
        evaluate_cmd: sh(&eval_script),
        aggregate_cmd: sh(&agg_script),
        summary_filename: "summeval_spearman.json".to_string(),
        env_file: None,
    };
    BatchRunner::new(config).unwrap().run().unwrap();

    let recorded = fs::read_to_string(&record).unwrap();
    let lines: Vec<&str> = recorded.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("eval "));
    assert!(lines[1].starts_with("agg "));
    assert!(lines[2].starts_with("eval "));
    assert!(lines[3].starts_with("agg "));
    assert_eq!(
        lines[1],
        format!(
            "agg --out_root {} --out_json {}",
            root.path().join("out").display(),
            root.path().join("out").join("summeval_spearman.json").display()
        )
    );
}

#[test]
fn env_file_entries_reach_the_child() {
    let root = TempDir::new().unwrap();
    let data_root = make_tree(root.path(), &[("a1", &["coherence"])]);
    let record = root.path().join("record.txt");
    let env_file = root.path().join("judge.env");
    fs::write(&env_file, "PAIRBENCH_JUDGE_KEY=sk-local\n").unwrap();
    let script = write_script(
        root.path(),
        "fake_evaluate.sh",
        &format!("echo \"$PAIRBENCH_JUDGE_KEY\" >> {}\n", record.display()),
    );

    let config = BatchConfig {
        data_root,
        output_root: root.path().join("out"),
        budget: None,
        aggregate_after_each: false,
        evaluate_cmd: sh(&script),
        aggregate_cmd: vec!["false".to_string()],
        summary_filename: "summeval_spearman.json".to_string(),
        env_file: Some(env_file),
    };
    BatchRunner::new(config).unwrap().run().unwrap();

    let recorded = fs::read_to_string(&record).unwrap();
    assert_eq!(recorded.trim(), "sk-local");
}
