use nn_scoring::results::{CSV_HEADER, WritePermission};
use nn_scoring::suite::CaseOutcome;
use nn_scoring::{Backend, ModelRegistry, ScoringConfig, ScoringSuite, SuiteFilter, TestSize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

struct DenyWrites;

impl WritePermission for DenyWrites {
    fn check(&self) -> bool {
        false
    }
}

/// Counts how often the permission was asked for.
struct CountingPermission(Arc<AtomicUsize>);

impl WritePermission for CountingPermission {
    fn check(&self) -> bool {
        self.0.fetch_add(1, Ordering::SeqCst);
        true
    }
}

fn test_config(root: &Path, models: Option<Vec<&str>>) -> ScoringConfig {
    ScoringConfig {
        local_results_dir: root.join("data"),
        export_dir: root.join("sdcard"),
        warmup_seconds: 0.0,
        accelerator_threads: Some(2),
        dataset_limit: Some(2),
        models: models.map(|names| names.into_iter().map(String::from).collect()),
        ..ScoringConfig::default()
    }
}

fn small_suite(root: &TempDir) -> ScoringSuite {
    let config = test_config(root.path(), Some(vec!["tts_float", "mobilenet_v1_0.25_128_topk_aosp"]));
    ScoringSuite::new(config, ModelRegistry::builtin()).unwrap()
}

fn header_line() -> String {
    format!("{}\n", CSV_HEADER.join(","))
}

#[test]
fn test_setup_leaves_exactly_the_header() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);
    fs::create_dir_all(root.path().join("data")).unwrap();
    fs::write(suite.store().local_path(), "left,over\n1,2\n").unwrap();

    suite.before_all().unwrap();

    assert_eq!(
        fs::read_to_string(suite.store().local_path()).unwrap(),
        header_line()
    );
    assert_eq!(suite.store().row_count().unwrap(), 0);
}

#[test]
fn test_each_case_appends_exactly_one_row() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);
    suite.before_all().unwrap();

    let models = suite.models().unwrap();
    let mut expected_rows = 0;
    for model in &models {
        for backend in Backend::ALL {
            let result = suite.run_case(model, backend).unwrap();
            expected_rows += 1;
            assert_eq!(result.backend, backend);
            assert_eq!(suite.store().row_count().unwrap(), expected_rows);
        }
    }

    let content = fs::read_to_string(suite.store().local_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1 + 4);
    assert!(lines[1].starts_with("tts_float,tflite_cpu,"));
    assert!(lines[2].starts_with("tts_float,nnapi,"));
    assert!(lines[3].starts_with("mobilenet_v1_0.25_128_topk_aosp,tflite_cpu,"));
    assert!(lines[4].starts_with("mobilenet_v1_0.25_128_topk_aosp,nnapi,"));
}

#[test]
fn test_teardown_export_is_byte_identical() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);
    fs::create_dir_all(root.path().join("sdcard")).unwrap();
    fs::write(suite.store().export_path(), "stale export\n".repeat(100)).unwrap();

    let report = suite.run(&SuiteFilter::default()).unwrap();
    assert_eq!(report.cases.len(), 4);
    assert!(report.all_passed());

    let local = fs::read(suite.store().local_path()).unwrap();
    let exported = fs::read(suite.store().export_path()).unwrap();
    assert_eq!(local, exported);
    assert_eq!(suite.store().row_count().unwrap(), 4);
}

#[test]
fn test_cases_run_cpu_then_accelerated_per_model() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);
    let report = suite.run(&SuiteFilter::default()).unwrap();

    let order: Vec<(String, Backend)> = report
        .cases
        .iter()
        .map(|case: &CaseOutcome| (case.model.clone(), case.backend))
        .collect();
    assert_eq!(
        order,
        vec![
            ("tts_float".to_string(), Backend::Cpu),
            ("tts_float".to_string(), Backend::Accelerated),
            ("mobilenet_v1_0.25_128_topk_aosp".to_string(), Backend::Cpu),
            ("mobilenet_v1_0.25_128_topk_aosp".to_string(), Backend::Accelerated),
        ]
    );
    assert_eq!(report.cases[1].case_name(), "tts_float[nnapi]");
}

#[test]
fn test_missing_permission_fails_every_case_before_running() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root).with_permission(DenyWrites);

    let report = suite.run(&SuiteFilter::default()).unwrap();

    assert_eq!(report.cases.len(), 4);
    assert_eq!(report.passed(), 0);
    for case in &report.cases {
        let err = case.result.as_ref().unwrap_err();
        assert!(err.is_permission_denied(), "unexpected error: {}", err);
    }
    assert_eq!(suite.store().row_count().unwrap(), 0);
    assert_eq!(
        fs::read_to_string(suite.store().export_path()).unwrap(),
        header_line()
    );
}

#[test]
fn test_permission_is_checked_once_per_case() {
    let root = tempfile::tempdir().unwrap();
    let checks = Arc::new(AtomicUsize::new(0));
    let suite = small_suite(&root).with_permission(CountingPermission(Arc::clone(&checks)));

    suite.run(&SuiteFilter::default()).unwrap();
    assert_eq!(checks.load(Ordering::SeqCst), 4);
}

#[test]
fn test_rerunning_resets_the_local_file() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);

    suite.run(&SuiteFilter::default()).unwrap();
    assert_eq!(suite.store().row_count().unwrap(), 4);

    suite.run(&SuiteFilter::default()).unwrap();
    assert_eq!(suite.store().row_count().unwrap(), 4);
    assert_eq!(
        fs::read(suite.store().local_path()).unwrap(),
        fs::read(suite.store().export_path()).unwrap()
    );
}

#[test]
fn test_size_filter_excluding_large_runs_no_cases() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);
    let filter = SuiteFilter {
        size: TestSize::Small,
        name: None,
    };

    let report = suite.run(&filter).unwrap();
    assert!(report.cases.is_empty());
    assert_eq!(
        fs::read_to_string(suite.store().export_path()).unwrap(),
        header_line()
    );
}

#[test]
fn test_name_filter_selects_models() {
    let root = tempfile::tempdir().unwrap();
    let suite = small_suite(&root);
    let filter = SuiteFilter {
        name: Some("mobilenet".to_string()),
        ..SuiteFilter::default()
    };

    let report = suite.run(&filter).unwrap();
    assert_eq!(report.cases.len(), 2);
    assert!(report.cases.iter().all(|c| c.model.starts_with("mobilenet")));
}

#[test]
fn test_unknown_model_in_config_aborts_before_setup() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path(), Some(vec!["tts_float", "not_a_model"]));
    let suite = ScoringSuite::new(config, ModelRegistry::builtin()).unwrap();

    assert!(suite.run(&SuiteFilter::default()).is_err());
    assert!(!suite.store().local_path().exists());
}

#[test]
fn test_full_catalog_produces_one_row_per_model_and_backend() {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(root.path(), None);
    config.dataset_limit = Some(1);
    let suite = ScoringSuite::new(config, ModelRegistry::builtin()).unwrap();

    let report = suite.run(&SuiteFilter::default()).unwrap();
    assert_eq!(report.cases.len(), 30);
    assert!(report.all_passed());
    assert_eq!(suite.store().row_count().unwrap(), 30);
}
