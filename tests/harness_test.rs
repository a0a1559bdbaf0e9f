use nn_scoring::harness::{BenchmarkHarness, HarnessSettings, TestAction};
use nn_scoring::{Backend, ModelEntry, ModelRegistry};

fn model(name: &str) -> ModelEntry {
    ModelRegistry::builtin().model_by_name(name).unwrap().clone()
}

fn harness(use_accelerator: bool, complete_input_set: bool, dataset_limit: usize) -> BenchmarkHarness {
    let mut harness = BenchmarkHarness::new(HarnessSettings {
        accelerator_threads: Some(2),
        dataset_limit: Some(dataset_limit),
        run_seconds: 0.05,
        ..HarnessSettings::default()
    });
    harness.set_use_accelerator(use_accelerator);
    harness.set_complete_input_set(complete_input_set);
    harness
}

#[test]
fn test_action_has_no_result_before_running() {
    let action = TestAction::new(model("asr_float"), 0.0, 300.0);
    assert!(action.benchmark().is_none());
    assert_eq!(action.model().name, "asr_float");
}

#[test]
fn test_complete_set_runs_every_sample_once() {
    for use_accelerator in [false, true] {
        let harness = harness(use_accelerator, true, 5);
        let mut action = TestAction::new(model("mobilenet_v1_0.25_128_topk_aosp"), 0.0, 300.0);
        harness
            .run_test(&mut action, "mobilenet_v1_0.25_128_topk_aosp")
            .unwrap();

        let result = action.benchmark().unwrap();
        assert_eq!(result.test_name, "mobilenet_v1_0.25_128_topk_aosp");
        assert_eq!(result.backend, harness.backend());
        assert_eq!(result.iterations, 5);
        assert!(result.complete_input_set);
        assert!(!result.timed_out);
        assert_eq!(result.evaluation.top1_accuracy, Some(1.0));
        assert_eq!(result.evaluation.top5_accuracy, Some(1.0));
        assert_eq!(result.evaluation.mean_squared_error, None);
        assert!(result.latency.min <= result.latency.p50);
        assert!(result.latency.p50 <= result.latency.max);
    }
}

#[test]
fn test_quantized_model_is_scored_against_float_reference() {
    let harness = harness(true, true, 8);
    let mut action = TestAction::new(model("mobilenet_v1_0.25_128_quant_topk_aosp"), 0.0, 300.0);
    harness.run_test(&mut action, "quant").unwrap();

    let result = action.into_benchmark().unwrap();
    assert_eq!(result.backend, Backend::Accelerated);
    let top1 = result.evaluation.top1_accuracy.unwrap();
    let top5 = result.evaluation.top5_accuracy.unwrap();
    assert!((0.0..=1.0).contains(&top1));
    assert!(top5 >= top1);
}

#[test]
fn test_regression_model_reports_mean_squared_error() {
    let harness = harness(false, true, 4);
    let mut action = TestAction::new(model("tts_float"), 0.0, 300.0);
    harness.run_test(&mut action, "tts_float").unwrap();

    let result = action.benchmark().unwrap();
    assert_eq!(result.evaluation.mean_squared_error, Some(0.0));
    assert_eq!(result.evaluation.top1_accuracy, None);
}

#[test]
fn test_complete_set_stops_at_timeout() {
    let harness = harness(false, true, 5);
    let mut action = TestAction::new(model("asr_float"), 0.0, 1e-9);
    harness.run_test(&mut action, "asr_float").unwrap();

    let result = action.benchmark().unwrap();
    assert!(result.timed_out);
    assert_eq!(result.iterations, 1);
}

#[test]
fn test_timed_mode_cycles_until_run_time_elapses() {
    let harness = harness(false, false, 3);
    let mut action = TestAction::new(model("asr_float"), 0.01, 300.0);
    harness.run_test(&mut action, "asr_float").unwrap();

    let result = action.benchmark().unwrap();
    assert!(!result.complete_input_set);
    assert!(!result.timed_out);
    assert!(result.iterations >= 1);
    assert!(result.total_time_sec >= 0.05);
}
