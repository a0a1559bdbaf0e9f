//! Scoring suite CLI executable.

use log::error;
use nn_scoring::errors::ScoringResult;
use nn_scoring::{ConfigLoader, ModelRegistry, ScoringSuite, SuiteFilter, TestSize};
use std::env;
use std::process;

const DEFAULT_CONFIG_PATH: &str = "configs/scoring.json";

struct CliOptions {
    config_path: String,
    models_path: Option<String>,
    filter: SuiteFilter,
    list: bool,
}

fn main() {
    env_logger::init();

    let options = match parse_args(env::args().skip(1).collect()) {
        Some(options) => options,
        None => {
            print_usage();
            process::exit(2);
        }
    };

    match run(options) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Scoring failed: {}", e);
            process::exit(1);
        }
    }
}

fn parse_args(args: Vec<String>) -> Option<CliOptions> {
    let mut options = CliOptions {
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        models_path: None,
        filter: SuiteFilter::default(),
        list: false,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list" => options.list = true,
            "--config" => options.config_path = args.next()?,
            "--models" => options.models_path = Some(args.next()?),
            "--filter" => options.filter.name = Some(args.next()?),
            "--size" => options.filter.size = TestSize::parse(&args.next()?)?,
            _ => return None,
        }
    }
    Some(options)
}

/// Returns whether every selected case passed.
fn run(options: CliOptions) -> ScoringResult<bool> {
    let config = ConfigLoader::load_config(&options.config_path)?;
    let mut registry = ModelRegistry::builtin();
    if let Some(path) = &options.models_path {
        registry.extend_from_file(path)?;
    }

    let suite = ScoringSuite::new(config, registry)?;

    if options.list {
        println!("Scored models:");
        for model in suite.models()? {
            println!(
                "  {:<40} {:?} {}",
                model.name, model.family, model.precision
            );
        }
        return Ok(true);
    }

    let report = suite.run(&options.filter)?;

    println!("\n{}", "=".repeat(80));
    println!("Scoring Results");
    println!("{}", "=".repeat(80));
    for case in &report.cases {
        match &case.result {
            Ok(result) => println!(
                "  PASS {:<55} {:>9.3} ms  ({} inferences)",
                case.case_name(),
                result.mean_latency_ms(),
                result.iterations
            ),
            Err(e) => println!("  FAIL {:<55} {}", case.case_name(), e),
        }
    }

    let speedups = report.speedups();
    if !speedups.is_empty() {
        println!("\nAccelerated speedup over CPU:");
        for (model, speedup) in speedups {
            println!("  {:<60} {:>6.2}x", model, speedup);
        }
    }
    println!(
        "\n{} passed, {} failed. Results: {}",
        report.passed(),
        report.failed(),
        suite.store().export_path().display()
    );

    Ok(report.all_passed())
}

fn print_usage() {
    println!("Usage:");
    println!("  nn-scoring [--config <path>] [--models <path>] [--size <small|medium|large>] [--filter <text>]");
    println!("  nn-scoring --list                  # List scored models");
    println!();
    println!("Options:");
    println!("  --config <path>   Suite configuration (default: {})", DEFAULT_CONFIG_PATH);
    println!("  --models <path>   JSON array of extra model entries");
    println!("  --size <size>     Test size filter; scoring cases are large (default: large)");
    println!("  --filter <text>   Only run models whose name contains <text>");
}
