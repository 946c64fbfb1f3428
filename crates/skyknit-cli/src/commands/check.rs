use crate::config::SkyknitConfig;
use crate::support::{EXIT_REJECTED, load_registry_or_exit, print_json, read_json_file_or_exit};
use skyknit_checker::{CheckBundle, CheckerResult, ErrorType};
use std::path::PathBuf;

pub fn run(bundle: String, data_dir: Option<PathBuf>, config: &SkyknitConfig, json_output: bool) {
    let registry = load_registry_or_exit(data_dir, config);
    let payload: CheckBundle = read_json_file_or_exit(&bundle, "check bundle");
    let result = payload.check(&registry);

    if json_output {
        print_json(&result, "check");
    } else {
        render_human(&bundle, &result);
    }
    if !result.passed {
        std::process::exit(EXIT_REJECTED);
    }
}

fn render_human(bundle: &str, result: &CheckerResult) {
    let count = |error_type: ErrorType| {
        result
            .errors
            .iter()
            .filter(|error| error.error_type == error_type)
            .count()
    };
    println!("skyknit check");
    println!("  Bundle: {bundle}");
    println!(
        "  Result: {}",
        if result.passed { "passed" } else { "rejected" }
    );
    println!("  Errors: {}", result.errors.len());
    if !result.passed {
        println!("  Filler origin: {}", count(ErrorType::FillerOrigin));
        println!("  Geometric origin: {}", count(ErrorType::GeometricOrigin));
        for error in &result.errors {
            println!("    - {error}");
        }
    }
}
