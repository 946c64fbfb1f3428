use crate::config::SkyknitConfig;
use crate::support::{EXIT_REJECTED, load_registry_or_exit, print_json, read_json_file_or_exit};
use skyknit_checker::{Severity, validate_manifest};
use skyknit_schemas::ShapeManifest;
use std::path::PathBuf;

pub fn run(manifest: String, data_dir: Option<PathBuf>, config: &SkyknitConfig, json_output: bool) {
    let registry = load_registry_or_exit(data_dir, config);
    let payload: ShapeManifest = read_json_file_or_exit(&manifest, "shape manifest");
    let result = validate_manifest(&payload, &registry);

    if json_output {
        print_json(&result, "validate-manifest");
    } else {
        println!("skyknit validate-manifest");
        println!("  Manifest: {manifest}");
        println!("  Components: {}", payload.components.len());
        println!("  Joins: {}", payload.joins.len());
        println!(
            "  Result: {}",
            if result.passed { "passed" } else { "rejected" }
        );
        println!("  Errors: {}", result.errors().count());
        println!("  Warnings: {}", result.warnings().count());
        for issue in &result.issues {
            let tag = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            println!("    - [{tag}] {}: {}", issue.path, issue.message);
        }
    }
    if !result.passed {
        std::process::exit(EXIT_REJECTED);
    }
}
