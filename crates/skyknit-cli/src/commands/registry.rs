use crate::config::SkyknitConfig;
use crate::support::{load_registry_or_exit, print_json};
use std::path::PathBuf;

pub fn run(data_dir: Option<PathBuf>, config: &SkyknitConfig, json_output: bool) {
    let registry = load_registry_or_exit(data_dir, config);
    let summary = registry.summary();

    if json_output {
        print_json(&summary, "registry");
        return;
    }

    println!("skyknit registry");
    println!("  Digest: {}", summary.digest);
    for (table, version) in &summary.versions {
        println!("  Table {table}: v{version}");
    }
    println!("  Edge types: {}", summary.edge_types);
    println!("  Join types: {}", summary.join_types);
    println!(
        "  Compatibility entries: {} ({} conditional)",
        summary.compatibility_entries, summary.conditional_entries
    );
    println!("  Default-parameter entries: {}", summary.default_entries);
}
