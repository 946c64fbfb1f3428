use crate::support::{EXIT_USAGE, print_json};
use serde_json::json;
use skyknit_kernel::calculate_shaping_intervals;

pub fn run(delta: i64, rows: u32, stitches_per_action: u32, json_output: bool) {
    let intervals =
        calculate_shaping_intervals(delta, rows, stitches_per_action).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(EXIT_USAGE);
        });

    if json_output {
        let payload = json!({
            "stitchDelta": delta,
            "sectionDepthRows": rows,
            "stitchesPerAction": stitches_per_action,
            "intervals": intervals,
        });
        print_json(&payload, "shaping");
        return;
    }

    println!("skyknit shaping");
    println!("  Stitch delta: {delta}");
    println!("  Section depth: {rows} rows");
    if intervals.is_empty() {
        println!("  No shaping needed");
    }
    for interval in &intervals {
        println!(
            "  {} {} sts every {} rows, {} times",
            interval.action, interval.stitches_per_action, interval.every_n_rows, interval.times
        );
    }
}
