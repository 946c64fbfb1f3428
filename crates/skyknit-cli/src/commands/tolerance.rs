use crate::config::SkyknitConfig;
use crate::support::{EXIT_USAGE, gauge_or_exit, precision_or_exit, print_json};
use serde_json::json;
use skyknit_kernel::{calculate_tolerance_mm, gauge_base_mm};

pub fn run(
    spi: f64,
    rpi: f64,
    ease: Option<f64>,
    precision: Option<String>,
    config: &SkyknitConfig,
    json_output: bool,
) {
    let gauge = gauge_or_exit(spi, rpi);
    let ease = ease.unwrap_or(config.tolerance.ease_multiplier);
    let precision = precision_or_exit(precision.as_deref(), config);
    let tolerance_mm = calculate_tolerance_mm(&gauge, ease, precision).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    });

    if json_output {
        let payload = json!({
            "gaugeBaseMm": gauge_base_mm(&gauge),
            "easeMultiplier": ease,
            "precision": precision,
            "toleranceMm": tolerance_mm,
        });
        print_json(&payload, "tolerance");
        return;
    }

    println!("skyknit tolerance");
    println!("  Stitch width: {:.2} mm", gauge_base_mm(&gauge));
    println!("  Ease multiplier: {ease}");
    println!("  Precision: {precision}");
    println!("  Tolerance: {tolerance_mm:.2} mm");
}
