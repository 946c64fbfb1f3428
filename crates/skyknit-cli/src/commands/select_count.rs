use crate::config::SkyknitConfig;
use crate::support::{EXIT_REJECTED, EXIT_USAGE, gauge_or_exit, precision_or_exit, print_json};
use serde::Serialize;
use skyknit_kernel::{
    Gauge, KernelError, calculate_tolerance_mm, find_valid_counts, gauge_base_mm,
    physical_to_stitch_count, select_stitch_count_from_physical,
};
use tracing::debug;

pub struct Args {
    pub length_mm: f64,
    pub spi: f64,
    pub rpi: f64,
    pub stitch_repeat: u32,
    pub hard_constraints: Vec<u32>,
    pub tolerance_mm: Option<f64>,
    pub ease: Option<f64>,
    pub precision: Option<String>,
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectCountReport {
    length_mm: f64,
    stitches_per_inch: f64,
    rows_per_inch: f64,
    tolerance_mm: f64,
    stitch_repeat: u32,
    hard_constraints: Vec<u32>,
    raw_target: f64,
    /// `None` when the band is too wide to list.
    valid_counts: Option<Vec<u32>>,
    selected: Option<u32>,
    escalate: bool,
}

pub fn run(args: Args, config: &SkyknitConfig) {
    let gauge = gauge_or_exit(args.spi, args.rpi);
    let tolerance_mm = resolve_tolerance_or_exit(&args, &gauge, config);

    let selected = select_stitch_count_from_physical(
        args.length_mm,
        &gauge,
        tolerance_mm,
        args.stitch_repeat,
        &args.hard_constraints,
    )
    .unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    });
    let raw_target = physical_to_stitch_count(args.length_mm, &gauge);
    // Very wide bands are not listed; the selection above never enumerates.
    let valid_counts = match find_valid_counts(
        raw_target,
        tolerance_mm / gauge_base_mm(&gauge),
        args.stitch_repeat,
        &args.hard_constraints,
    ) {
        Ok(counts) => Some(counts),
        Err(KernelError::BandTooWide { counts, .. }) => {
            debug!(counts, "valid counts not listed");
            None
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(EXIT_USAGE);
        }
    };

    let report = SelectCountReport {
        length_mm: args.length_mm,
        stitches_per_inch: gauge.stitches_per_inch(),
        rows_per_inch: gauge.rows_per_inch(),
        tolerance_mm,
        stitch_repeat: args.stitch_repeat,
        hard_constraints: args.hard_constraints,
        raw_target,
        valid_counts,
        selected,
        escalate: selected.is_none(),
    };

    if args.json {
        print_json(&report, "select-count");
    } else {
        println!("skyknit select-count");
        println!("  Length: {} mm", report.length_mm);
        println!("  Raw target: {:.2} stitches", report.raw_target);
        println!("  Tolerance: {:.2} mm", report.tolerance_mm);
        println!("  Stitch repeat: {}", report.stitch_repeat);
        if !report.hard_constraints.is_empty() {
            println!("  Hard constraints: {:?}", report.hard_constraints);
        }
        match &report.valid_counts {
            Some(counts) => println!("  Valid counts: {counts:?}"),
            None => println!("  Valid counts: too many to list"),
        }
        match report.selected {
            Some(count) => println!("  Selected: {count}"),
            None => println!("  Selected: none (escalate: widen tolerance or change motif)"),
        }
    }
    if report.escalate {
        std::process::exit(EXIT_REJECTED);
    }
}

/// `--tolerance-mm` wins; otherwise the band is derived from ease and
/// precision, each falling back to the config file.
fn resolve_tolerance_or_exit(args: &Args, gauge: &Gauge, config: &SkyknitConfig) -> f64 {
    if let Some(tolerance_mm) = args.tolerance_mm {
        return tolerance_mm;
    }
    let ease = args.ease.unwrap_or(config.tolerance.ease_multiplier);
    let precision = precision_or_exit(args.precision.as_deref(), config);
    calculate_tolerance_mm(gauge, ease, precision).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    })
}
