use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skyknit",
    about = "Skyknit: stitch arithmetic and garment topology checks for knitting patterns",
    version
)]
pub struct Cli {
    /// Path to a skyknit.toml config file (default: ./skyknit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a {manifest, irs, constraints} bundle with the algebraic checker
    Check {
        /// Path to bundle JSON
        #[arg(long)]
        bundle: String,

        /// Directory of topology tables (default: built-in tables)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simulate one component's instruction sequence
    Simulate {
        /// Path to component IR JSON
        #[arg(long)]
        ir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a shape manifest's topology before any IR exists
    ValidateManifest {
        /// Path to shape manifest JSON
        #[arg(long)]
        manifest: String,

        /// Directory of topology tables (default: built-in tables)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load and validate the topology tables, then summarize them
    Registry {
        /// Directory of topology tables (default: built-in tables)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select a stitch count for a physical length
    SelectCount {
        /// Target length in millimetres
        #[arg(long)]
        length_mm: f64,

        /// Gauge: stitches per inch
        #[arg(long)]
        spi: f64,

        /// Gauge: rows per inch
        #[arg(long)]
        rpi: f64,

        /// Motif stitch repeat (1 = no repeat)
        #[arg(long, default_value_t = 1)]
        stitch_repeat: u32,

        /// Additional divisor the count must satisfy (repeatable)
        #[arg(long)]
        hard_constraint: Vec<u32>,

        /// Explicit tolerance in millimetres (overrides --ease/--precision)
        #[arg(long)]
        tolerance_mm: Option<f64>,

        /// Ease multiplier in [0.75, 2.0]
        #[arg(long)]
        ease: Option<f64>,

        /// Precision level: high, medium, or low
        #[arg(long)]
        precision: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Distribute a net stitch change over a section of rows
    Shaping {
        /// Net stitch change (positive = increases, negative = decreases)
        #[arg(long, allow_hyphen_values = true)]
        delta: i64,

        /// Section depth in rows
        #[arg(long)]
        rows: u32,

        /// Stitches changed per shaping row
        #[arg(long, default_value_t = skyknit_kernel::DEFAULT_STITCHES_PER_ACTION)]
        stitches_per_action: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive the physical tolerance band for a gauge
    Tolerance {
        /// Gauge: stitches per inch
        #[arg(long)]
        spi: f64,

        /// Gauge: rows per inch
        #[arg(long)]
        rpi: f64,

        /// Ease multiplier in [0.75, 2.0]
        #[arg(long)]
        ease: Option<f64>,

        /// Precision level: high, medium, or low
        #[arg(long)]
        precision: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
