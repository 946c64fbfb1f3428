//! # Skyknit Kernel
//!
//! Deterministic numeric tools shared by the instruction generator and the
//! algebraic checker: a physical length becomes a stitch count in exactly one
//! way, so the two sides can never disagree about arithmetic they both
//! perform.
//!
//! ## Architecture
//!
//! ```text
//! Gauge                 ← stitches/rows per inch, validated at construction
//!     │
//! units                 ← mm ⇄ stitch/row counts (25.4 mm per inch)
//!     │
//! tolerance             ← gauge_base_mm × ease × precision
//!     │
//! repeats               ← tolerance band → valid integer counts → selection
//!     │
//! shaping               ← net stitch change over N rows → 1 or 2 intervals
//! ```

pub mod error;
pub mod gauge;
pub mod repeats;
pub mod shaping;
pub mod tolerance;
pub mod units;

pub use error::KernelError;
pub use gauge::Gauge;
pub use repeats::{find_valid_counts, select_stitch_count, select_stitch_count_from_physical};
pub use shaping::{
    DEFAULT_STITCHES_PER_ACTION, ShapingAction, ShapingInterval, calculate_shaping_intervals,
};
pub use tolerance::{PrecisionLevel, calculate_tolerance_mm, gauge_base_mm};
pub use units::{
    MM_PER_INCH, inches_to_mm, mm_to_inches, physical_to_row_count, physical_to_section_rows,
    physical_to_stitch_count, row_count_to_physical, stitch_count_to_physical,
};
