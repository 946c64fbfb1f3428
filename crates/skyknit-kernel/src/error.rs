//! Error types for kernel preconditions.

/// A precondition of a kernel function was violated.
///
/// These are raised at the boundary of the call that received the bad
/// argument; nothing in the kernel clamps or substitutes values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// Gauge components must be strictly positive and finite.
    #[error("{field} must be positive, got {value}")]
    InvalidGauge { field: &'static str, value: f64 },

    /// Ease multiplier outside the supported band.
    #[error("ease_multiplier must be in [{min}, {max}], got {value}")]
    EaseOutOfRange { value: f64, min: f64, max: f64 },

    #[error("stitch_repeat must be >= 1, got {0}")]
    InvalidStitchRepeat(u32),

    #[error("tolerance_stitches must be >= 0, got {0}")]
    NegativeTolerance(f64),

    #[error("hard_constraints values must be >= 1, got {0}")]
    InvalidHardConstraint(u32),

    #[error("section_depth_rows must be >= 1, got {0}")]
    InvalidSectionDepth(u32),

    #[error("stitches_per_action must be >= 1, got {0}")]
    InvalidStitchesPerAction(u32),

    /// The net change cannot be expressed as a whole number of actions.
    #[error("stitch_delta ({delta}) must be divisible by stitches_per_action ({per_action})")]
    IndivisibleDelta { delta: i64, per_action: u32 },

    /// More shaping actions than rows to host them.
    #[error(
        "not enough rows ({rows}) for {actions} shaping actions (need at least 1 row per action)"
    )]
    ShapingCapacity { actions: u64, rows: u32 },

    /// Listing the band would produce more counts than the enumeration limit.
    #[error("tolerance band holds {counts} valid counts, more than the {limit} that can be listed")]
    BandTooWide { counts: u64, limit: u64 },

    /// A length argument that must be a finite, non-negative number.
    #[error("{field} must be a finite non-negative length, got {value}")]
    InvalidLength { field: &'static str, value: f64 },
}
