//! Pattern-repeat arithmetic: enumerate and select integer stitch counts.
//!
//! A raw stitch count comes out of gauge conversion as a fraction. The valid
//! integer counts are the positive multiples of the effective repeat (LCM of
//! the motif repeat and every hard constraint) inside the tolerance band
//! `[raw − tolerance, raw + tolerance]`.
//!
//! [`select_stitch_count_from_physical`] is the single entry point both the
//! instruction generator and the checker use; a second implementation of the
//! same rule is a correctness bug by definition.

use crate::error::KernelError;
use crate::gauge::Gauge;
use crate::tolerance::gauge_base_mm;
use crate::units::physical_to_stitch_count;

/// Slack on band edges so that values produced by chained float conversions
/// (e.g. a tolerance of exactly one stitch width) do not fall out of the band.
const BAND_EPSILON: f64 = 1e-9;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

/// Most counts [`find_valid_counts`] will list. Selection never enumerates,
/// so it has no such bound.
pub const MAX_LISTED_COUNTS: u64 = 1_000_000;

/// Validated arguments shared by enumeration and selection: the effective
/// repeat and the smallest and largest valid multiples in the band.
struct Band {
    step: f64,
    first: f64,
    last: f64,
}

impl Band {
    fn new(
        raw_target: f64,
        tolerance_stitches: f64,
        stitch_repeat: u32,
        hard_constraints: &[u32],
    ) -> Result<Self, KernelError> {
        if stitch_repeat < 1 {
            return Err(KernelError::InvalidStitchRepeat(stitch_repeat));
        }
        if !(tolerance_stitches >= 0.0) {
            return Err(KernelError::NegativeTolerance(tolerance_stitches));
        }
        if !raw_target.is_finite() {
            return Err(KernelError::InvalidLength {
                field: "raw_target",
                value: raw_target,
            });
        }
        let mut effective_repeat = u64::from(stitch_repeat);
        for &constraint in hard_constraints {
            if constraint < 1 {
                return Err(KernelError::InvalidHardConstraint(constraint));
            }
            effective_repeat = lcm(effective_repeat, u64::from(constraint));
        }

        let step = effective_repeat as f64;
        let low = raw_target - tolerance_stitches - BAND_EPSILON;
        let high = (raw_target + tolerance_stitches + BAND_EPSILON).min(f64::from(u32::MAX));
        // Stitch counts are positive even when the band dips below zero.
        let first = ((low / step).ceil() * step).max(step);
        let last = (high / step).floor() * step;
        Ok(Self { step, first, last })
    }

    fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Number of valid counts in the band.
    fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            ((self.last - self.first) / self.step).round() as u64 + 1
        }
    }
}

/// Every positive integer in the tolerance band divisible by `stitch_repeat`
/// and by each value in `hard_constraints`, in ascending order.
///
/// `stitch_repeat = 1` imposes no repeat. An empty result is a normal answer,
/// not an error; only malformed arguments fail, and so does a band holding
/// more than [`MAX_LISTED_COUNTS`] counts.
pub fn find_valid_counts(
    raw_target: f64,
    tolerance_stitches: f64,
    stitch_repeat: u32,
    hard_constraints: &[u32],
) -> Result<Vec<u32>, KernelError> {
    let band = Band::new(raw_target, tolerance_stitches, stitch_repeat, hard_constraints)?;
    let len = band.len();
    if len > MAX_LISTED_COUNTS {
        return Err(KernelError::BandTooWide {
            counts: len,
            limit: MAX_LISTED_COUNTS,
        });
    }
    let mut counts = Vec::with_capacity(len as usize);
    let mut candidate = band.first;
    while candidate <= band.last {
        counts.push(candidate as u32);
        candidate += band.step;
    }
    Ok(counts)
}

/// Pick the valid count closest to `raw_target`; exact ties go to the larger
/// count.
///
/// `Ok(None)` means no count qualifies and the caller must escalate (widen
/// tolerance, change motif, re-plan). This function never substitutes a
/// nearest guess. The answer is computed from the two multiples around the
/// target, so the width of the band does not matter.
pub fn select_stitch_count(
    raw_target: f64,
    tolerance_stitches: f64,
    stitch_repeat: u32,
    hard_constraints: &[u32],
) -> Result<Option<u32>, KernelError> {
    let band = Band::new(raw_target, tolerance_stitches, stitch_repeat, hard_constraints)?;
    if band.is_empty() {
        return Ok(None);
    }

    let below = (raw_target / band.step).floor() * band.step;
    let below = below.clamp(band.first, band.last);
    let above = (below + band.step).clamp(band.first, band.last);
    let distance_below = (below - raw_target).abs();
    let distance_above = (above - raw_target).abs();
    let tie = (distance_above - distance_below).abs() <= BAND_EPSILON;
    let best = if tie || distance_above < distance_below {
        above
    } else {
        below
    };
    Ok(Some(best as u32))
}

/// Select a stitch count for a physical length.
///
/// `tolerance_mm` is converted to stitches via [`gauge_base_mm`] before
/// delegating to [`select_stitch_count`].
pub fn select_stitch_count_from_physical(
    length_mm: f64,
    gauge: &Gauge,
    tolerance_mm: f64,
    stitch_repeat: u32,
    hard_constraints: &[u32],
) -> Result<Option<u32>, KernelError> {
    if !(length_mm.is_finite() && length_mm >= 0.0) {
        return Err(KernelError::InvalidLength {
            field: "length_mm",
            value: length_mm,
        });
    }
    if !(tolerance_mm.is_finite() && tolerance_mm >= 0.0) {
        return Err(KernelError::InvalidLength {
            field: "tolerance_mm",
            value: tolerance_mm,
        });
    }
    let raw_target = physical_to_stitch_count(length_mm, gauge);
    let tolerance_stitches = tolerance_mm / gauge_base_mm(gauge);
    let selected = select_stitch_count(
        raw_target,
        tolerance_stitches,
        stitch_repeat,
        hard_constraints,
    )?;
    match selected {
        Some(count) => tracing::trace!(
            length_mm,
            raw_target,
            tolerance_stitches,
            stitch_repeat,
            count,
            "selected stitch count"
        ),
        None => tracing::debug!(
            length_mm,
            raw_target,
            tolerance_stitches,
            stitch_repeat,
            ?hard_constraints,
            "no valid stitch count in tolerance band; escalation required"
        ),
    }
    Ok(selected)
}
