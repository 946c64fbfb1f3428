//! Shaping distribution: spread a net stitch change across a section.
//!
//! When the rows do not divide evenly among the actions, two intervals are
//! produced whose rates differ by one row, the standard hand-knitting form
//! ("decrease every 4th row 7 times, then every 5th row 3 times"). The more
//! frequent interval comes first.

use crate::error::KernelError;
use serde::{Deserialize, Serialize};

/// One decrease or increase at each edge.
pub const DEFAULT_STITCHES_PER_ACTION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapingAction {
    Increase,
    Decrease,
}

impl std::fmt::Display for ShapingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increase => write!(f, "increase"),
            Self::Decrease => write!(f, "decrease"),
        }
    }
}

/// Perform `action` every `every_n_rows` rows, `times` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapingInterval {
    pub action: ShapingAction,
    pub every_n_rows: u32,
    pub times: u32,
    pub stitches_per_action: u32,
}

impl ShapingInterval {
    /// Rows this interval occupies.
    pub fn rows(&self) -> u64 {
        u64::from(self.every_n_rows) * u64::from(self.times)
    }

    /// Stitches this interval adds or removes (unsigned).
    pub fn stitches(&self) -> u64 {
        u64::from(self.stitches_per_action) * u64::from(self.times)
    }
}

/// Distribute `stitch_delta` (positive = increases) over `section_depth_rows`.
///
/// Returns an empty list for a zero delta, one interval when the rows divide
/// evenly among the actions, otherwise exactly two. The rows and stitches of
/// the returned intervals always sum to `section_depth_rows` and
/// `|stitch_delta|`.
pub fn calculate_shaping_intervals(
    stitch_delta: i64,
    section_depth_rows: u32,
    stitches_per_action: u32,
) -> Result<Vec<ShapingInterval>, KernelError> {
    if stitch_delta == 0 {
        return Ok(Vec::new());
    }
    if section_depth_rows < 1 {
        return Err(KernelError::InvalidSectionDepth(section_depth_rows));
    }
    if stitches_per_action < 1 {
        return Err(KernelError::InvalidStitchesPerAction(stitches_per_action));
    }

    let action = if stitch_delta > 0 {
        ShapingAction::Increase
    } else {
        ShapingAction::Decrease
    };
    let magnitude = stitch_delta.unsigned_abs();
    let per_action = u64::from(stitches_per_action);
    if magnitude % per_action != 0 {
        return Err(KernelError::IndivisibleDelta {
            delta: stitch_delta,
            per_action: stitches_per_action,
        });
    }

    let actions = magnitude / per_action;
    let rows = u64::from(section_depth_rows);
    if actions > rows {
        return Err(KernelError::ShapingCapacity {
            actions,
            rows: section_depth_rows,
        });
    }

    // actions <= rows <= u32::MAX, so every quotient below fits in u32.
    let base = (rows / actions) as u32;
    let remainder = (rows % actions) as u32;
    let actions = actions as u32;

    let interval = |every_n_rows: u32, times: u32| ShapingInterval {
        action,
        every_n_rows,
        times,
        stitches_per_action,
    };

    if remainder == 0 {
        return Ok(vec![interval(base, actions)]);
    }
    Ok(vec![
        interval(base, actions - remainder),
        interval(base + 1, remainder),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(intervals: &[ShapingInterval]) -> (u64, u64) {
        (
            intervals.iter().map(ShapingInterval::rows).sum(),
            intervals.iter().map(ShapingInterval::stitches).sum(),
        )
    }

    #[test]
    fn zero_delta_is_empty() {
        assert!(calculate_shaping_intervals(0, 40, 2).unwrap().is_empty());
    }

    #[test]
    fn even_decrease_is_one_interval() {
        let result = calculate_shaping_intervals(-20, 40, 2).unwrap();
        assert_eq!(
            result,
            vec![ShapingInterval {
                action: ShapingAction::Decrease,
                every_n_rows: 4,
                times: 10,
                stitches_per_action: 2,
            }]
        );
        assert_eq!(totals(&result), (40, 20));
    }

    #[test]
    fn uneven_decrease_is_two_intervals() {
        let result = calculate_shaping_intervals(-20, 43, 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!((result[0].every_n_rows, result[0].times), (4, 7));
        assert_eq!((result[1].every_n_rows, result[1].times), (5, 3));
        assert_eq!(totals(&result), (43, 20));
    }

    #[test]
    fn increase_labels_and_custom_action_width() {
        let result = calculate_shaping_intervals(30, 30, 3).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].action, ShapingAction::Increase);
        assert_eq!(result[0].times, 10);
        assert_eq!(result[0].every_n_rows, 3);
    }

    #[test]
    fn every_row_and_single_action_edges() {
        let every_row = calculate_shaping_intervals(-20, 10, 2).unwrap();
        assert_eq!((every_row[0].every_n_rows, every_row[0].times), (1, 10));
        let single = calculate_shaping_intervals(-2, 10, 2).unwrap();
        assert_eq!((single[0].every_n_rows, single[0].times), (10, 1));
    }

    #[test]
    fn over_capacity_fails() {
        assert_eq!(
            calculate_shaping_intervals(-20, 5, 2).unwrap_err(),
            KernelError::ShapingCapacity {
                actions: 10,
                rows: 5
            }
        );
    }

    #[test]
    fn malformed_arguments_fail() {
        assert_eq!(
            calculate_shaping_intervals(-20, 0, 2).unwrap_err(),
            KernelError::InvalidSectionDepth(0)
        );
        assert_eq!(
            calculate_shaping_intervals(-20, 40, 0).unwrap_err(),
            KernelError::InvalidStitchesPerAction(0)
        );
        assert_eq!(
            calculate_shaping_intervals(-7, 40, 2).unwrap_err(),
            KernelError::IndivisibleDelta {
                delta: -7,
                per_action: 2
            }
        );
    }
}
