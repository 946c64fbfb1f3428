//! Physical tolerance bands.
//!
//! Tolerance is always derived in millimetres:
//!
//! ```text
//! tolerance_mm = gauge_base_mm × ease_multiplier × precision
//! ```
//!
//! Stitch-count tolerances are computed from this value by callers, never
//! configured directly.

use crate::error::KernelError;
use crate::gauge::Gauge;
use crate::units::MM_PER_INCH;
use serde::{Deserialize, Serialize};

pub const EASE_MIN: f64 = 0.75;
pub const EASE_MAX: f64 = 2.0;

/// Precision preference; the multiplier widens or narrows the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionLevel {
    High,
    Medium,
    Low,
}

impl PrecisionLevel {
    pub fn value(self) -> f64 {
        match self {
            Self::High => 0.75,
            Self::Medium => 1.0,
            Self::Low => 1.5,
        }
    }
}

impl Default for PrecisionLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for PrecisionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for PrecisionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("unknown precision level: {s}")),
        }
    }
}

/// Width of one stitch in millimetres at `gauge`.
pub fn gauge_base_mm(gauge: &Gauge) -> f64 {
    MM_PER_INCH / gauge.stitches_per_inch()
}

/// Derive the physical tolerance in millimetres.
///
/// `ease_multiplier` must lie in `[0.75, 2.0]`; values outside fail rather
/// than being clamped.
pub fn calculate_tolerance_mm(
    gauge: &Gauge,
    ease_multiplier: f64,
    precision: PrecisionLevel,
) -> Result<f64, KernelError> {
    if !(EASE_MIN..=EASE_MAX).contains(&ease_multiplier) {
        return Err(KernelError::EaseOutOfRange {
            value: ease_multiplier,
            min: EASE_MIN,
            max: EASE_MAX,
        });
    }
    Ok(gauge_base_mm(gauge) * ease_multiplier * precision.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_base_is_one_stitch_width() {
        let g = Gauge::new(5.0, 7.0).unwrap();
        assert!((gauge_base_mm(&g) - 5.08).abs() < 1e-12);
    }

    #[test]
    fn precision_orders_tolerance() {
        let g = Gauge::new(5.0, 7.0).unwrap();
        let high = calculate_tolerance_mm(&g, 1.0, PrecisionLevel::High).unwrap();
        let medium = calculate_tolerance_mm(&g, 1.0, PrecisionLevel::Medium).unwrap();
        let low = calculate_tolerance_mm(&g, 1.0, PrecisionLevel::Low).unwrap();
        assert!(high < medium && medium < low);
        assert!((medium - 5.08).abs() < 1e-12);
    }

    #[test]
    fn ease_bounds_are_inclusive() {
        let g = Gauge::new(4.0, 6.0).unwrap();
        assert!(calculate_tolerance_mm(&g, 0.75, PrecisionLevel::Medium).is_ok());
        assert!(calculate_tolerance_mm(&g, 2.0, PrecisionLevel::Medium).is_ok());
    }

    #[test]
    fn ease_out_of_range_is_rejected() {
        let g = Gauge::new(4.0, 6.0).unwrap();
        for ease in [0.5, 2.01, f64::NAN] {
            let err = calculate_tolerance_mm(&g, ease, PrecisionLevel::Medium).unwrap_err();
            assert!(matches!(err, KernelError::EaseOutOfRange { .. }));
        }
    }

    #[test]
    fn precision_parse() {
        assert_eq!("HIGH".parse::<PrecisionLevel>().unwrap(), PrecisionLevel::High);
        assert_eq!("low".parse::<PrecisionLevel>().unwrap(), PrecisionLevel::Low);
        assert!("exact".parse::<PrecisionLevel>().is_err());
    }
}
