//! Knitting gauge.

use crate::error::KernelError;
use serde::{Deserialize, Serialize};

/// Stitch and row density of a fabric, per inch.
///
/// Both components are strictly positive; a `Gauge` that exists is valid.
/// Deserialization goes through the same check as [`Gauge::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGauge", rename_all = "camelCase")]
pub struct Gauge {
    stitches_per_inch: f64,
    rows_per_inch: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGauge {
    stitches_per_inch: f64,
    rows_per_inch: f64,
}

impl TryFrom<RawGauge> for Gauge {
    type Error = KernelError;

    fn try_from(raw: RawGauge) -> Result<Self, Self::Error> {
        Gauge::new(raw.stitches_per_inch, raw.rows_per_inch)
    }
}

impl Gauge {
    pub fn new(stitches_per_inch: f64, rows_per_inch: f64) -> Result<Self, KernelError> {
        if !(stitches_per_inch.is_finite() && stitches_per_inch > 0.0) {
            return Err(KernelError::InvalidGauge {
                field: "stitches_per_inch",
                value: stitches_per_inch,
            });
        }
        if !(rows_per_inch.is_finite() && rows_per_inch > 0.0) {
            return Err(KernelError::InvalidGauge {
                field: "rows_per_inch",
                value: rows_per_inch,
            });
        }
        Ok(Self {
            stitches_per_inch,
            rows_per_inch,
        })
    }

    pub fn stitches_per_inch(&self) -> f64 {
        self.stitches_per_inch
    }

    pub fn rows_per_inch(&self) -> f64 {
        self.rows_per_inch
    }
}

impl std::fmt::Display for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sts × {} rows per inch",
            self.stitches_per_inch, self.rows_per_inch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_components() {
        assert!(matches!(
            Gauge::new(0.0, 7.0),
            Err(KernelError::InvalidGauge {
                field: "stitches_per_inch",
                ..
            })
        ));
        assert!(matches!(
            Gauge::new(5.0, -1.0),
            Err(KernelError::InvalidGauge {
                field: "rows_per_inch",
                ..
            })
        ));
        assert!(Gauge::new(f64::NAN, 7.0).is_err());
    }

    #[test]
    fn deserialize_runs_validation() {
        let ok: Gauge =
            serde_json::from_str(r#"{"stitchesPerInch": 5.0, "rowsPerInch": 7.0}"#).unwrap();
        assert_eq!(ok.stitches_per_inch(), 5.0);
        assert_eq!(ok.rows_per_inch(), 7.0);

        let bad = serde_json::from_str::<Gauge>(r#"{"stitchesPerInch": 0.0, "rowsPerInch": 7.0}"#);
        assert!(bad.is_err());
    }
}
