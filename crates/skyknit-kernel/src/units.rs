//! Conversion between physical lengths (millimetres) and stitch/row counts.
//!
//! All functions are pure. Counts returned here are raw (fractional); turning
//! them into integers is the job of [`crate::repeats`].

use crate::gauge::Gauge;

/// The only inch/millimetre constant in the workspace.
pub const MM_PER_INCH: f64 = 25.4;

pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Raw (non-integer) stitch count spanning `length_mm` at `gauge`.
pub fn physical_to_stitch_count(length_mm: f64, gauge: &Gauge) -> f64 {
    mm_to_inches(length_mm) * gauge.stitches_per_inch()
}

/// Raw (non-integer) row count spanning `length_mm` at `gauge`.
pub fn physical_to_row_count(length_mm: f64, gauge: &Gauge) -> f64 {
    mm_to_inches(length_mm) * gauge.rows_per_inch()
}

pub fn stitch_count_to_physical(count: f64, gauge: &Gauge) -> f64 {
    inches_to_mm(count / gauge.stitches_per_inch())
}

pub fn row_count_to_physical(count: f64, gauge: &Gauge) -> f64 {
    inches_to_mm(count / gauge.rows_per_inch())
}

/// Integer row count for a physical depth, rounded to nearest.
///
/// Row-domain counterpart of
/// [`select_stitch_count_from_physical`](crate::repeats::select_stitch_count_from_physical),
/// used to size `section_depth_rows` for shaping.
pub fn physical_to_section_rows(length_mm: f64, gauge: &Gauge) -> u32 {
    let rows = physical_to_row_count(length_mm, gauge).round();
    if rows <= 0.0 { 0 } else { rows as u32 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge() -> Gauge {
        Gauge::new(5.0, 7.0).unwrap()
    }

    #[test]
    fn one_inch_is_one_gauge_unit() {
        let g = gauge();
        assert!((physical_to_stitch_count(25.4, &g) - 5.0).abs() < 1e-12);
        assert!((physical_to_row_count(25.4, &g) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_is_zero_count() {
        let g = gauge();
        assert_eq!(physical_to_stitch_count(0.0, &g), 0.0);
        assert_eq!(physical_to_row_count(0.0, &g), 0.0);
        assert_eq!(physical_to_section_rows(0.0, &g), 0);
    }

    #[test]
    fn inverse_conversions_recover_length() {
        let g = gauge();
        let sts = physical_to_stitch_count(508.0, &g);
        assert!((stitch_count_to_physical(sts, &g) - 508.0).abs() < 1e-9);
        let rows = physical_to_row_count(355.6, &g);
        assert!((row_count_to_physical(rows, &g) - 355.6).abs() < 1e-9);
    }

    #[test]
    fn section_rows_round_to_nearest() {
        // 100 mm at 7 rows/inch = 27.559 rows.
        assert_eq!(physical_to_section_rows(100.0, &gauge()), 28);
    }
}
