//! Property tests for the universally quantified kernel invariants.

use proptest::prelude::*;
use skyknit_kernel::{
    Gauge, KernelError, PrecisionLevel, ShapingAction, calculate_shaping_intervals,
    calculate_tolerance_mm, find_valid_counts, physical_to_stitch_count, select_stitch_count,
    stitch_count_to_physical,
};

fn gauge_strategy() -> impl Strategy<Value = Gauge> {
    (0.5f64..20.0, 0.5f64..30.0).prop_map(|(sts, rows)| Gauge::new(sts, rows).unwrap())
}

proptest! {
    #[test]
    fn stitch_conversion_round_trips(gauge in gauge_strategy(), length_mm in 0.0f64..100_000.0) {
        let back = stitch_count_to_physical(physical_to_stitch_count(length_mm, &gauge), &gauge);
        prop_assert!((back - length_mm).abs() <= 1e-9 * length_mm.max(1.0));
    }

    #[test]
    fn tolerance_is_monotone_in_ease(gauge in gauge_strategy(), a in 0.75f64..=2.0, b in 0.75f64..=2.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let t_lo = calculate_tolerance_mm(&gauge, lo, PrecisionLevel::Medium).unwrap();
        let t_hi = calculate_tolerance_mm(&gauge, hi, PrecisionLevel::Medium).unwrap();
        prop_assert!(t_lo <= t_hi);
    }

    #[test]
    fn tolerance_orders_by_precision(gauge in gauge_strategy(), ease in 0.75f64..=2.0) {
        let high = calculate_tolerance_mm(&gauge, ease, PrecisionLevel::High).unwrap();
        let medium = calculate_tolerance_mm(&gauge, ease, PrecisionLevel::Medium).unwrap();
        let low = calculate_tolerance_mm(&gauge, ease, PrecisionLevel::Low).unwrap();
        prop_assert!(high < medium);
        prop_assert!(medium < low);
    }

    #[test]
    fn repeat_of_one_returns_every_integer(target in 1u32..1_000, k in 0u32..50) {
        let counts = find_valid_counts(f64::from(target), f64::from(k), 1, &[]).unwrap();
        let expected: Vec<u32> = (target.saturating_sub(k).max(1)..=target + k).collect();
        prop_assert_eq!(counts, expected);
    }

    #[test]
    fn valid_counts_satisfy_every_divisor(
        target in 1.0f64..2_000.0,
        tolerance in 0.0f64..40.0,
        repeat in 1u32..12,
        hard in proptest::collection::vec(1u32..8, 0..3),
    ) {
        let counts = find_valid_counts(target, tolerance, repeat, &hard).unwrap();
        prop_assert!(counts.windows(2).all(|w| w[0] < w[1]));
        for count in &counts {
            prop_assert!(*count >= 1);
            prop_assert_eq!(count % repeat, 0);
            for c in &hard {
                prop_assert_eq!(count % c, 0);
            }
            prop_assert!((f64::from(*count) - target).abs() <= tolerance + 1e-6);
        }
        let selected = select_stitch_count(target, tolerance, repeat, &hard).unwrap();
        prop_assert_eq!(selected.is_some(), !counts.is_empty());
        let nearest = counts.iter().copied().fold(None, |best: Option<u32>, count| match best {
            Some(best)
                if (f64::from(best) - target).abs() + 1e-9 < (f64::from(count) - target).abs() =>
            {
                Some(best)
            }
            _ => Some(count),
        });
        prop_assert_eq!(selected, nearest);
    }

    #[test]
    fn shaping_sums_are_exact(
        actions in 1u32..100,
        per_action in 1u32..5,
        extra_rows in 0u32..300,
        increase in any::<bool>(),
    ) {
        let rows = actions + extra_rows;
        let magnitude = i64::from(actions) * i64::from(per_action);
        let delta = if increase { magnitude } else { -magnitude };
        let intervals = calculate_shaping_intervals(delta, rows, per_action).unwrap();

        prop_assert!(intervals.len() == 1 || intervals.len() == 2);
        if let [first, second] = intervals.as_slice() {
            prop_assert_eq!(first.every_n_rows + 1, second.every_n_rows);
        }
        let expected_action = if increase { ShapingAction::Increase } else { ShapingAction::Decrease };
        prop_assert!(intervals.iter().all(|i| i.action == expected_action));

        let row_sum: u64 = intervals.iter().map(|i| i.rows()).sum();
        let stitch_sum: u64 = intervals.iter().map(|i| i.stitches()).sum();
        prop_assert_eq!(row_sum, u64::from(rows));
        prop_assert_eq!(stitch_sum, magnitude.unsigned_abs());
    }

    #[test]
    fn shaping_over_capacity_always_fails(rows in 1u32..200, excess in 1u32..50) {
        let delta = -2 * i64::from(rows + excess);
        let err = calculate_shaping_intervals(delta, rows, 2).unwrap_err();
        let is_capacity = matches!(err, KernelError::ShapingCapacity { .. });
        prop_assert!(is_capacity);
    }
}
