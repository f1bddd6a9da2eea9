//! Forecasting tests
//!
//! Tests for the weighted elapsed-time calculator, the stock predictor
//! and the consumption-rate learner.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use shared::forecast::{
    predict_stock, reconcile, total_weight, weekday_factor, DEFAULT_SMOOTHING_ALPHA,
};
use shared::models::StockRecord;

/// 2024-01-01 00:00 UTC is a Monday
fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;
    use chrono::Datelike;

    /// Zero-length intervals charge exactly the day's own factor,
    /// for every day of the week
    #[test]
    fn test_zero_length_interval_all_weekdays() {
        let expected = [0.8, 1.0, 1.0, 1.0, 1.2, 1.5, 1.3];
        for (offset, want) in expected.iter().enumerate() {
            let t = monday() + Duration::days(offset as i64) + Duration::hours(13);
            assert_eq!(total_weight(t, t), *want, "offset {}", offset);
            assert_eq!(weekday_factor(t.weekday()), *want);
        }
    }

    /// Monday 00:00 to Tuesday 00:00 charges Monday's factor only
    #[test]
    fn test_one_elapsed_day_charges_start_day() {
        let w = total_weight(monday(), monday() + Duration::days(1));
        assert!((w - 0.8).abs() < 1e-9);
    }

    /// A full week sums every factor once
    #[test]
    fn test_full_week_weight() {
        let w = total_weight(monday(), monday() + Duration::days(7));
        let want = 0.8 + 1.0 + 1.0 + 1.0 + 1.2 + 1.5 + 1.3; // = 7.8
        assert!((w - want).abs() < 1e-9);
    }

    /// The time-of-day component of either boundary is irrelevant
    #[test]
    fn test_time_of_day_invariance() {
        let a = total_weight(monday(), monday() + Duration::days(3));
        let b = total_weight(
            monday() + Duration::hours(23),
            monday() + Duration::days(3) + Duration::minutes(1),
        );
        assert_eq!(a, b);
    }

    /// end < start is out of contract and returns zero
    #[test]
    fn test_reversed_interval_returns_zero() {
        assert_eq!(total_weight(monday() + Duration::days(2), monday()), 0.0);
    }

    /// 10 units, rate 2/day, Monday -> Tuesday: weight 0.8, predicted 8.4
    #[test]
    fn test_predict_one_weighted_day() {
        let predicted = predict_stock(10.0, 2.0, monday(), monday() + Duration::days(1));
        assert!((predicted - 8.4).abs() < 1e-9);
    }

    /// Prediction is floored at zero, never negative
    #[test]
    fn test_predict_floors_at_zero() {
        let predicted = predict_stock(3.0, 10.0, monday(), monday() + Duration::days(14));
        assert_eq!(predicted, 0.0);
    }

    /// Zero consumption rate leaves the stock untouched
    #[test]
    fn test_predict_zero_rate() {
        let predicted = predict_stock(42.5, 0.0, monday(), monday() + Duration::days(30));
        assert_eq!(predicted, 42.5);
    }

    /// Stored 5, counted 2 over one baseline day blends the implied
    /// usage of 3/day into a prior rate of 1/day
    #[test]
    fn test_reconcile_learns_implied_usage() {
        // Tuesday -> Wednesday: weight exactly 1.0
        let tue = monday() + Duration::days(1);
        let wed = monday() + Duration::days(2);
        let r = reconcile(5.0, 2.0, 1.0, tue, wed, DEFAULT_SMOOTHING_ALPHA);
        assert!((r.new_avg_consumption - 1.6).abs() < 1e-9);
        assert_eq!(r.new_stock, 2.0);
        assert_eq!(r.checked_at, wed);
    }

    /// A count above book stock implies negative usage, which is clamped:
    /// the rate decays but never learns a negative signal
    #[test]
    fn test_reconcile_clamps_negative_usage() {
        let tue = monday() + Duration::days(1);
        let wed = monday() + Duration::days(2);
        let r = reconcile(2.0, 9.0, 1.0, tue, wed, DEFAULT_SMOOTHING_ALPHA);
        assert!((r.new_avg_consumption - 0.7).abs() < 1e-9);
    }

    /// Reconciling twice with identical inputs gives identical outputs
    #[test]
    fn test_reconcile_idempotent() {
        let now = monday() + Duration::days(5);
        let a = reconcile(8.0, 3.5, 1.2, monday(), now, DEFAULT_SMOOTHING_ALPHA);
        let b = reconcile(8.0, 3.5, 1.2, monday(), now, DEFAULT_SMOOTHING_ALPHA);
        assert_eq!(a, b);
    }

    /// A stock record predicts and reconciles through the same core math
    /// as the free functions
    #[test]
    fn test_stock_record_predicts_and_reconciles() {
        let record = StockRecord {
            item_id: 1,
            supplier_id: 2,
            stock: 10.0,
            avg_consumption: 2.0,
            last_checked_at: monday(),
        };
        let now = monday() + Duration::days(1);

        assert!((record.predict(now) - 8.4).abs() < 1e-9);

        // weight 0.8, implied (10 - 4) / 0.8 = 7.5, blended 0.7*2 + 0.3*7.5
        let r = record.reconcile(4.0, now, DEFAULT_SMOOTHING_ALPHA);
        assert!((r.new_avg_consumption - 3.65).abs() < 1e-9);
        assert_eq!(r.new_stock, 4.0);
        assert_eq!(r.checked_at, now);
    }

    /// A same-day re-check still charges one day's factor (preserved
    /// behavior of the learning model), and the 0.1 floor keeps the
    /// implied rate finite
    #[test]
    fn test_reconcile_same_instant() {
        let t = monday() + Duration::days(1); // Tuesday, factor 1.0
        let r = reconcile(5.0, 2.0, 1.0, t, t, DEFAULT_SMOOTHING_ALPHA);
        // weight_sum = 1.0, implied = 3.0, new = 0.7 + 0.9
        assert!((r.new_avg_consumption - 1.6).abs() < 1e-9);
        assert!(r.new_avg_consumption.is_finite());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn stock_strategy() -> impl Strategy<Value = f64> {
        0.0..10_000.0f64
    }

    fn rate_strategy() -> impl Strategy<Value = f64> {
        0.0..500.0f64
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Prediction never goes negative and never exceeds the book stock
        #[test]
        fn prop_predict_bounded(
            stock in stock_strategy(),
            rate in rate_strategy(),
            days in 0i64..60,
            hours in 0i64..24
        ) {
            let now = monday() + Duration::days(days) + Duration::hours(hours);
            let predicted = predict_stock(stock, rate, monday(), now);

            prop_assert!(predicted >= 0.0);
            prop_assert!(predicted <= stock);
        }

        /// Prediction is non-increasing as time advances
        #[test]
        fn prop_predict_non_increasing(
            stock in stock_strategy(),
            rate in rate_strategy(),
            days in 0i64..30
        ) {
            let earlier = predict_stock(stock, rate, monday(), monday() + Duration::days(days));
            let later = predict_stock(stock, rate, monday(), monday() + Duration::days(days + 1));

            prop_assert!(later <= earlier);
        }

        /// Each additional elapsed day strictly increases the total weight
        /// (every weekday factor is positive)
        #[test]
        fn prop_total_weight_monotonic(
            start_offset in 0i64..7,
            days in 1i64..60
        ) {
            let start = monday() + Duration::days(start_offset);
            let shorter = total_weight(start, start + Duration::days(days));
            let longer = total_weight(start, start + Duration::days(days + 1));

            prop_assert!(longer > shorter);
        }

        /// Time of day within the boundary days never changes the weight
        #[test]
        fn prop_total_weight_ignores_time_of_day(
            start_offset in 0i64..7,
            days in 0i64..30,
            h1 in 0i64..24,
            h2 in 0i64..24
        ) {
            let start = monday() + Duration::days(start_offset);
            let base = total_weight(start, start + Duration::days(days));
            let skewed = total_weight(
                start + Duration::hours(h1),
                start + Duration::days(days) + Duration::hours(h2),
            );

            prop_assert_eq!(base, skewed);
        }

        /// The learned rate is never negative, whichever way the count
        /// diverged from the book stock
        #[test]
        fn prop_reconcile_rate_non_negative(
            stored in stock_strategy(),
            counted in stock_strategy(),
            avg in rate_strategy(),
            days in 0i64..30
        ) {
            let now = monday() + Duration::days(days);
            let r = reconcile(stored, counted, avg, monday(), now, DEFAULT_SMOOTHING_ALPHA);

            prop_assert!(r.new_avg_consumption >= 0.0);
        }

        /// The new rate is a convex blend: it lands between the prior rate
        /// and the (clamped) implied usage
        #[test]
        fn prop_reconcile_rate_is_blend(
            stored in stock_strategy(),
            counted in stock_strategy(),
            avg in rate_strategy(),
            days in 0i64..30
        ) {
            let now = monday() + Duration::days(days);
            let weight = total_weight(monday(), now).max(0.1);
            let implied = ((stored - counted) / weight).max(0.0);
            let r = reconcile(stored, counted, avg, monday(), now, DEFAULT_SMOOTHING_ALPHA);

            let lo = avg.min(implied) - 1e-9;
            let hi = avg.max(implied) + 1e-9;
            prop_assert!(r.new_avg_consumption >= lo && r.new_avg_consumption <= hi);
        }

        /// The counted quantity is persisted verbatim and the clock resets
        #[test]
        fn prop_reconcile_resets_clock(
            stored in stock_strategy(),
            counted in stock_strategy(),
            avg in rate_strategy(),
            days in 0i64..30
        ) {
            let now = monday() + Duration::days(days);
            let r = reconcile(stored, counted, avg, monday(), now, DEFAULT_SMOOTHING_ALPHA);

            prop_assert_eq!(r.new_stock, counted);
            prop_assert_eq!(r.checked_at, now);
        }
    }
}
