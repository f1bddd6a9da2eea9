//! Stock depletion forecasting and count reconciliation
//!
//! The cafe does not weigh every cup of syrup it pours. Instead each
//! (item, supplier) stock row carries a learned average daily consumption
//! rate, and the current stock level is *predicted* from the last physical
//! count by charging that rate against a day-of-week weighted elapsed time
//! (weekends burn through stock faster than Mondays). When the operator
//! takes a physical count, the implied daily usage since the last count is
//! back-solved and blended into the learned rate by exponential smoothing.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Exponential smoothing constant for the consumption-rate learner
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// Floor applied to the weighted elapsed time before dividing, so a
/// re-check minutes after the previous one cannot blow up the implied rate
pub const MIN_WEIGHT_SUM: f64 = 0.1;

/// Per-day consumption factor. Weekends and Fridays run hotter than a
/// Monday; midweek days are the baseline.
pub fn weekday_factor(weekday: Weekday) -> f64 {
    match weekday {
        Weekday::Mon => 0.8,
        Weekday::Fri => 1.2,
        Weekday::Sat => 1.5,
        Weekday::Sun => 1.3,
        _ => 1.0,
    }
}

/// Sum of per-day consumption factors over the interval `[start, end]`.
///
/// Both instants are normalized to UTC calendar days; one factor is charged
/// per elapsed calendar day starting at `start`'s day, with a minimum of one
/// day so a same-day re-check still counts the day it happened on. The
/// time-of-day component of either boundary does not affect the result.
/// Returns 0.0 when `end` precedes `start`; callers are expected not to
/// invoke it that way.
pub fn total_weight(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    if end < start {
        return 0.0;
    }

    let first = start.date_naive();
    let last = end.date_naive();
    // At least one day is always charged, even for a zero-length interval:
    // a same-day re-check still counts the day it happened on.
    let days = (last - first).num_days().max(1);

    (0..days)
        .map(|offset| weekday_factor((first + Duration::days(offset)).weekday()))
        .sum()
}

/// Project the current stock level from the last counted quantity.
///
/// `predicted = max(0, stored - avg_consumption * total_weight(last_checked, now))`
pub fn predict_stock(
    stored_stock: f64,
    avg_consumption: f64,
    last_checked: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let reduction = avg_consumption * total_weight(last_checked, now);
    (stored_stock - reduction).max(0.0)
}

/// A stock position needs reordering once its predicted level falls below
/// the safety threshold.
pub fn needs_reorder(predicted_stock: f64, safety_stock: f64) -> bool {
    predicted_stock < safety_stock
}

/// Outcome of reconciling a physical count against the book stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Reconciliation {
    /// The counted quantity, persisted as the new stock
    pub new_stock: f64,
    /// Smoothed daily consumption rate after learning from this count
    pub new_avg_consumption: f64,
    /// New last-checked instant, resetting the prediction clock
    pub checked_at: DateTime<Utc>,
}

/// Back-solve the daily usage implied by a physical count and blend it into
/// the learned consumption rate.
///
/// A count above the book stock (an unrecorded delivery, usually) implies
/// negative usage; it is clamped to zero before blending, so it decays the
/// learned rate but never drives it down directly, and the result stays
/// non-negative for any non-negative prior rate.
pub fn reconcile(
    stored_stock: f64,
    counted_stock: f64,
    avg_consumption: f64,
    last_checked: DateTime<Utc>,
    now: DateTime<Utc>,
    alpha: f64,
) -> Reconciliation {
    let weight_sum = total_weight(last_checked, now).max(MIN_WEIGHT_SUM);
    let usage_diff = stored_stock - counted_stock;
    let implied_daily_usage = usage_diff / weight_sum;

    let new_avg_consumption =
        avg_consumption * (1.0 - alpha) + implied_daily_usage.max(0.0) * alpha;

    Reconciliation {
        new_stock: counted_stock,
        new_avg_consumption,
        checked_at: now,
    }
}

/// Convert an ordered quantity in purchase units into base stock units.
/// The conversion factor defaults to 1 when the supplier detail row does
/// not define one. The multiplication saturates rather than overflowing
/// on absurd quantities.
pub fn to_base_units(ordered_qty: i64, conversion_factor: Option<i64>) -> f64 {
    ordered_qty.saturating_mul(conversion_factor.unwrap_or(1)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // 2024-01-01 is a Monday.
    const Y: i32 = 2024;

    #[test]
    fn zero_length_interval_charges_the_single_day() {
        let expected = [0.8, 1.0, 1.0, 1.0, 1.2, 1.5, 1.3];
        for (offset, want) in expected.iter().enumerate() {
            let t = utc(Y, 1, 1 + offset as u32, 9);
            assert_eq!(total_weight(t, t), *want);
        }
    }

    #[test]
    fn monday_to_tuesday_charges_monday_only() {
        let w = total_weight(utc(Y, 1, 1, 0), utc(Y, 1, 2, 0));
        assert!((w - 0.8).abs() < 1e-9);
    }

    #[test]
    fn full_week_sums_all_factors() {
        // Mon..Sun inclusive of Mon, exclusive of the following Mon
        let w = total_weight(utc(Y, 1, 1, 0), utc(Y, 1, 8, 0));
        let want = 0.8 + 1.0 + 1.0 + 1.0 + 1.2 + 1.5 + 1.3;
        assert!((w - want).abs() < 1e-9);
    }

    #[test]
    fn time_of_day_does_not_change_the_weight() {
        let a = total_weight(utc(Y, 1, 1, 0), utc(Y, 1, 3, 0));
        let b = total_weight(utc(Y, 1, 1, 23), utc(Y, 1, 3, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn reversed_interval_is_zero() {
        assert_eq!(total_weight(utc(Y, 1, 5, 0), utc(Y, 1, 1, 0)), 0.0);
    }

    #[test]
    fn predict_charges_weighted_consumption() {
        // 10 units, Monday -> Tuesday, 2/day: weight 0.8, predicted 8.4
        let p = predict_stock(10.0, 2.0, utc(Y, 1, 1, 0), utc(Y, 1, 2, 0));
        assert!((p - 8.4).abs() < 1e-9);
    }

    #[test]
    fn predict_floors_at_zero() {
        let p = predict_stock(1.0, 50.0, utc(Y, 1, 1, 0), utc(Y, 1, 8, 0));
        assert_eq!(p, 0.0);
    }

    #[test]
    fn reconcile_blends_implied_usage() {
        // weight_sum 1.0 (Tue -> Wed), stored 5, counted 2, avg 1.0
        let r = reconcile(5.0, 2.0, 1.0, utc(Y, 1, 2, 0), utc(Y, 1, 3, 0), 0.3);
        assert!((r.new_avg_consumption - 1.6).abs() < 1e-9);
        assert_eq!(r.new_stock, 2.0);
        assert_eq!(r.checked_at, utc(Y, 1, 3, 0));
    }

    #[test]
    fn unexplained_stock_increase_only_decays_the_rate() {
        // counted above book: implied usage is negative, clamped to 0
        let r = reconcile(2.0, 9.0, 1.0, utc(Y, 1, 2, 0), utc(Y, 1, 3, 0), 0.3);
        assert!((r.new_avg_consumption - 0.7).abs() < 1e-9);
        assert!(r.new_avg_consumption >= 0.0);
    }

    #[test]
    fn receiving_conversion_defaults_to_one() {
        assert_eq!(to_base_units(3, Some(12)), 36.0);
        assert_eq!(to_base_units(3, None), 3.0);
    }

    #[test]
    fn receiving_conversion_saturates_instead_of_overflowing() {
        assert_eq!(to_base_units(i64::MAX, Some(2)), i64::MAX as f64);
    }
}
