//! Time-derived wallet metrics: activity window and borrow-to-repay latency.

use chrono::{DateTime, Utc};

use lendscore_core::constants::{round_to, ROUND_DECIMALS, SECS_PER_DAY};

/// First and last activity of a wallet and the whole days between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityWindow {
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub active_days: i64,
}

/// Compute the activity window from timestamps in any order.
///
/// Timestamps outside chrono's representable range are ignored. With no
/// usable timestamp both ends are `None` and the span is 0. The span is the
/// calendar difference truncated to whole days.
///
/// # Examples
///
/// ```
/// use lendscore_aggregate::activity_window;
/// let w = activity_window(&[1_600_000_000 + 3 * 86_400 + 10, 1_600_000_000]);
/// assert_eq!(w.active_days, 3);
/// assert_eq!(activity_window(&[]).active_days, 0);
/// ```
pub fn activity_window(timestamps: &[i64]) -> ActivityWindow {
    let mut times: Vec<DateTime<Utc>> = timestamps
        .iter()
        .filter_map(|ts| DateTime::from_timestamp(*ts, 0))
        .collect();
    times.sort_unstable();

    match (times.first(), times.last()) {
        (Some(first), Some(last)) => ActivityWindow {
            first: Some(*first),
            last: Some(*last),
            active_days: (*last - *first).num_days(),
        },
        _ => ActivityWindow::default(),
    }
}

/// Positive gaps, in seconds, between rank-paired borrows and repays.
///
/// Both sequences are sorted independently and the i-th borrow is paired
/// with the i-th repay. Repays beyond the borrow count are discarded, as are
/// pairs where the repay is not strictly after the borrow or whose gap does
/// not fit in an `i64`. Pairing is by rank only, not by loan identity.
pub fn borrow_repay_gaps(borrows: &[i64], repays: &[i64]) -> Vec<i64> {
    let mut borrows = borrows.to_vec();
    let mut repays = repays.to_vec();
    borrows.sort_unstable();
    repays.sort_unstable();

    borrows
        .iter()
        .zip(repays.iter())
        .filter(|(b, r)| r > b)
        .filter_map(|(b, r)| r.checked_sub(*b))
        .collect()
}

/// Mean of [`borrow_repay_gaps`] in seconds, `None` without a valid pair.
pub fn mean_borrow_to_repay_secs(borrows: &[i64], repays: &[i64]) -> Option<f64> {
    let gaps = borrow_repay_gaps(borrows, repays);
    if gaps.is_empty() {
        return None;
    }
    let total: f64 = gaps.iter().map(|g| *g as f64).sum();
    Some(total / gaps.len() as f64)
}

/// Mean borrow-to-repay latency in days, rounded to two decimals.
///
/// `None` (distinct from `Some(0.0)`) when no valid pair exists.
pub fn avg_borrow_to_repay_days(borrows: &[i64], repays: &[i64]) -> Option<f64> {
    mean_borrow_to_repay_secs(borrows, repays)
        .map(|secs| round_to(secs / SECS_PER_DAY, ROUND_DECIMALS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DAY: i64 = 86_400;
    const T0: i64 = 1_620_000_000;

    // --- activity_window ---

    #[test]
    fn empty_window() {
        let w = activity_window(&[]);
        assert_eq!(w.first, None);
        assert_eq!(w.last, None);
        assert_eq!(w.active_days, 0);
    }

    #[test]
    fn single_timestamp_has_zero_span() {
        let w = activity_window(&[T0]);
        assert_eq!(w.first, w.last);
        assert_eq!(w.first.map(|t| t.timestamp()), Some(T0));
        assert_eq!(w.active_days, 0);
    }

    #[test]
    fn span_uses_extremes_regardless_of_order() {
        let w = activity_window(&[T0 + 5 * DAY, T0, T0 + 2 * DAY]);
        assert_eq!(w.first.map(|t| t.timestamp()), Some(T0));
        assert_eq!(w.last.map(|t| t.timestamp()), Some(T0 + 5 * DAY));
        assert_eq!(w.active_days, 5);
    }

    #[test]
    fn partial_days_are_truncated() {
        assert_eq!(activity_window(&[T0, T0 + DAY - 1]).active_days, 0);
        assert_eq!(activity_window(&[T0, T0 + DAY]).active_days, 1);
        assert_eq!(activity_window(&[T0, T0 + 2 * DAY + DAY / 2]).active_days, 2);
    }

    #[test]
    fn unrepresentable_timestamps_are_ignored() {
        let w = activity_window(&[i64::MAX, T0]);
        assert_eq!(w.first.map(|t| t.timestamp()), Some(T0));
        assert_eq!(w.active_days, 0);
    }

    // --- borrow/repay pairing ---

    #[test]
    fn rank_pairing_example() {
        assert_eq!(borrow_repay_gaps(&[100, 200], &[150, 500]), vec![50, 300]);
        assert_eq!(mean_borrow_to_repay_secs(&[100, 200], &[150, 500]), Some(175.0));
        // 175 s is about 0.002 days: rounds to zero but is still present.
        assert_eq!(avg_borrow_to_repay_days(&[100, 200], &[150, 500]), Some(0.0));
    }

    #[test]
    fn pairing_sorts_each_side_first() {
        assert_eq!(borrow_repay_gaps(&[200, 100], &[500, 150]), vec![50, 300]);
    }

    #[test]
    fn extra_repays_are_discarded() {
        assert_eq!(borrow_repay_gaps(&[T0], &[T0 + DAY, T0 + 9 * DAY]), vec![DAY]);
        assert_eq!(avg_borrow_to_repay_days(&[T0], &[T0 + DAY, T0 + 9 * DAY]), Some(1.0));
    }

    #[test]
    fn extra_borrows_have_no_partner() {
        assert_eq!(borrow_repay_gaps(&[T0, T0 + DAY], &[T0 + 2 * DAY]), vec![2 * DAY]);
    }

    #[test]
    fn repay_not_after_borrow_is_dropped() {
        // Equal timestamps and repay-before-borrow both fail the strict check.
        assert!(borrow_repay_gaps(&[T0], &[T0]).is_empty());
        assert!(borrow_repay_gaps(&[T0], &[T0 - 1]).is_empty());
        assert_eq!(avg_borrow_to_repay_days(&[T0], &[T0 - 1]), None);
    }

    #[test]
    fn overflowing_gap_is_dropped() {
        assert!(borrow_repay_gaps(&[i64::MIN + 1], &[i64::MAX]).is_empty());
        assert_eq!(avg_borrow_to_repay_days(&[i64::MIN + 1], &[i64::MAX]), None);
        // Only the pair whose gap fits survives.
        assert_eq!(
            borrow_repay_gaps(&[i64::MIN + 1, T0], &[T0 + DAY, i64::MAX]),
            vec![i64::MAX - T0]
        );
    }

    #[test]
    fn no_borrows_or_no_repays_is_none() {
        assert_eq!(avg_borrow_to_repay_days(&[], &[T0]), None);
        assert_eq!(avg_borrow_to_repay_days(&[T0], &[]), None);
        assert_eq!(avg_borrow_to_repay_days(&[], &[]), None);
    }

    #[test]
    fn latency_rounds_to_two_decimals() {
        // 1.5 days and 1 day average to 1.25 days.
        let days = avg_borrow_to_repay_days(&[T0, T0 + DAY], &[T0 + DAY + DAY / 2, T0 + 2 * DAY]);
        assert_eq!(days, Some(1.25));
        // One third of a day.
        assert_eq!(avg_borrow_to_repay_days(&[T0], &[T0 + DAY / 3]), Some(0.33));
    }

    proptest! {
        #[test]
        fn gaps_are_positive_and_bounded_by_borrows(
            borrows in prop::collection::vec(0i64..1_000_000, 0..20),
            repays in prop::collection::vec(0i64..1_000_000, 0..20),
        ) {
            let gaps = borrow_repay_gaps(&borrows, &repays);
            prop_assert!(gaps.len() <= borrows.len().min(repays.len()));
            prop_assert!(gaps.iter().all(|g| *g > 0));
        }

        #[test]
        fn span_is_non_negative(ts in prop::collection::vec(1i64..4_000_000_000, 0..30)) {
            let w = activity_window(&ts);
            prop_assert!(w.active_days >= 0);
            prop_assert!(w.first <= w.last);
        }
    }
}
