//! Property-Based Test Generators
//!
//! proptest strategies for circulation inputs that respect the catalog
//! invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// `(copies_total, copies_available)` with `0 <= available <= total`
pub fn copy_counts_strategy() -> impl Strategy<Value = (i32, i32)> {
    (0i32..50).prop_flat_map(|total| (Just(total), 0..=total))
}

/// Copy counts that break the catalog invariant
pub fn invalid_copy_counts_strategy() -> impl Strategy<Value = (i32, i32)> {
    prop_oneof![
        (-50i32..0, 0i32..10),
        (0i32..50).prop_flat_map(|total| (Just(total), (total + 1)..(total + 20))),
    ]
}

/// Loan periods in days
pub fn due_days_strategy() -> impl Strategy<Value = i64> {
    1i64..=60
}

/// Non-negative daily rates with cent precision
pub fn fine_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Return instants from a week early to ninety days late, relative to `due_at`
pub fn return_time_strategy(due_at: DateTime<Utc>) -> impl Strategy<Value = DateTime<Utc>> {
    (-7 * 86_400i64..90 * 86_400).prop_map(move |secs| due_at + Duration::seconds(secs))
}

/// Borrow instants within 2025
pub fn borrow_time_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0i64..365 * 86_400).prop_map(move |secs| start + Duration::seconds(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn copy_counts_are_valid((total, available) in copy_counts_strategy()) {
            prop_assert!(available >= 0);
            prop_assert!(available <= total);
        }

        #[test]
        fn invalid_counts_are_invalid((total, available) in invalid_copy_counts_strategy()) {
            prop_assert!(total < 0 || available > total);
        }
    }
}
