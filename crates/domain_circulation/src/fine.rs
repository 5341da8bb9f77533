//! Overdue fine policy
//!
//! Fines accrue per *full* 24-hour period past the due instant. A loan
//! returned 23 hours late owes nothing; 2 days 12 hours late owes two days.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CirculationError;
use crate::{MAX_FINE, MONEY_PRECISION};

/// Number of full days by which `returned_at` passes `due_at`
///
/// Zero when returned on or before the due instant.
pub fn whole_days_late(due_at: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    if returned_at <= due_at {
        return 0;
    }
    (returned_at - due_at).num_days()
}

/// Computes the fine for a loan returned at `returned_at`
///
/// The result always carries two decimal places.
///
/// # Errors
///
/// `InvalidArgument` if the fine would exceed [`MAX_FINE`].
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use domain_circulation::compute_fine;
/// use rust_decimal_macros::dec;
///
/// let due = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let returned = Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap();
/// assert_eq!(compute_fine(due, returned, dec!(2.0)).unwrap(), dec!(4.0));
/// ```
pub fn compute_fine(
    due_at: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    fine_per_day: Decimal,
) -> Result<Decimal, CirculationError> {
    let days = whole_days_late(due_at, returned_at);
    let mut fine = Decimal::from(days)
        .checked_mul(fine_per_day)
        .map(|fine| fine.round_dp(MONEY_PRECISION))
        .filter(|fine| *fine <= MAX_FINE)
        .ok_or_else(|| {
            CirculationError::invalid(format!(
                "fine for {} days at {} per day exceeds {}",
                days, fine_per_day, MAX_FINE
            ))
        })?;
    fine.rescale(MONEY_PRECISION);
    Ok(fine)
}

fn check_rate(rate: Decimal) -> Result<Decimal, CirculationError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(CirculationError::invalid(format!(
            "fine_per_day must not be negative (got {})",
            rate
        )));
    }
    if rate > MAX_FINE {
        return Err(CirculationError::invalid(format!(
            "fine_per_day must not exceed {} (got {})",
            MAX_FINE, rate
        )));
    }
    Ok(rate)
}

/// The library's standing fine rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePolicy {
    rate_per_day: Decimal,
}

impl FinePolicy {
    /// Creates a policy, rejecting negative rates and rates above [`MAX_FINE`]
    pub fn new(rate_per_day: Decimal) -> Result<Self, CirculationError> {
        Ok(Self {
            rate_per_day: check_rate(rate_per_day)?.round_dp(MONEY_PRECISION),
        })
    }

    pub fn rate_per_day(&self) -> Decimal {
        self.rate_per_day
    }

    /// Picks the rate for one return
    ///
    /// An absent or zero override falls back to the standing rate.
    pub fn resolve(&self, requested: Option<Decimal>) -> Result<Decimal, CirculationError> {
        match requested {
            None => Ok(self.rate_per_day),
            Some(rate) if rate.is_zero() => Ok(self.rate_per_day),
            Some(rate) => check_rate(rate),
        }
    }

    /// Fine an active loan would owe if it were returned at `now`
    ///
    /// Saturates at [`MAX_FINE`], the most a return could ever record.
    pub fn estimate(&self, due_at: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
        compute_fine(due_at, now, self.rate_per_day).unwrap_or(MAX_FINE)
    }
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            rate_per_day: Decimal::ONE,
        }
    }
}
