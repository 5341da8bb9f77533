//! Pre-built Test Fixtures
//!
//! Fixed instants and rates so fine arithmetic in tests is predictable, plus
//! a service wired to the in-memory store and a manual clock.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::ManualClock;
use domain_circulation::{CirculationPolicy, CirculationService, InMemoryStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Midnight UTC, Jan 1 2025
    pub fn new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Jan 3 2025 at noon, two and a half days after [`Self::new_year`]
    pub fn two_and_a_half_days_later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap()
    }

    /// Opening time on the first weekday of 2025
    pub fn opening_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap()
    }
}

/// Fixture for fine rates
pub struct RateFixtures;

impl RateFixtures {
    pub fn standard() -> Decimal {
        dec!(1.00)
    }

    pub fn doubled() -> Decimal {
        dec!(2.00)
    }

    pub fn quarter() -> Decimal {
        dec!(0.25)
    }
}

/// A circulation service over a fresh in-memory store and a frozen clock
pub struct ServiceFixture {
    pub store: InMemoryStore,
    pub clock: Arc<ManualClock>,
    pub service: CirculationService,
}

impl ServiceFixture {
    /// Default policy, clock frozen at [`TemporalFixtures::opening_time`]
    pub fn new() -> Self {
        Self::with_policy(CirculationPolicy::default())
    }

    pub fn with_policy(policy: CirculationPolicy) -> Self {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::new(TemporalFixtures::opening_time()));
        let service = CirculationService::new(Arc::new(store.clone()))
            .with_clock(clock.clone())
            .with_policy(policy);
        Self {
            store,
            clock,
            service,
        }
    }
}

impl Default for ServiceFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_temporal_fixtures_are_ordered() {
        assert_eq!(
            TemporalFixtures::two_and_a_half_days_later() - TemporalFixtures::new_year(),
            Duration::hours(60)
        );
    }

    #[test]
    fn test_service_fixture_uses_policy() {
        let policy = CirculationPolicy::new(14, dec!(0.50)).unwrap();
        let fixture = ServiceFixture::with_policy(policy);
        assert_eq!(fixture.service.policy().default_due_days(), 14);
    }
}
