//! Unit tests for the Temporal module

use chrono::{Duration, TimeZone, Utc};
use core_kernel::{Clock, ManualClock, SystemClock};

mod clocks {
    use super::*;

    #[test]
    fn test_system_clock_is_close_to_now() {
        let before = Utc::now();
        let now = SystemClock.now();
        let after = Utc::now();
        assert!(before <= now && now <= after);
    }

    #[test]
    fn test_manual_clock_is_frozen() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        clock.set(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        clock.advance(Duration::hours(36));
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2025, 2, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_clock_usable_as_trait_object() {
        let clock: Box<dyn Clock> = Box::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert_eq!(clock.now().format("%Y-%m-%d").to_string(), "2024-06-01");
    }
}

