//! Time-of-day arithmetic for push triggers.

use std::time::Duration;

use chrono::{Days, Local, NaiveDateTime, NaiveTime};

/// Source of the local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Next occurrence of `at` that is strictly after `now`.
pub fn next_fire(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(today)
    }
}

/// How long to sleep from `now` until the next occurrence of `at`.
/// Never negative.
pub fn sleep_duration(now: NaiveDateTime, at: NaiveTime) -> Duration {
    (next_fire(now, at) - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_one_minute_before() {
        let now = day(12).and_time(time(7, 59, 0));
        assert_eq!(sleep_duration(now, time(8, 0, 0)), Duration::from_secs(60));
    }

    #[test]
    fn test_just_after_rolls_to_tomorrow() {
        let now = day(12).and_time(time(8, 0, 1));
        assert_eq!(next_fire(now, time(8, 0, 0)), day(13).and_time(time(8, 0, 0)));
        assert_eq!(sleep_duration(now, time(8, 0, 0)), Duration::from_secs(86_399));
    }

    #[test]
    fn test_exact_time_is_not_future() {
        let now = day(12).and_time(time(8, 0, 0));
        assert_eq!(next_fire(now, time(8, 0, 0)), day(13).and_time(time(8, 0, 0)));
    }

    #[test]
    fn test_sub_second_remainder() {
        let now = day(12)
            .and_hms_milli_opt(7, 59, 59, 500)
            .unwrap();
        assert_eq!(sleep_duration(now, time(8, 0, 0)), Duration::from_millis(500));
    }

    #[test]
    fn test_month_boundary() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap().and_time(time(23, 0, 0));
        assert_eq!(
            next_fire(now, time(6, 30, 0)),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_time(time(6, 30, 0))
        );
    }

    #[test]
    fn test_local_clock_is_close_to_now() {
        let before = Local::now().naive_local();
        let now = LocalClock.now();
        assert!(now >= before);
    }
}
