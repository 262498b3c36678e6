//! US Eastern wall-clock handling for release timing.
//!
//! Offsets follow the US daylight-saving rule in force since 2007: EDT (UTC-4)
//! from 02:00 local on the second Sunday of March until 02:00 local on the first
//! Sunday of November, EST (UTC-5) otherwise. Exchange holidays are not modelled;
//! every Monday to Friday counts as a trading day.

use time::macros::{format_description, offset, time};
use time::{Date, Month, OffsetDateTime, Time, UtcOffset, Weekday};

use crate::{ConfigError, UtcDateTime};

/// A weekday time-of-day range in US Eastern time, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EasternSession {
    start: Time,
    end: Time,
}

impl EasternSession {
    /// The regular cash session, 09:30 to 16:00 ET.
    pub const REGULAR: Self = Self {
        start: time!(09:30),
        end: time!(16:00),
    };

    pub fn new(start: Time, end: Time) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::invalid(
                "correlation.exclude_time_end_et",
                format!("{end} is before the start time {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parses `HH:MM` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        let start = parse_clock("correlation.exclude_time_start_et", start)?;
        let end = parse_clock("correlation.exclude_time_end_et", end)?;
        Self::new(start, end)
    }

    pub const fn start(&self) -> Time {
        self.start
    }

    pub const fn end(&self) -> Time {
        self.end
    }

    /// Whether `instant` falls on a weekday inside the range, in Eastern time.
    pub fn contains(&self, instant: UtcDateTime) -> bool {
        let local = to_eastern(instant);
        if matches!(local.weekday(), Weekday::Saturday | Weekday::Sunday) {
            return false;
        }
        let clock = local.time();
        self.start <= clock && clock <= self.end
    }
}

fn parse_clock(field: &'static str, value: &str) -> Result<Time, ConfigError> {
    Time::parse(value.trim(), format_description!("[hour]:[minute]")).map_err(|_| {
        ConfigError::invalid(field, format!("expected HH:MM, got '{value}'"))
    })
}

/// `instant` at its US Eastern offset.
pub fn to_eastern(instant: UtcDateTime) -> OffsetDateTime {
    let utc = instant.into_inner();
    utc.to_offset(eastern_offset(utc))
}

fn eastern_offset(utc: OffsetDateTime) -> UtcOffset {
    let year = utc.year();
    let transitions = nth_sunday(year, Month::March, 2).zip(nth_sunday(year, Month::November, 1));
    let Some((spring, fall)) = transitions else {
        return offset!(-5);
    };

    // 02:00 EST and 02:00 EDT, expressed in UTC.
    let dst_start = spring.with_time(time!(07:00)).assume_utc();
    let dst_end = fall.with_time(time!(06:00)).assume_utc();
    if dst_start <= utc && utc < dst_end {
        offset!(-4)
    } else {
        offset!(-5)
    }
}

fn nth_sunday(year: i32, month: Month, n: u8) -> Option<Date> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let to_sunday = (7 - first.weekday().number_days_from_sunday()) % 7;
    Date::from_calendar_date(year, month, 1 + to_sunday + 7 * (n - 1)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn at(value: &str) -> UtcDateTime {
        UtcDateTime::parse(value).expect("valid timestamp")
    }

    #[test]
    fn dst_transitions_for_2026() {
        assert_eq!(nth_sunday(2026, Month::March, 2), Some(date!(2026 - 03 - 08)));
        assert_eq!(nth_sunday(2026, Month::November, 1), Some(date!(2026 - 11 - 01)));
    }

    #[test]
    fn converts_with_the_seasonal_offset() {
        // Winter: 14:00 UTC is 09:00 EST.
        assert_eq!(to_eastern(at("2026-01-21T14:00:00Z")).time(), time!(09:00));
        // Summer: 14:00 UTC is 10:00 EDT.
        assert_eq!(to_eastern(at("2026-07-15T14:00:00Z")).time(), time!(10:00));
        // The spring change happens at 07:00 UTC.
        assert_eq!(to_eastern(at("2026-03-08T06:59:00Z")).offset(), offset!(-5));
        assert_eq!(to_eastern(at("2026-03-08T07:00:00Z")).offset(), offset!(-4));
    }

    #[test]
    fn regular_session_bounds_are_inclusive() {
        let session = EasternSession::REGULAR;
        // Wednesday 2026-01-21, EST.
        assert!(!session.contains(at("2026-01-21T14:29:00Z")));
        assert!(session.contains(at("2026-01-21T14:30:00Z")));
        assert!(session.contains(at("2026-01-21T21:00:00Z")));
        assert!(!session.contains(at("2026-01-21T21:01:00Z")));
    }

    #[test]
    fn weekends_are_never_inside_the_session() {
        // Saturday 2026-01-24, 11:00 EST.
        assert!(!EasternSession::REGULAR.contains(at("2026-01-24T16:00:00Z")));
    }

    #[test]
    fn weekday_is_taken_from_eastern_time() {
        // Saturday 01:00 UTC is still Friday 20:00 EST.
        let evening = EasternSession::parse("19:00", "21:00").expect("valid");
        assert!(evening.contains(at("2026-01-24T01:00:00Z")));
    }

    #[test]
    fn parse_rejects_malformed_and_reversed_bounds() {
        assert_eq!(
            EasternSession::parse("09:30", "16:00").expect("valid"),
            EasternSession::REGULAR
        );
        assert!(matches!(
            EasternSession::parse("9.30", "16:00"),
            Err(ConfigError::Invalid {
                field: "correlation.exclude_time_start_et",
                ..
            })
        ));
        assert!(matches!(
            EasternSession::parse("16:00", "09:30"),
            Err(ConfigError::Invalid {
                field: "correlation.exclude_time_end_et",
                ..
            })
        ));
    }
}
