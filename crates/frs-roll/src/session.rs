//! Session calendar: day-boundary detection.
//!
//! Deterministic, pure logic. No IO, no wall-clock.
//!
//! The selector only re-evaluates its front contract once per trading day.
//! What counts as a "day" is the exchange session, not the UTC date: a tick
//! at or after the session close belongs to the next session. The default
//! calendar closes at 13:15 America/Los_Angeles (CME equity-index futures),
//! and `chrono-tz` handles the PST/PDT switch.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// Exchange session clock used to derive the day-boundary signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionCalendar {
    pub tz: Tz,
    /// Local session close; a tick at exactly this time is already the next
    /// session.
    pub close: NaiveTime,
}

impl SessionCalendar {
    pub const DEFAULT_TZ: Tz = chrono_tz::America::Los_Angeles;

    pub fn new(tz: Tz, close: NaiveTime) -> Self {
        Self { tz, close }
    }

    /// 13:15 local.
    pub fn default_close() -> NaiveTime {
        NaiveTime::MIN + Duration::minutes(13 * 60 + 15)
    }

    /// The session date `ts` belongs to.
    pub fn session_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        let local = ts.with_timezone(&self.tz);
        let date = local.date_naive();
        if local.time() >= self.close {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        }
    }

    /// `true` if at least one session close lies in `(prev, now]`.
    pub fn crossed_close(&self, prev: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.session_date(now) > self.session_date(prev)
    }
}

impl Default for SessionCalendar {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TZ, Self::default_close())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Reference instants (UTC):
    //
    //   2019-03-08 Fri 13:15 PST = 2019-03-08T21:15:00Z (UTC-8, before DST)
    //   2019-03-11 Mon 13:15 PDT = 2019-03-11T20:15:00Z (UTC-7, after DST)

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn before_close_belongs_to_same_local_date() {
        let cal = SessionCalendar::default();
        assert_eq!(cal.session_date(utc(2019, 3, 8, 21, 14)), date(2019, 3, 8));
    }

    #[test]
    fn at_close_rolls_to_next_session() {
        let cal = SessionCalendar::default();
        assert_eq!(cal.session_date(utc(2019, 3, 8, 21, 15)), date(2019, 3, 9));
    }

    #[test]
    fn close_follows_daylight_saving() {
        let cal = SessionCalendar::default();
        // 20:15Z is 12:15 PST on the 8th but 13:15 PDT on the 11th.
        assert_eq!(cal.session_date(utc(2019, 3, 8, 20, 15)), date(2019, 3, 8));
        assert_eq!(cal.session_date(utc(2019, 3, 11, 20, 15)), date(2019, 3, 12));
    }

    #[test]
    fn crossed_close_detects_boundary() {
        let cal = SessionCalendar::default();
        let before = utc(2019, 3, 8, 20, 0);
        let after = utc(2019, 3, 8, 22, 0);
        assert!(cal.crossed_close(before, after));
        assert!(!cal.crossed_close(before, utc(2019, 3, 8, 21, 0)));
        assert!(!cal.crossed_close(after, after));
    }
}
