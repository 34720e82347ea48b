//! Wire time resolution.
//!
//! The binary format transports times as 16-bit `hours * 100 + minutes`
//! values relative to a response-wide base date plus a per-trip service-day
//! offset. Hours run past 23 for services that cross midnight (2510 is
//! 01:10 the next day). The all-ones value is the "no time" sentinel,
//! distinct from midnight. Base dates are a 16-bit count of days where day
//! 1 is 1980-01-01.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Sentinel for "no time transmitted".
pub(crate) const NO_TIME: u16 = 0xffff;

/// Resolve a wire day count to a date (day 1 = 1980-01-01).
pub(crate) fn base_date(days: u16) -> NaiveDate {
    // Day 0 of the epoch; chrono accepts this date, so no fallibility here.
    let epoch = NaiveDate::from_ymd_opt(1979, 12, 31).expect("valid epoch date");
    epoch + Duration::days(i64::from(days))
}

/// Inverse of [`base_date`], for building test fixtures.
#[cfg(test)]
pub(crate) fn days_for(date: NaiveDate) -> u16 {
    let epoch = NaiveDate::from_ymd_opt(1979, 12, 31).unwrap();
    u16::try_from((date - epoch).num_days()).unwrap()
}

/// Resolve a raw wire time against the base date and service-day offset.
///
/// Returns `None` for the sentinel. Minute values of 60 and above carry
/// into the hour rather than erroring, matching the lenient arithmetic of
/// the backends themselves.
pub(crate) fn resolve_local(raw: u16, base: NaiveDate, day_offset: u32) -> Option<NaiveDateTime> {
    if raw == NO_TIME {
        return None;
    }

    let minutes = i64::from(raw / 100) * 60 + i64::from(raw % 100);
    let midnight = base.and_time(NaiveTime::MIN);
    Some(midnight + Duration::days(i64::from(day_offset)) + Duration::minutes(minutes))
}

/// Project a local wall-clock time into the backend's timezone.
///
/// Ambiguous times (clocks going back) take the earlier offset; times
/// inside a spring-forward gap resolve one hour later, the instant the
/// gap skips to.
pub(crate) fn project<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(early, _) => Some(early.fixed_offset()),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.fixed_offset()),
    }
}

/// Full resolution: raw wire time → timezone-projected instant.
pub(crate) fn resolve<Tz: TimeZone>(
    raw: u16,
    base: NaiveDate,
    day_offset: u32,
    tz: &Tz,
) -> Option<DateTime<FixedOffset>> {
    resolve_local(raw, base, day_offset).and_then(|local| project(local, tz))
}
