//! Timezone helpers.
//!
//! Instants are stored as UTC; the configured zone is only used to decide
//! which local calendar day an instant belongs to and when the daily cutoff
//! falls.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{LedgerError, LedgerResult};

/// Local calendar day of an instant
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Current local calendar day
pub fn today(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

/// Local wall-clock time → UTC instant.
///
/// Ambiguous times resolve to the earlier instant; times inside a DST gap
/// move forward one hour.
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Date + local time → UTC instant
pub fn at_local_time(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(time), tz)
}

/// `[start, end)` of a local day as UTC instants
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next_day = date.succ_opt().unwrap_or(date);
    (
        at_local_time(date, NaiveTime::MIN, tz),
        at_local_time(next_day, NaiveTime::MIN, tz),
    )
}

/// `[start, end)` of a local day as Unix millis
pub fn day_bounds_millis(date: NaiveDate, tz: Tz) -> (i64, i64) {
    let (start, end) = day_bounds(date, tz);
    (start.timestamp_millis(), end.timestamp_millis())
}

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| LedgerError::validation(format!("Invalid date format: {date}")))
}

/// Parse a month string (YYYY-MM) into its first day and the first day of
/// the following month.
pub fn parse_month(month: &str) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| LedgerError::validation(format!("Invalid month format: {month}")))?;

    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(|| LedgerError::validation(format!("Month out of range: {month}")))?;

    Ok((first, next))
}

/// Time left until the next occurrence of `cutoff` in `tz`, measured from `now`
pub fn duration_until_next(cutoff: NaiveTime, tz: Tz, now: DateTime<Utc>) -> std::time::Duration {
    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();

    let target_date = if local_now.time() >= cutoff {
        today + Duration::days(1)
    } else {
        today
    };

    let target = at_local_time(target_date, cutoff, tz);
    (target - now).to_std().unwrap_or(std::time::Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn late_utc_evening_is_next_local_day() {
        // 20:00 UTC = 01:30 IST next day
        let instant = utc("2026-03-10T20:00:00Z");
        assert_eq!(
            local_date(instant, Kolkata),
            NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
        );
    }

    #[test]
    fn day_bounds_follow_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let (start, end) = day_bounds(date, Kolkata);
        assert_eq!(start, utc("2026-03-10T18:30:00Z"));
        assert_eq!(end, utc("2026-03-11T18:30:00Z"));
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (first, next) = parse_month("2025-12").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(next, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(parse_month("2025-13").is_err());
        assert!(parse_date("11/03/2026").is_err());
    }

    #[test]
    fn next_cutoff_today_or_tomorrow() {
        let cutoff = NaiveTime::from_hms_opt(20, 0, 0).unwrap();

        // 10:00 IST → 10 hours to go
        let morning = utc("2026-03-11T04:30:00Z");
        assert_eq!(
            duration_until_next(cutoff, Kolkata, morning),
            std::time::Duration::from_secs(10 * 3600)
        );

        // 21:00 IST → 23 hours to go
        let night = utc("2026-03-11T15:30:00Z");
        assert_eq!(
            duration_until_next(cutoff, Kolkata, night),
            std::time::Duration::from_secs(23 * 3600)
        );
    }
}
