use chrono::{DateTime, Utc};

use crate::model::attendance::Classification;

/// Sessions shorter than this are half days
pub const HALF_DAY_THRESHOLD_SECS: i64 = 5 * 3600;

/// Classification stored on an End event at write time.
///
/// Duration is plain instant arithmetic, independent of any display zone.
pub fn classify_session(start: Option<DateTime<Utc>>, end: DateTime<Utc>) -> Classification {
    match start {
        None => Classification::FullDayNoStart,
        Some(start) if (end - start).num_seconds() < HALF_DAY_THRESHOLD_SECS => {
            Classification::HalfDay
        }
        Some(_) => Classification::FullDay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn nine_am() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-11T09:00:00+05:30")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn four_hours_is_half_day() {
        let start = nine_am();
        assert_eq!(
            classify_session(Some(start), start + Duration::hours(4)),
            Classification::HalfDay
        );
    }

    #[test]
    fn six_hours_is_full_day() {
        let start = nine_am();
        assert_eq!(
            classify_session(Some(start), start + Duration::hours(6)),
            Classification::FullDay
        );
    }

    #[test]
    fn exactly_five_hours_is_full_day() {
        let start = nine_am();
        assert_eq!(
            classify_session(Some(start), start + Duration::hours(5)),
            Classification::FullDay
        );
        assert_eq!(
            classify_session(Some(start), start + Duration::hours(5) - Duration::seconds(1)),
            Classification::HalfDay
        );
    }

    #[test]
    fn missing_start() {
        assert_eq!(classify_session(None, nine_am()), Classification::FullDayNoStart);
    }
}
