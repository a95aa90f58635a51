//! Groups an employee's raw Start/End events into local calendar days.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::model::attendance::{AttendanceEvent, Classification, EventKind};
use crate::utils::time;

/// One employee's session boundaries for a local day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkDay {
    /// First Start of the day; later Starts are ignored
    pub start: Option<DateTime<Utc>>,
    /// Last End of the day
    pub end: Option<DateTime<Utc>>,
    /// Copied from the last End
    pub classification: Option<Classification>,
}

impl WorkDay {
    /// An End closes the day, with or without a Start.
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }
}

pub type WorkDays = BTreeMap<NaiveDate, WorkDay>;

/// Bucket events by the local date of their timestamp.
///
/// Events are processed in `(occurred_at, id)` order whatever order they
/// arrive in, so the first Start and the last End are deterministic even for
/// duplicate taps.
pub fn reconstruct_days<'a, I>(events: I, tz: Tz) -> WorkDays
where
    I: IntoIterator<Item = &'a AttendanceEvent>,
{
    let mut ordered: Vec<&AttendanceEvent> = events.into_iter().collect();
    ordered.sort_by_key(|e| (e.occurred_at, e.id));

    let mut days = WorkDays::new();
    for event in ordered {
        let day = days
            .entry(time::local_date(event.occurred_at, tz))
            .or_default();

        match event.kind {
            EventKind::Start => {
                if day.start.is_none() {
                    day.start = Some(event.occurred_at);
                }
            }
            EventKind::End => {
                day.end = Some(event.occurred_at);
                day.classification = event.classification;
            }
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn event(id: i64, kind: EventKind, ts: &str, classification: Option<Classification>) -> AttendanceEvent {
        AttendanceEvent {
            id,
            employee_id: 1,
            kind,
            occurred_at: at(ts),
            photo_ref: None,
            note: None,
            classification,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_start_and_last_end_win() {
        let events = vec![
            event(1, EventKind::Start, "2026-03-11T09:00:00+05:30", None),
            event(2, EventKind::Start, "2026-03-11T09:10:00+05:30", None),
            event(3, EventKind::End, "2026-03-11T12:00:00+05:30", Some(Classification::HalfDay)),
            event(4, EventKind::End, "2026-03-11T18:00:00+05:30", Some(Classification::FullDay)),
        ];

        let days = reconstruct_days(&events, Kolkata);
        let day = &days[&date(2026, 3, 11)];
        assert_eq!(day.start, Some(at("2026-03-11T09:00:00+05:30")));
        assert_eq!(day.end, Some(at("2026-03-11T18:00:00+05:30")));
        assert_eq!(day.classification, Some(Classification::FullDay));
        assert!(day.is_closed());
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut events = vec![
            event(1, EventKind::Start, "2026-03-11T09:00:00+05:30", None),
            event(2, EventKind::End, "2026-03-11T13:00:00+05:30", Some(Classification::HalfDay)),
            event(3, EventKind::Start, "2026-03-11T14:00:00+05:30", None),
        ];
        let forward = reconstruct_days(&events, Kolkata);
        events.reverse();
        assert_eq!(reconstruct_days(&events, Kolkata), forward);
    }

    #[test]
    fn end_without_start_is_closed() {
        let events = vec![event(
            1,
            EventKind::End,
            "2026-03-11T18:00:00+05:30",
            Some(Classification::FullDayNoStart),
        )];

        let day = &reconstruct_days(&events, Kolkata)[&date(2026, 3, 11)];
        assert!(day.start.is_none());
        assert!(day.is_closed());
        assert!(!day.is_open());
        assert_eq!(day.classification, Some(Classification::FullDayNoStart));
    }

    #[test]
    fn start_only_is_open() {
        let events = vec![event(1, EventKind::Start, "2026-03-11T09:00:00+05:30", None)];
        let day = &reconstruct_days(&events, Kolkata)[&date(2026, 3, 11)];
        assert!(day.is_open());
        assert!(!day.is_closed());
    }

    #[test]
    fn buckets_use_local_not_utc_date() {
        // 00:30 IST on the 12th is still the 11th in UTC
        let events = vec![
            event(1, EventKind::Start, "2026-03-11T09:00:00+05:30", None),
            event(2, EventKind::End, "2026-03-12T00:30:00+05:30", Some(Classification::FullDayNoStart)),
        ];

        let days = reconstruct_days(&events, Kolkata);
        assert_eq!(days.len(), 2);
        assert!(days[&date(2026, 3, 11)].is_open());
        assert!(days[&date(2026, 3, 12)].is_closed());
    }
}
