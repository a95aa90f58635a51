use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::LedgerError;

/// Photo reference stored on End events synthesized by the auto-close job
pub const AUTO_PHOTO_REF: &str = "auto";

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
pub enum EventKind {
    Start,
    End,
}

/// Day-type label frozen onto an End event when it is written.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
pub enum Classification {
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    #[sqlx(rename = "Half Day")]
    HalfDay,

    #[serde(rename = "Full Day")]
    #[strum(serialize = "Full Day")]
    #[sqlx(rename = "Full Day")]
    FullDay,

    #[serde(rename = "Full Day (No Start)")]
    #[strum(serialize = "Full Day (No Start)")]
    #[sqlx(rename = "Full Day (No Start)")]
    FullDayNoStart,

    #[serde(rename = "Auto Ended")]
    #[strum(serialize = "Auto Ended")]
    #[sqlx(rename = "Auto Ended")]
    AutoEnded,
}

impl Classification {
    pub fn is_half_day(self) -> bool {
        self == Classification::HalfDay
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventRow {
    pub id: i64,
    pub employee_id: i64,
    pub kind: EventKind,
    pub occurred_at: i64,
    pub photo_ref: Option<String>,
    pub note: Option<String>,
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceEvent {
    pub id: i64,
    pub employee_id: i64,
    pub kind: EventKind,

    #[schema(value_type = String, format = DateTime)]
    pub occurred_at: DateTime<Utc>,

    pub photo_ref: Option<String>,

    /// Only ever set on Start events
    pub note: Option<String>,

    /// Only ever set on End events
    pub classification: Option<Classification>,
}

impl TryFrom<EventRow> for AttendanceEvent {
    type Error = LedgerError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let occurred_at = DateTime::from_timestamp_millis(row.occurred_at).ok_or_else(|| {
            LedgerError::Storage(format!(
                "attendance {} has an out-of-range timestamp {}",
                row.id, row.occurred_at
            ))
        })?;

        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            kind: row.kind,
            occurred_at,
            photo_ref: row.photo_ref,
            note: row.note,
            classification: row.classification,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub employee_id: i64,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
    pub photo_ref: Option<String>,
    pub note: Option<String>,
    pub classification: Option<Classification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_labels_match_stored_text() {
        assert_eq!(Classification::FullDayNoStart.to_string(), "Full Day (No Start)");
        assert_eq!(
            "Auto Ended".parse::<Classification>().unwrap(),
            Classification::AutoEnded
        );
        assert_eq!(
            serde_json::to_string(&Classification::HalfDay).unwrap(),
            "\"Half Day\""
        );
    }
}
