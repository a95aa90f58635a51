//! Read-only projections for the dashboard. Nothing here writes.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::balance::BalanceSnapshot;
use crate::ledger::reconstructor::reconstruct_days;
use crate::ledger::service::LedgerService;
use crate::ledger::store::{self, StaffRow};
use crate::model::attendance::{AttendanceEvent, Classification, EventKind};
use crate::model::business::UNASSIGNED_BUSINESS;
use crate::model::payment::Payment;
use crate::money;
use crate::utils::time;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeBalance {
    pub employee_id: i64,
    pub name: String,
    pub business_name: Option<String>,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffEntry {
    pub employee_id: i64,
    pub name: String,
    pub business_name: String,
    pub business_color: Option<String>,
}

impl From<StaffRow> for StaffEntry {
    fn from(row: StaffRow) -> Self {
        Self {
            employee_id: row.id,
            name: row.name,
            business_name: row
                .business_name
                .unwrap_or_else(|| UNASSIGNED_BUSINESS.to_string()),
            business_color: row.business_color,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Presence {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub present: Vec<StaffEntry>,
    pub absent: Vec<StaffEntry>,
}

/// Mark shown on the monthly sheet for a closed day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum DayMark {
    /// Half day
    H,
    /// Present for a full day
    P,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyAttendance {
    pub month: String,
    pub employees: Vec<StaffEntry>,
    /// Local date to employee id to mark; days without an End are absent
    #[schema(value_type = Object)]
    pub attendance: BTreeMap<NaiveDate, BTreeMap<i64, DayMark>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentGrouping {
    Employee,
    #[default]
    Business,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentTotal {
    pub label: String,
    #[schema(value_type = String, example = "2500.00")]
    pub total: Decimal,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 200;

/// The caller's session for the current local day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodaySession {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub has_started: bool,
    pub has_ended: bool,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub ended_at: Option<DateTime<Utc>>,

    /// Note and photo of the first Start
    pub note: Option<String>,
    pub photo_ref: Option<String>,

    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventEntry {
    #[serde(flatten)]
    pub event: AttendanceEvent,
    pub employee_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentEntry {
    #[serde(flatten)]
    pub payment: Payment,
    pub employee_name: String,
}

/// Resolve `limit`/`offset` query values; oversized pages are capped.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> LedgerResult<(i64, i64)> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = offset.unwrap_or(0);
    if limit < 1 {
        return Err(LedgerError::validation("limit must be at least 1"));
    }
    if offset < 0 {
        return Err(LedgerError::validation("offset must not be negative"));
    }
    Ok((limit.min(MAX_PAGE_SIZE), offset))
}

impl LedgerService {
    /// Whether `employee_id` has started or ended today, with the Start's
    /// note and photo.
    pub async fn today_session(&self, employee_id: i64) -> LedgerResult<TodaySession> {
        store::require_employee(&self.pool, employee_id).await?;

        let date = self.today();
        let (from, to) = time::day_bounds_millis(date, self.tz);
        let events = store::events_between(&self.pool, employee_id, from, to).await?;

        let day = reconstruct_days(&events, self.tz)
            .remove(&date)
            .unwrap_or_default();
        let first_start = events.iter().find(|e| e.kind == EventKind::Start);

        Ok(TodaySession {
            date,
            has_started: day.start.is_some(),
            has_ended: day.end.is_some(),
            started_at: day.start,
            ended_at: day.end,
            note: first_start.and_then(|e| e.note.clone()),
            photo_ref: first_start.and_then(|e| e.photo_ref.clone()),
            classification: day.classification,
        })
    }

    /// Attendance feed, newest first
    pub async fn recent_events(
        &self,
        employee_id: Option<i64>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LedgerResult<Vec<EventEntry>> {
        let (limit, offset) = page_bounds(limit, offset)?;
        if let Some(id) = employee_id {
            store::require_employee(&self.pool, id).await?;
        }

        let rows = store::recent_events(&self.pool, employee_id, limit, offset).await?;
        Ok(rows
            .into_iter()
            .map(|(event, employee_name)| EventEntry { event, employee_name })
            .collect())
    }

    /// Payment history, newest first
    pub async fn recent_payments(
        &self,
        employee_id: Option<i64>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LedgerResult<Vec<PaymentEntry>> {
        let (limit, offset) = page_bounds(limit, offset)?;
        if let Some(id) = employee_id {
            store::require_employee(&self.pool, id).await?;
        }

        let rows = store::recent_payments(&self.pool, employee_id, limit, offset).await?;
        Ok(rows
            .into_iter()
            .map(|(payment, employee_name)| PaymentEntry { payment, employee_name })
            .collect())
    }

    /// Balances of all active staff with the employee role
    pub async fn list_balances(&self) -> LedgerResult<Vec<EmployeeBalance>> {
        let staff = store::list_active_staff(&self.pool).await?;
        let mut conn = self.pool.acquire().await?;

        let mut balances = Vec::with_capacity(staff.len());
        for member in staff {
            let (_, balance) = self.load_balance(&mut conn, member.id).await?;
            balances.push(EmployeeBalance {
                employee_id: member.id,
                name: member.name,
                business_name: member.business_name,
                balance,
            });
        }
        Ok(balances)
    }

    /// Who recorded a Start on `date`
    pub async fn presence_on(&self, date: NaiveDate) -> LedgerResult<Presence> {
        let (from, to) = time::day_bounds_millis(date, self.tz);
        let staff = store::list_active_staff(&self.pool).await?;
        let started: HashSet<i64> = store::employees_started_between(&self.pool, from, to)
            .await?
            .into_iter()
            .collect();

        let (present, absent): (Vec<StaffRow>, Vec<StaffRow>) =
            staff.into_iter().partition(|s| started.contains(&s.id));

        debug!(%date, present = present.len(), absent = absent.len(), "Presence computed");
        Ok(Presence {
            date,
            present: present.into_iter().map(StaffEntry::from).collect(),
            absent: absent.into_iter().map(StaffEntry::from).collect(),
        })
    }

    /// H/P grid for a `YYYY-MM` month, built from the same day reconstruction
    /// the balance uses.
    pub async fn monthly_attendance(&self, month: &str) -> LedgerResult<MonthlyAttendance> {
        let (first, next) = time::parse_month(month)?;
        let (from, _) = time::day_bounds_millis(first, self.tz);
        let (to, _) = time::day_bounds_millis(next, self.tz);

        let staff = store::list_active_staff(&self.pool).await?;
        let mut attendance: BTreeMap<NaiveDate, BTreeMap<i64, DayMark>> = BTreeMap::new();

        for member in &staff {
            let events = store::events_between(&self.pool, member.id, from, to).await?;
            for (date, day) in reconstruct_days(&events, self.tz) {
                if !day.is_closed() {
                    continue;
                }
                let mark = match day.classification {
                    Some(c) if c.is_half_day() => DayMark::H,
                    _ => DayMark::P,
                };
                attendance.entry(date).or_default().insert(member.id, mark);
            }
        }

        Ok(MonthlyAttendance {
            month: first.format("%Y-%m").to_string(),
            employees: staff.into_iter().map(StaffEntry::from).collect(),
            attendance,
        })
    }

    /// Payment totals for a `YYYY-MM` month, largest first
    pub async fn payment_summary(
        &self,
        month: &str,
        group_by: PaymentGrouping,
    ) -> LedgerResult<Vec<PaymentTotal>> {
        let (first, next) = time::parse_month(month)?;
        let lines = store::payment_lines_between(&self.pool, first, next).await?;

        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for line in lines {
            let label = match group_by {
                PaymentGrouping::Employee => line.employee_name,
                PaymentGrouping::Business => line
                    .business_name
                    .unwrap_or_else(|| UNASSIGNED_BUSINESS.to_string()),
            };
            *totals.entry(label).or_default() += money::to_decimal(line.amount);
        }

        let mut totals: Vec<PaymentTotal> = totals
            .into_iter()
            .map(|(label, total)| PaymentTotal {
                label,
                total: money::round_money(total),
            })
            .collect();
        totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
        Ok(totals)
    }
}
