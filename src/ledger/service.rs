use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::balance::{BalanceSnapshot, compute_balance};
use crate::ledger::classifier::classify_session;
use crate::ledger::reconstructor::reconstruct_days;
use crate::ledger::store;
use crate::model::attendance::{AUTO_PHOTO_REF, Classification, EventKind, NewEvent};
use crate::model::employee::Employee;
use crate::model::payment::{NewPayment, SETTLEMENT_NOTE, SETTLEMENT_PAYMENT_TYPE};
use crate::money;
use crate::utils::time;

pub const MAX_NOTE_LEN: usize = 500;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettlementResult {
    /// False when nothing was due
    pub paid: bool,

    #[schema(value_type = String, example = "1000.00")]
    pub amount: Decimal,

    pub payment_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AutoCloseReport {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Employees that received a synthesized End
    pub closed: Vec<i64>,
    /// Employees whose row was rejected and left open
    pub skipped: Vec<i64>,
}

/// The wage and attendance engine.
///
/// Every operation takes an explicit employee id; the service keeps no
/// per-request state beyond the pool and the settlement locks.
pub struct LedgerService {
    pub(super) pool: SqlitePool,
    pub(super) tz: Tz,
    auto_close_at: NaiveTime,
    settlement_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl LedgerService {
    pub fn new(pool: SqlitePool, tz: Tz, auto_close_at: NaiveTime) -> Self {
        Self {
            pool,
            tz,
            auto_close_at,
            settlement_locks: DashMap::new(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn auto_close_at(&self) -> NaiveTime {
        self.auto_close_at
    }

    /// Current local calendar day
    pub fn today(&self) -> NaiveDate {
        time::today(self.tz)
    }

    // -----------------------------------------------------------------------
    // Event store
    // -----------------------------------------------------------------------

    pub async fn record_event(
        &self,
        employee_id: i64,
        kind: EventKind,
        photo_ref: Option<String>,
        note: Option<String>,
    ) -> LedgerResult<i64> {
        self.record_event_at(employee_id, kind, Utc::now(), photo_ref, note)
            .await
    }

    /// Append a Start or End at `occurred_at`.
    ///
    /// An End is classified against the first Start of the same local day
    /// at or before it; the label is frozen on the row.
    pub async fn record_event_at(
        &self,
        employee_id: i64,
        kind: EventKind,
        occurred_at: DateTime<Utc>,
        photo_ref: Option<String>,
        note: Option<String>,
    ) -> LedgerResult<i64> {
        let note = normalize_note(note)?;
        if kind == EventKind::End && note.is_some() {
            return Err(LedgerError::validation(
                "notes can only be attached to a Start event",
            ));
        }

        let employee = store::require_employee(&self.pool, employee_id).await?;
        if !employee.is_active {
            return Err(LedgerError::validation(format!(
                "employee {employee_id} is not active"
            )));
        }

        let classification = match kind {
            EventKind::Start => None,
            EventKind::End => {
                let day = time::local_date(occurred_at, self.tz);
                let (from, _) = time::day_bounds_millis(day, self.tz);
                let start = store::first_start_between(
                    &self.pool,
                    employee_id,
                    from,
                    occurred_at.timestamp_millis() + 1,
                )
                .await?;
                Some(classify_session(start.map(|s| s.occurred_at), occurred_at))
            }
        };

        let id = store::insert_event(
            &self.pool,
            &NewEvent {
                employee_id,
                kind,
                occurred_at,
                photo_ref: photo_ref.filter(|p| !p.trim().is_empty()),
                note,
                classification,
            },
        )
        .await?;

        info!(
            employee_id,
            event_id = id,
            kind = %kind,
            classification = ?classification,
            "Attendance recorded"
        );
        Ok(id)
    }

    /// Set the note on today's open Start. Returns the Start's id.
    pub async fn update_note(&self, employee_id: i64, text: Option<String>) -> LedgerResult<i64> {
        self.update_note_for_day(employee_id, self.today(), text)
            .await
    }

    async fn update_note_for_day(
        &self,
        employee_id: i64,
        day: NaiveDate,
        text: Option<String>,
    ) -> LedgerResult<i64> {
        let note = normalize_note(text)?;
        store::require_employee(&self.pool, employee_id).await?;

        let (from, to) = time::day_bounds_millis(day, self.tz);
        let start = store::first_start_between(&self.pool, employee_id, from, to)
            .await?
            .ok_or_else(|| {
                LedgerError::not_found(format!("no Start recorded on {day}; mark the job start first"))
            })?;

        if store::has_end_between(&self.pool, employee_id, from, to).await? {
            return Err(LedgerError::conflict(format!(
                "the session of {day} is already closed"
            )));
        }

        store::update_event_note(&self.pool, start.id, note.as_deref()).await?;
        info!(employee_id, event_id = start.id, "Work note saved");
        Ok(start.id)
    }

    // -----------------------------------------------------------------------
    // Balance engine
    // -----------------------------------------------------------------------

    pub async fn get_balance(&self, employee_id: i64) -> LedgerResult<BalanceSnapshot> {
        let mut conn = self.pool.acquire().await?;
        let (_, balance) = self.load_balance(&mut conn, employee_id).await?;
        Ok(balance)
    }

    /// Read the employee, their event history and their payments on one
    /// connection and fold them into a balance.
    pub(super) async fn load_balance(
        &self,
        conn: &mut SqliteConnection,
        employee_id: i64,
    ) -> LedgerResult<(Employee, BalanceSnapshot)> {
        let employee = store::require_employee(&mut *conn, employee_id).await?;
        let events = store::events_for_employee(&mut *conn, employee_id).await?;
        let payments = store::payments_for_employee(&mut *conn, employee_id).await?;

        let days = reconstruct_days(&events, self.tz);
        let balance = compute_balance(
            employee.daily_rate(),
            &days,
            payments.iter().map(|p| p.amount),
        );
        Ok((employee, balance))
    }

    // -----------------------------------------------------------------------
    // Payment ledger
    // -----------------------------------------------------------------------

    pub async fn record_payment(&self, payment: NewPayment) -> LedgerResult<i64> {
        let amount = money::validate_amount(payment.amount, "amount")?;
        let payment_type = payment.payment_type.trim().to_string();
        if payment_type.is_empty() {
            return Err(LedgerError::validation("payment type is required"));
        }
        let note = normalize_note(payment.note)?;

        store::require_employee(&self.pool, payment.employee_id).await?;

        let id = store::insert_payment(
            &self.pool,
            &NewPayment {
                employee_id: payment.employee_id,
                amount,
                payment_type,
                paid_on: payment.paid_on,
                note,
            },
        )
        .await?;

        info!(
            employee_id = payment.employee_id,
            payment_id = id,
            amount = %amount,
            "Payment recorded"
        );
        Ok(id)
    }

    /// Pay out the full amount due, if any.
    ///
    /// Settlements for one employee run one at a time, and the balance read
    /// and the payment insert share a transaction, so a second call sees the
    /// first payment and finds nothing due.
    pub async fn settle(&self, employee_id: i64) -> LedgerResult<SettlementResult> {
        store::require_employee(&self.pool, employee_id).await?;
        let lock = self.settlement_lock(employee_id);
        let _guard = lock.lock().await;

        let mut tx = self.pool.begin().await?;
        let (employee, balance) = self.load_balance(&mut tx, employee_id).await?;

        if balance.amount_due <= Decimal::ZERO {
            info!(
                employee_id,
                amount_due = %balance.amount_due,
                "No payment necessary, nothing due"
            );
            return Ok(SettlementResult {
                paid: false,
                amount: Decimal::ZERO,
                payment_id: None,
            });
        }

        let payment_id = store::insert_payment(
            &mut *tx,
            &NewPayment {
                employee_id,
                amount: balance.amount_due,
                payment_type: SETTLEMENT_PAYMENT_TYPE.to_string(),
                paid_on: self.today(),
                note: Some(SETTLEMENT_NOTE.to_string()),
            },
        )
        .await?;
        tx.commit().await?;

        info!(
            employee_id,
            name = %employee.name,
            payment_id,
            amount = %balance.amount_due,
            "Dues settled"
        );
        Ok(SettlementResult {
            paid: true,
            amount: balance.amount_due,
            payment_id: Some(payment_id),
        })
    }

    fn settlement_lock(&self, employee_id: i64) -> Arc<Mutex<()>> {
        self.settlement_locks
            .entry(employee_id)
            .or_default()
            .clone()
    }

    // -----------------------------------------------------------------------
    // Auto-close
    // -----------------------------------------------------------------------

    /// Insert an `Auto Ended` End for every active employee whose `as_of`
    /// session is still open.
    ///
    /// The End is stamped at the cutoff of `as_of`, or now if the cutoff has
    /// not been reached yet. Re-running only touches sessions that are still
    /// open. All inserts of a run commit together; a storage failure rolls
    /// the run back.
    pub async fn run_auto_close(&self, as_of: NaiveDate) -> LedgerResult<AutoCloseReport> {
        let today = self.today();
        if as_of > today {
            return Err(LedgerError::validation(format!(
                "cannot auto-close {as_of}, today is {today}"
            )));
        }

        let (from, to) = time::day_bounds_millis(as_of, self.tz);
        let closing_at = time::at_local_time(as_of, self.auto_close_at, self.tz).min(Utc::now());

        let mut tx = self.pool.begin().await?;
        let open = store::open_sessions_between(&mut *tx, from, to).await?;

        let mut report = AutoCloseReport {
            date: as_of,
            closed: Vec::with_capacity(open.len()),
            skipped: Vec::new(),
        };

        for session in open {
            let started_at = DateTime::from_timestamp_millis(session.started_at).unwrap_or(closing_at);
            let event = NewEvent {
                employee_id: session.employee_id,
                kind: EventKind::End,
                occurred_at: closing_at.max(started_at),
                photo_ref: Some(AUTO_PHOTO_REF.to_string()),
                note: None,
                classification: Some(Classification::AutoEnded),
            };

            match store::insert_event(&mut *tx, &event).await {
                Ok(_) => report.closed.push(session.employee_id),
                Err(e) if !e.is_fatal() => {
                    warn!(employee_id = session.employee_id, error = %e, "Auto-close skipped employee");
                    report.skipped.push(session.employee_id);
                }
                Err(e) => {
                    error!(date = %as_of, error = %e, "Auto-close aborted");
                    return Err(e);
                }
            }
        }

        tx.commit().await?;

        if !report.closed.is_empty() {
            info!(date = %as_of, closed = report.closed.len(), "Auto-ended day for employees");
        }
        Ok(report)
    }

    /// Close every earlier day that still has an open session, plus today
    /// once its cutoff has passed. Used to catch up after downtime.
    pub async fn close_missed_days(&self) -> LedgerResult<Vec<AutoCloseReport>> {
        let now = Utc::now();
        let today = time::local_date(now, self.tz);

        let mut days = self.open_days_before(today).await?;
        if now >= time::at_local_time(today, self.auto_close_at, self.tz) {
            days.insert(today);
        }

        let mut reports = Vec::with_capacity(days.len());
        for day in days {
            reports.push(self.run_auto_close(day).await?);
        }
        Ok(reports)
    }

    /// Local days before `day` on which some active employee has a Start and
    /// no End, found with the same reconstruction the balance uses.
    pub async fn open_days_before(&self, day: NaiveDate) -> LedgerResult<BTreeSet<NaiveDate>> {
        let (before, _) = time::day_bounds_millis(day, self.tz);
        let mut days = BTreeSet::new();

        for employee_id in store::active_employee_ids(&self.pool).await? {
            let events = store::events_between(&self.pool, employee_id, i64::MIN, before).await?;
            days.extend(
                reconstruct_days(&events, self.tz)
                    .into_iter()
                    .filter(|(_, work_day)| work_day.is_open())
                    .map(|(date, _)| date),
            );
        }
        Ok(days)
    }
}

/// Trim a free-text note; blank means no note.
fn normalize_note(note: Option<String>) -> LedgerResult<Option<String>> {
    let note = note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    if let Some(n) = &note {
        if n.chars().count() > MAX_NOTE_LEN {
            return Err(LedgerError::validation(format!(
                "note exceeds {MAX_NOTE_LEN} characters"
            )));
        }
    }
    Ok(note)
}
