//! Event store, payment ledger and employee lookups.
//!
//! Every function takes any SQLite executor so the service can run them on
//! the pool or inside a transaction.

use chrono::NaiveDate;
use sqlx::SqliteExecutor;

use crate::error::{LedgerError, LedgerResult};
use crate::model::attendance::{AttendanceEvent, EventRow, NewEvent};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::payment::{NewPayment, Payment, PaymentRow};
use crate::money;

const EVENT_COLUMNS: &str =
    "id, employee_id, kind, occurred_at, photo_ref, note, classification";

/// Active employee-role staff with their business label
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffRow {
    pub id: i64,
    pub name: String,
    pub business_name: Option<String>,
    pub business_color: Option<String>,
}

/// Employee whose day has a Start but no End
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OpenSession {
    pub employee_id: i64,
    /// Unix millis of the day's first Start
    pub started_at: i64,
}

/// Event row joined with the employee's name
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventLineRow {
    #[sqlx(flatten)]
    pub event: EventRow,
    pub employee_name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PaymentLineRow {
    #[sqlx(flatten)]
    pub payment: PaymentRow,
    pub employee_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentLine {
    pub employee_name: String,
    pub business_name: Option<String>,
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// Businesses and employees
// ---------------------------------------------------------------------------

pub async fn insert_business<'e, E>(db: E, name: &str, color: &str) -> LedgerResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO businesses (name, color) VALUES (?, ?) RETURNING id",
    )
    .bind(name)
    .bind(color)
    .fetch_one(db)
    .await?;
    Ok(id)
}

pub async fn insert_employee<'e, E>(db: E, data: &NewEmployee) -> LedgerResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO employees (name, phone, role, daily_wage, is_active, business_id, pin_hash) VALUES (?, ?, ?, ?, 1, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(data.role)
    .bind(data.daily_wage.map(money::to_f64))
    .bind(data.business_id)
    .bind(&data.pin_hash)
    .fetch_one(db)
    .await?;
    Ok(id)
}

pub async fn find_employee<'e, E>(db: E, id: i64) -> LedgerResult<Option<Employee>>
where
    E: SqliteExecutor<'e>,
{
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, name, phone, role, daily_wage, is_active, business_id, pin_hash FROM employees WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(employee)
}

pub async fn require_employee<'e, E>(db: E, id: i64) -> LedgerResult<Employee>
where
    E: SqliteExecutor<'e>,
{
    find_employee(db, id)
        .await?
        .ok_or_else(|| LedgerError::not_found(format!("employee {id}")))
}

pub async fn count_managers<'e, E>(db: E) -> LedgerResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM employees WHERE role = 'manager' AND is_active = 1",
    )
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Every active employee regardless of role
pub async fn active_employee_ids<'e, E>(db: E) -> LedgerResult<Vec<i64>>
where
    E: SqliteExecutor<'e>,
{
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM employees WHERE is_active = 1 ORDER BY id")
        .fetch_all(db)
        .await?;
    Ok(ids)
}

pub async fn list_active_staff<'e, E>(db: E) -> LedgerResult<Vec<StaffRow>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, StaffRow>(
        "SELECT u.id, u.name, b.name AS business_name, b.color AS business_color FROM employees u LEFT JOIN businesses b ON u.business_id = b.id WHERE u.role = 'employee' AND u.is_active = 1 ORDER BY u.name, u.id",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Attendance events
// ---------------------------------------------------------------------------

pub async fn insert_event<'e, E>(db: E, event: &NewEvent) -> LedgerResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO attendance (employee_id, kind, occurred_at, photo_ref, note, classification) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(event.employee_id)
    .bind(event.kind)
    .bind(event.occurred_at.timestamp_millis())
    .bind(&event.photo_ref)
    .bind(&event.note)
    .bind(event.classification)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Full history of one employee, oldest first
pub async fn events_for_employee<'e, E>(db: E, employee_id: i64) -> LedgerResult<Vec<AttendanceEvent>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, EventRow>(&format!(
        "SELECT {EVENT_COLUMNS} FROM attendance WHERE employee_id = ? ORDER BY occurred_at, id"
    ))
    .bind(employee_id)
    .fetch_all(db)
    .await?;
    rows.into_iter().map(AttendanceEvent::try_from).collect()
}

/// Events with `from <= occurred_at < to` (Unix millis), oldest first
pub async fn events_between<'e, E>(
    db: E,
    employee_id: i64,
    from: i64,
    to: i64,
) -> LedgerResult<Vec<AttendanceEvent>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, EventRow>(&format!(
        "SELECT {EVENT_COLUMNS} FROM attendance WHERE employee_id = ? AND occurred_at >= ? AND occurred_at < ? ORDER BY occurred_at, id"
    ))
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    rows.into_iter().map(AttendanceEvent::try_from).collect()
}

/// Earliest Start in `[from, to)`
pub async fn first_start_between<'e, E>(
    db: E,
    employee_id: i64,
    from: i64,
    to: i64,
) -> LedgerResult<Option<AttendanceEvent>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, EventRow>(&format!(
        "SELECT {EVENT_COLUMNS} FROM attendance WHERE employee_id = ? AND kind = 'Start' AND occurred_at >= ? AND occurred_at < ? ORDER BY occurred_at, id LIMIT 1"
    ))
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_optional(db)
    .await?;
    row.map(AttendanceEvent::try_from).transpose()
}

pub async fn has_end_between<'e, E>(db: E, employee_id: i64, from: i64, to: i64) -> LedgerResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM attendance WHERE employee_id = ? AND kind = 'End' AND occurred_at >= ? AND occurred_at < ?)",
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(exists != 0)
}

pub async fn update_event_note<'e, E>(db: E, event_id: i64, note: Option<&str>) -> LedgerResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE attendance SET note = ? WHERE id = ? AND kind = 'Start'")
        .bind(note)
        .bind(event_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Ids of employees with at least one Start in `[from, to)`
pub async fn employees_started_between<'e, E>(db: E, from: i64, to: i64) -> LedgerResult<Vec<i64>>
where
    E: SqliteExecutor<'e>,
{
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT employee_id FROM attendance WHERE kind = 'Start' AND occurred_at >= ? AND occurred_at < ?",
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(ids)
}

/// Active staff with a Start but no End in `[from, to)`.
///
/// Sessions already closed drop out of this query, which keeps the
/// auto-close job idempotent.
pub async fn open_sessions_between<'e, E>(db: E, from: i64, to: i64) -> LedgerResult<Vec<OpenSession>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OpenSession>(
        r#"
        SELECT u.id AS employee_id, MIN(a.occurred_at) AS started_at
        FROM employees u
        JOIN attendance a ON a.employee_id = u.id
        WHERE u.is_active = 1
          AND a.kind = 'Start'
          AND a.occurred_at >= ?1 AND a.occurred_at < ?2
          AND NOT EXISTS (
              SELECT 1 FROM attendance x
              WHERE x.employee_id = u.id
                AND x.kind = 'End'
                AND x.occurred_at >= ?1 AND x.occurred_at < ?2
          )
        GROUP BY u.id
        ORDER BY u.id
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Newest events first, for everyone or one employee
pub async fn recent_events<'e, E>(
    db: E,
    employee_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> LedgerResult<Vec<(AttendanceEvent, String)>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, EventLineRow>(
        r#"
        SELECT a.id, a.employee_id, a.kind, a.occurred_at, a.photo_ref, a.note, a.classification,
               u.name AS employee_name
        FROM attendance a
        JOIN employees u ON u.id = a.employee_id
        WHERE (?1 IS NULL OR a.employee_id = ?1)
        ORDER BY a.occurred_at DESC, a.id DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(employee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| Ok((AttendanceEvent::try_from(row.event)?, row.employee_name)))
        .collect()
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Newest payments first, for everyone or one employee
pub async fn recent_payments<'e, E>(
    db: E,
    employee_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> LedgerResult<Vec<(Payment, String)>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PaymentLineRow>(
        r#"
        SELECT p.id, p.employee_id, p.amount, p.payment_type, p.paid_on, p.note,
               u.name AS employee_name
        FROM payments p
        JOIN employees u ON u.id = p.employee_id
        WHERE (?1 IS NULL OR p.employee_id = ?1)
        ORDER BY p.paid_on DESC, p.id DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(employee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (Payment::from(row.payment), row.employee_name))
        .collect())
}

pub async fn insert_payment<'e, E>(db: E, payment: &NewPayment) -> LedgerResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO payments (employee_id, amount, payment_type, paid_on, note) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(payment.employee_id)
    .bind(money::to_f64(payment.amount))
    .bind(&payment.payment_type)
    .bind(payment.paid_on)
    .bind(&payment.note)
    .fetch_one(db)
    .await?;
    Ok(id)
}

pub async fn payments_for_employee<'e, E>(db: E, employee_id: i64) -> LedgerResult<Vec<Payment>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PaymentRow>(
        "SELECT id, employee_id, amount, payment_type, paid_on, note FROM payments WHERE employee_id = ? ORDER BY paid_on, id",
    )
    .bind(employee_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Payment::from).collect())
}

/// Payments dated in `[from, to)` with employee and business names
pub async fn payment_lines_between<'e, E>(
    db: E,
    from: NaiveDate,
    to: NaiveDate,
) -> LedgerResult<Vec<PaymentLine>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PaymentLine>(
        "SELECT u.name AS employee_name, b.name AS business_name, p.amount FROM payments p JOIN employees u ON p.employee_id = u.id LEFT JOIN businesses b ON u.business_id = b.id WHERE p.paid_on >= ? AND p.paid_on < ?",
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
