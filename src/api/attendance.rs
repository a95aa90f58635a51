use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::ledger::LedgerService;
use crate::ledger::reports::{EventEntry, MonthlyAttendance, Presence, TodaySession};
use crate::model::attendance::EventKind;
use crate::utils::time;

#[derive(Deserialize, ToSchema)]
pub struct RecordEvent {
    #[schema(example = "Start")]
    pub kind: EventKind,

    /// Defaults to the caller; managers may record for someone else
    #[schema(example = 7)]
    pub employee_id: Option<i64>,

    #[schema(example = "uploads/ravi_1741671000.jpg")]
    pub photo_ref: Option<String>,

    /// Only accepted on a Start
    #[schema(example = "Stocktake at the warehouse")]
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateNote {
    /// Blank or missing clears the note
    #[schema(example = "Unloading the delivery")]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct PresenceQuery {
    /// YYYY-MM-DD, defaults to today
    #[param(example = "2026-03-11")]
    pub date: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct TodayQuery {
    /// Defaults to the caller
    #[param(example = 7)]
    pub employee_id: Option<i64>,
}

/// Paging filter shared by the history feeds
#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// One employee; managers may omit it to see everyone
    #[param(example = 7)]
    pub employee_id: Option<i64>,

    /// Page size, default 20, at most 200
    #[param(example = 20)]
    pub limit: Option<i64>,

    #[param(example = 0)]
    pub offset: Option<i64>,
}

impl HistoryQuery {
    /// Employees must name themselves; only managers may read the whole feed.
    pub(crate) fn authorize(&self, auth: &AuthUser) -> actix_web::Result<()> {
        match self.employee_id {
            Some(id) => auth.require_self_or_manager(id),
            None => auth.require_manager(),
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// YYYY-MM, defaults to the current month
    #[param(example = "2026-03")]
    pub month: Option<String>,
}

/// Record a Start or End
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordEvent,
    responses(
        (status = 201, description = "Event recorded", body = Object, example = json!({
            "message": "Attendance recorded",
            "event_id": 42
        })),
        (status = 400, description = "Invalid event or inactive employee"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn record_event(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    body: web::Json<RecordEvent>,
) -> actix_web::Result<impl Responder> {
    let body = body.into_inner();
    let employee_id = body.employee_id.unwrap_or(auth.employee_id);
    auth.require_self_or_manager(employee_id)?;

    let event_id = ledger
        .record_event(employee_id, body.kind, body.photo_ref, body.note)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Attendance recorded",
        "event_id": event_id
    })))
}

/// Update the note on the caller's open Start for today
#[utoipa::path(
    put,
    path = "/api/attendance/note",
    request_body = UpdateNote,
    responses(
        (status = 200, description = "Note saved", body = Object, example = json!({
            "message": "Work note saved"
        })),
        (status = 404, description = "No Start recorded today"),
        (status = 409, description = "Today's session is already closed")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_note(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    body: web::Json<UpdateNote>,
) -> actix_web::Result<impl Responder> {
    ledger
        .update_note(auth.employee_id, body.into_inner().note)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Work note saved"
    })))
}

/// Whether today's session has started or ended, with its note and photo
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    params(TodayQuery),
    responses(
        (status = 200, description = "Today's session", body = TodaySession),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    query: web::Query<TodayQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = query.into_inner().employee_id.unwrap_or(auth.employee_id);
    auth.require_self_or_manager(employee_id)?;

    Ok(HttpResponse::Ok().json(ledger.today_session(employee_id).await?))
}

/// Attendance events, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/events",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Events with employee names", body = [EventEntry]),
        (status = 400, description = "Invalid paging"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn events(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();
    query.authorize(&auth)?;

    let events = ledger
        .recent_events(query.employee_id, query.limit, query.offset)
        .await?;
    Ok(HttpResponse::Ok().json(events))
}

/// Present and absent staff for a day
#[utoipa::path(
    get,
    path = "/api/attendance/presence",
    params(PresenceQuery),
    responses(
        (status = 200, description = "Presence for the day", body = Presence),
        (status = 400, description = "Invalid date"),
        (status = 403, description = "Manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn presence(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    query: web::Query<PresenceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let date = match query.into_inner().date {
        Some(date) => time::parse_date(&date)?,
        None => ledger.today(),
    };
    Ok(HttpResponse::Ok().json(ledger.presence_on(date).await?))
}

/// Monthly H/P attendance sheet
#[utoipa::path(
    get,
    path = "/api/attendance/monthly",
    params(MonthQuery),
    responses(
        (status = 200, description = "Attendance grid", body = MonthlyAttendance),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let month = current_month_or(&ledger, query.into_inner().month);
    Ok(HttpResponse::Ok().json(ledger.monthly_attendance(&month).await?))
}

pub(crate) fn current_month_or(ledger: &LedgerService, month: Option<String>) -> String {
    month.unwrap_or_else(|| ledger.today().format("%Y-%m").to_string())
}
