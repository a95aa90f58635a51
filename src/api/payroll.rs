use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::attendance::{HistoryQuery, current_month_or};
use crate::auth::auth::AuthUser;
use crate::ledger::LedgerService;
use crate::ledger::balance::BalanceSnapshot;
use crate::ledger::reports::{EmployeeBalance, PaymentEntry, PaymentGrouping, PaymentTotal};
use crate::ledger::service::SettlementResult;
use crate::model::payment::NewPayment;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayment {
    #[schema(example = 7)]
    pub employee_id: i64,

    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,

    #[schema(example = "Advance")]
    pub payment_type: String,

    /// Defaults to today
    #[schema(example = "2026-03-11", value_type = Option<String>, format = "date")]
    pub paid_on: Option<NaiveDate>,

    #[schema(example = "Festival advance")]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// YYYY-MM, defaults to the current month
    #[param(example = "2026-03")]
    pub month: Option<String>,

    /// `business` (default) or `employee`
    #[param(value_type = Option<String>, example = "business")]
    pub group_by: Option<PaymentGrouping>,
}

/// Balances of all active staff
#[utoipa::path(
    get,
    path = "/api/balances",
    responses(
        (status = 200, description = "Balance per employee", body = [EmployeeBalance]),
        (status = 403, description = "Manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Wages"
)]
pub async fn list_balances(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    Ok(HttpResponse::Ok().json(ledger.list_balances().await?))
}

/// Earned wages, total paid and amount due for one employee
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/balance",
    params(
        ("employee_id", description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Current balance", body = BalanceSnapshot),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wages"
)]
pub async fn get_balance(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_manager(employee_id)?;

    Ok(HttpResponse::Ok().json(ledger.get_balance(employee_id).await?))
}

/// Pay out everything currently due
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/settle",
    params(
        ("employee_id", description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Settlement outcome; `paid` is false when nothing was due", body = SettlementResult),
        (status = 403, description = "Manager only"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Concurrent write, retry")
    ),
    security(("bearer_auth" = [])),
    tag = "Wages"
)]
pub async fn settle(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    Ok(HttpResponse::Ok().json(ledger.settle(path.into_inner()).await?))
}

/// Record a manual payment or advance
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePayment,
    responses(
        (status = 201, description = "Payment recorded", body = Object, example = json!({
            "message": "Payment recorded",
            "payment_id": 12
        })),
        (status = 400, description = "Negative amount or missing type"),
        (status = 403, description = "Manager only"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wages"
)]
pub async fn record_payment(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    body: web::Json<CreatePayment>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let body = body.into_inner();
    let payment_id = ledger
        .record_payment(NewPayment {
            employee_id: body.employee_id,
            amount: body.amount,
            payment_type: body.payment_type,
            paid_on: body.paid_on.unwrap_or_else(|| ledger.today()),
            note: body.note,
        })
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Payment recorded",
        "payment_id": payment_id
    })))
}

/// Payment history, newest first
#[utoipa::path(
    get,
    path = "/api/payments",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Payments with employee names", body = [PaymentEntry]),
        (status = 400, description = "Invalid paging"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wages"
)]
pub async fn list_payments(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();
    query.authorize(&auth)?;

    let payments = ledger
        .recent_payments(query.employee_id, query.limit, query.offset)
        .await?;
    Ok(HttpResponse::Ok().json(payments))
}

/// Monthly payment totals per employee or per business
#[utoipa::path(
    get,
    path = "/api/payments/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Totals, largest first", body = [PaymentTotal]),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Wages"
)]
pub async fn payment_summary(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let query = query.into_inner();
    let month = current_month_or(&ledger, query.month);
    let totals = ledger
        .payment_summary(&month, query.group_by.unwrap_or_default())
        .await?;

    Ok(HttpResponse::Ok().json(totals))
}
