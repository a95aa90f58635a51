use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::ledger::LedgerService;
use crate::ledger::service::AutoCloseReport;

#[derive(Deserialize, ToSchema, Default)]
pub struct AutoCloseRequest {
    /// Day to close, defaults to today
    #[schema(example = "2026-03-11", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

/// Close every open session of a day now instead of waiting for the cutoff
#[utoipa::path(
    post,
    path = "/api/auto-close",
    request_body = AutoCloseRequest,
    responses(
        (status = 200, description = "Employees closed and skipped", body = AutoCloseReport),
        (status = 400, description = "Date is in the future"),
        (status = 403, description = "Manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn run_auto_close(
    auth: AuthUser,
    ledger: web::Data<LedgerService>,
    body: Option<web::Json<AutoCloseRequest>>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let date = body
        .and_then(|b| b.into_inner().date)
        .unwrap_or_else(|| ledger.today());

    tracing::info!(%date, manager = auth.employee_id, "Manual auto-close requested");
    Ok(HttpResponse::Ok().json(ledger.run_auto_close(date).await?))
}
