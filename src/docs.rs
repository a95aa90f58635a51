use crate::api::attendance::{RecordEvent, UpdateNote};
use crate::api::auto_close::AutoCloseRequest;
use crate::api::payroll::CreatePayment;
use crate::ledger::balance::BalanceSnapshot;
use crate::ledger::reports::{
    DayMark, EmployeeBalance, EventEntry, MonthlyAttendance, PaymentEntry, PaymentGrouping,
    PaymentTotal, Presence, StaffEntry, TodaySession,
};
use crate::ledger::service::{AutoCloseReport, SettlementResult};
use crate::model::attendance::{AttendanceEvent, Classification, EventKind};
use crate::model::payment::Payment;
use crate::model::role::Role;
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wage Ledger API",
        version = "1.0.0",
        description = r#"
## Attendance and wage ledger

Backs a small-business attendance tracker where staff tap **Start** and
**End** each day and the manager pays out wages from the dashboard.

### Key Features
- **Attendance**
  - Append-only Start/End events, classified as Half Day or Full Day when the day closes
  - Work notes on the open Start of the day
  - Today's session and a paged event feed with notes and photos
  - Daily auto-close of sessions left open at the cutoff
- **Wages**
  - Balance = earned wages - payments, recomputed from history on every read
  - One-click full settlement, safe against double submission
  - Manual payments and advances, with a paged payment history
- **Reports**
  - Daily presence, monthly H/P sheet, monthly payment totals

### Security
Everything under the API prefix needs a **JWT Bearer** token from `/auth/login`.
Dashboard operations are restricted to the **manager** role.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::attendance::record_event,
        crate::api::attendance::update_note,
        crate::api::attendance::today,
        crate::api::attendance::events,
        crate::api::attendance::presence,
        crate::api::attendance::monthly,
        crate::api::auto_close::run_auto_close,

        crate::api::payroll::list_balances,
        crate::api::payroll::get_balance,
        crate::api::payroll::settle,
        crate::api::payroll::record_payment,
        crate::api::payroll::list_payments,
        crate::api::payroll::payment_summary
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            Role,
            EventKind,
            Classification,
            RecordEvent,
            UpdateNote,
            TodaySession,
            AttendanceEvent,
            EventEntry,
            AutoCloseRequest,
            AutoCloseReport,
            Presence,
            StaffEntry,
            DayMark,
            MonthlyAttendance,
            BalanceSnapshot,
            EmployeeBalance,
            SettlementResult,
            CreatePayment,
            Payment,
            PaymentEntry,
            PaymentGrouping,
            PaymentTotal
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "PIN login"),
        (name = "Attendance", description = "Attendance events and reports"),
        (name = "Wages", description = "Balances, settlement and payments"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
