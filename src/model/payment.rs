use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::money;

pub const SETTLEMENT_PAYMENT_TYPE: &str = "Wages Paid";
pub const SETTLEMENT_NOTE: &str = "Full settlement from dashboard";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PaymentRow {
    pub id: i64,
    pub employee_id: i64,
    pub amount: f64,
    pub payment_type: String,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Payment {
    pub id: i64,
    pub employee_id: i64,

    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,

    #[schema(example = "Wages Paid")]
    pub payment_type: String,

    #[schema(value_type = String, format = "date")]
    pub paid_on: NaiveDate,

    pub note: Option<String>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            amount: money::to_decimal(row.amount),
            payment_type: row.payment_type,
            paid_on: row.paid_on,
            note: row.note,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub employee_id: i64,
    pub amount: Decimal,
    pub payment_type: String,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
}
