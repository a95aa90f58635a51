use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;
use crate::money;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "name": "Ravi Kumar",
        "phone": "+919812345678",
        "role": "employee",
        "daily_wage": 1000.0,
        "is_active": true,
        "business_id": 2
    })
)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,

    /// Absent means no rate configured; wages accrue as zero
    pub daily_wage: Option<f64>,

    pub is_active: bool,

    /// Weak reference; deleting a business leaves the employee unassigned
    pub business_id: Option<i64>,

    #[serde(skip)]
    pub pin_hash: String,
}

impl Employee {
    pub fn daily_rate(&self) -> Decimal {
        self.daily_wage.map(money::to_decimal).unwrap_or(Decimal::ZERO)
    }
}

/// Insert payload; the PIN is hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub daily_wage: Option<Decimal>,
    pub business_id: Option<i64>,
    pub pin_hash: String,
}
