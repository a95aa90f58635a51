#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Asia::Kolkata;
use rust_decimal::Decimal;

use wage_ledger::auth::pin::hash_pin;
use wage_ledger::db::init_db;
use wage_ledger::ledger::{LedgerService, store};
use wage_ledger::model::employee::NewEmployee;
use wage_ledger::model::role::Role;
use wage_ledger::utils::time;

pub const PIN: &str = "1234";

pub async fn ledger() -> LedgerService {
    let pool = init_db("sqlite::memory:").await.unwrap();
    LedgerService::new(pool, Kolkata, NaiveTime::from_hms_opt(20, 0, 0).unwrap())
}

pub async fn add_staff(
    ledger: &LedgerService,
    name: &str,
    role: Role,
    daily_wage: Option<Decimal>,
    business_id: Option<i64>,
) -> i64 {
    store::insert_employee(
        ledger.pool(),
        &NewEmployee {
            name: name.to_string(),
            phone: None,
            role,
            daily_wage,
            business_id,
            pin_hash: hash_pin(PIN).unwrap(),
        },
    )
    .await
    .unwrap()
}

pub async fn add_employee(ledger: &LedgerService, name: &str, daily_wage: Decimal) -> i64 {
    add_staff(ledger, name, Role::Employee, Some(daily_wage), None).await
}

/// A local date a few days back, so closed sessions never touch today
pub fn past_day(ledger: &LedgerService, days_ago: i64) -> NaiveDate {
    ledger.today() - Duration::days(days_ago)
}

/// Local wall-clock time on `date` in the ledger's zone
pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    time::at_local_time(date, NaiveTime::from_hms_opt(hour, minute, 0).unwrap(), Kolkata)
}
