//! Earned wages minus payments.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::ledger::reconstructor::{WorkDay, WorkDays};
use crate::money::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BalanceSnapshot {
    #[schema(value_type = String, example = "1500.00")]
    pub earned_wages: Decimal,

    #[schema(value_type = String, example = "500.00")]
    pub total_paid: Decimal,

    /// Signed; negative means overpaid
    #[schema(value_type = String, example = "1000.00")]
    pub amount_due: Decimal,
}

impl BalanceSnapshot {
    pub const ZERO: Self = Self {
        earned_wages: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        amount_due: Decimal::ZERO,
    };
}

/// Wage earned for one reconstructed day.
///
/// Open days earn nothing. Closed days earn half the rate for `Half Day`
/// and the full rate for any other classification.
pub fn day_wage(day: &WorkDay, daily_wage: Decimal) -> Decimal {
    if !day.is_closed() {
        return Decimal::ZERO;
    }
    match day.classification {
        Some(c) if c.is_half_day() => daily_wage / Decimal::TWO,
        Some(_) => daily_wage,
        None => Decimal::ZERO,
    }
}

pub fn earned_wages(days: &WorkDays, daily_wage: Decimal) -> Decimal {
    days.values().map(|day| day_wage(day, daily_wage)).sum()
}

pub fn compute_balance<I>(daily_wage: Decimal, days: &WorkDays, payments: I) -> BalanceSnapshot
where
    I: IntoIterator<Item = Decimal>,
{
    let earned_wages = round_money(earned_wages(days, daily_wage));
    let total_paid = round_money(payments.into_iter().sum());

    BalanceSnapshot {
        earned_wages,
        total_paid,
        amount_due: earned_wages - total_paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Classification;
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn closed(day: u32, classification: Option<Classification>) -> (NaiveDate, WorkDay) {
        let ts = DateTime::<Utc>::from_timestamp(1_773_200_000 + i64::from(day) * 86_400, 0).unwrap();
        (
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            WorkDay {
                start: Some(ts),
                end: Some(ts),
                classification,
            },
        )
    }

    #[test]
    fn nothing_recorded_is_zero() {
        assert_eq!(
            compute_balance(dec!(1000), &WorkDays::new(), []),
            BalanceSnapshot::ZERO
        );
    }

    #[test]
    fn half_and_full_day_minus_payment() {
        let days: WorkDays = [
            closed(10, Some(Classification::HalfDay)),
            closed(11, Some(Classification::FullDay)),
        ]
        .into_iter()
        .collect();

        let balance = compute_balance(dec!(1000), &days, [dec!(500)]);
        assert_eq!(balance.earned_wages, dec!(1500));
        assert_eq!(balance.total_paid, dec!(500));
        assert_eq!(balance.amount_due, dec!(1000));
    }

    #[test]
    fn no_start_and_auto_ended_pay_full_rate() {
        let days: WorkDays = [
            closed(10, Some(Classification::FullDayNoStart)),
            closed(11, Some(Classification::AutoEnded)),
        ]
        .into_iter()
        .collect();

        assert_eq!(earned_wages(&days, dec!(800)), dec!(1600));
    }

    #[test]
    fn open_and_unclassified_days_earn_nothing() {
        let (date, mut open) = closed(10, None);
        open.end = None;
        let days: WorkDays = [(date, open), closed(11, None)].into_iter().collect();

        assert_eq!(earned_wages(&days, dec!(1000)), Decimal::ZERO);
    }

    #[test]
    fn overpayment_stays_negative() {
        let days: WorkDays = [closed(10, Some(Classification::HalfDay))].into_iter().collect();

        let balance = compute_balance(dec!(1000), &days, [dec!(300), dec!(400)]);
        assert_eq!(balance.amount_due, dec!(-200));
    }

    #[test]
    fn zero_rate_leaves_only_payments() {
        let days: WorkDays = [closed(10, Some(Classification::FullDay))].into_iter().collect();

        let balance = compute_balance(Decimal::ZERO, &days, [dec!(250)]);
        assert_eq!(balance.earned_wages, Decimal::ZERO);
        assert_eq!(balance.amount_due, dec!(-250));
    }
}
