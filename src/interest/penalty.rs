use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::interest::LATE_FEE_RATE;

/// engine for calculating late fees on a missed installment
#[derive(Debug, Clone, Copy)]
pub struct PenaltyEngine {
    pub rate: Rate,
}

impl Default for PenaltyEngine {
    fn default() -> Self {
        Self::new(LATE_FEE_RATE)
    }
}

impl PenaltyEngine {
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// whole months late; a partial month counts once today's day-of-month
    /// reaches the due day (so the due date itself already counts as late
    /// when `today > due` holds)
    pub fn months_late(due: NaiveDate, today: NaiveDate) -> u32 {
        if today <= due {
            return 0;
        }

        let mut months = (today.year() - due.year()) * 12 + (today.month() as i32 - due.month() as i32);
        if today.day() >= due.day() {
            months += 1;
        }
        months.max(0) as u32
    }

    /// fee for a number of missed months
    pub fn fee_for(&self, monthly_payment: Money, months_late: u32) -> Money {
        if months_late == 0 {
            return Money::ZERO;
        }
        Money::from_decimal(monthly_payment.as_decimal() * self.rate.as_decimal() * Decimal::from(months_late))
    }

    /// late fee owed for an installment due on `due` as seen on `today`
    pub fn calculate_late_fee(&self, monthly_payment: Money, due: NaiveDate, today: NaiveDate) -> PenaltyCalculation {
        let months_late = Self::months_late(due, today);
        PenaltyCalculation {
            penalty_amount: self.fee_for(monthly_payment, months_late),
            months_late,
            due_date: due,
        }
    }
}

/// late fee calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyCalculation {
    pub penalty_amount: Money,
    pub months_late: u32,
    pub due_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_not_late_on_or_before_due() {
        let due = date(2024, 3, 15);
        assert_eq!(PenaltyEngine::months_late(due, date(2024, 3, 10)), 0);
        assert_eq!(PenaltyEngine::months_late(due, due), 0);
    }

    #[test]
    fn test_partial_month_rounds_up_at_day_threshold() {
        let due = date(2024, 3, 15);
        // one day late, same month, day >= due day
        assert_eq!(PenaltyEngine::months_late(due, date(2024, 3, 16)), 1);
        // next month but before the due day
        assert_eq!(PenaltyEngine::months_late(due, date(2024, 4, 14)), 1);
        // next month on the due day
        assert_eq!(PenaltyEngine::months_late(due, date(2024, 4, 15)), 2);
    }

    #[test]
    fn test_months_late_across_years() {
        let due = date(2023, 11, 20);
        assert_eq!(PenaltyEngine::months_late(due, date(2024, 2, 19)), 3);
        assert_eq!(PenaltyEngine::months_late(due, date(2024, 2, 20)), 4);
    }

    #[test]
    fn test_fee_amount() {
        let engine = PenaltyEngine::default();
        let monthly = Money::from_major(1_000);
        assert_eq!(engine.fee_for(monthly, 0), Money::ZERO);
        assert_eq!(engine.fee_for(monthly, 1), Money::from_major(30));
        assert_eq!(engine.fee_for(monthly, 2), Money::from_major(60));

        let odd = Money::from_str_exact("333.33").unwrap();
        // 9.9999 -> 10.00
        assert_eq!(engine.fee_for(odd, 1), Money::from_major(10));
    }

    #[test]
    fn test_late_fee_non_decreasing_over_time() {
        let engine = PenaltyEngine::default();
        let monthly = Money::from_major(250);
        let due = date(2024, 1, 31);

        let mut previous = Money::ZERO;
        let mut today = date(2024, 1, 1);
        while today < date(2025, 1, 1) {
            let fee = engine.calculate_late_fee(monthly, due, today).penalty_amount;
            assert!(fee >= previous, "fee decreased on {}", today);
            previous = fee;
            today = today.succ_opt().unwrap();
        }
    }
}
