pub mod accrual;
pub mod penalty;

use chrono::{Months, NaiveDate};
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};

pub use accrual::AccrualEngine;
pub use penalty::PenaltyEngine;

/// flat simple interest charged on the outstanding balance each cycle
pub const INTEREST_RATE: Rate = Rate::from_decimal(dec!(0.015));

/// late penalty charged per missed month, as a share of the installment
pub const LATE_FEE_RATE: Rate = Rate::from_decimal(dec!(0.03));

/// interest owed on an outstanding balance, zero once nothing is outstanding
pub fn interest_on(balance: Money) -> Money {
    if balance <= Money::ZERO {
        return Money::ZERO;
    }
    balance.apply_rate(INTEREST_RATE)
}

/// calendar-month addition; day-of-month overflow clamps to the last valid day
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}
