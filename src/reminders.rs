//! Daily scan for installments falling due soon.
//!
//! The scan only reads committed state; composing and sending the
//! notification is left to the caller.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loans::Loan;
use crate::payments::Payment;
use crate::store::Tables;
use crate::types::{LoanId, MemberId};

/// an active loan whose next installment falls inside the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueLoan {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub member_name: String,
    pub phone_number: String,
    /// installment plus late fees already accrued
    pub amount_due: Money,
    pub due_date: NaiveDate,
}

/// outcome of one reminder run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReminderReport {
    pub due: Vec<DueLoan>,
    pub notified: bool,
}

/// active loans due on or before `today + window_days`, ordered by due date
pub fn scan_due_loans(tables: &Tables, today: NaiveDate, window_days: u32) -> Vec<DueLoan> {
    let horizon = today + Duration::days(i64::from(window_days));

    let mut due: Vec<DueLoan> = tables
        .loans
        .values()
        .filter(|loan| !loan.status.is_paid())
        .filter_map(|loan| {
            let payments = loan_payments(tables, loan);
            let engine = loan.accrual(&payments);
            let due_date = engine.next_due_date()?;
            if due_date > horizon {
                return None;
            }
            let member = tables.members.get(&loan.member_id)?;
            Some(DueLoan {
                loan_id: loan.id,
                member_id: member.id,
                member_name: member.full_name(),
                phone_number: member.phone_number.clone(),
                amount_due: loan.monthly_payment + engine.accumulated_late_fees(today),
                due_date,
            })
        })
        .collect();

    due.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.member_name.cmp(&b.member_name)));
    due
}

/// notification body listing every due loan
pub fn compose_body(due: &[DueLoan], window_days: u32) -> String {
    let mut body = format!(
        "Hello Admin,\n\nAction Required: There are {} loans due within the next {} days:\n\n",
        due.len(),
        window_days
    );
    for loan in due {
        body.push_str(&format!(
            "- {} (Phone: {})\n  Amount Due: ${}\n  Due Date: {}\n\n",
            loan.member_name, loan.phone_number, loan.amount_due, loan.due_date
        ));
    }
    body.push_str("Please follow up with these members.\n\n- Your Loan Management System");
    body
}

fn loan_payments(tables: &Tables, loan: &Loan) -> Vec<Payment> {
    tables
        .payments
        .values()
        .filter(|p| p.loan_id == loan.id)
        .cloned()
        .collect()
}
