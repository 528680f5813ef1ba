use chrono::NaiveDate;

use crate::decimal::Money;
use crate::interest::{add_months, interest_on, PenaltyEngine};
use crate::loans::Loan;
use crate::payments::Payment;
use crate::types::AmountsDue;

/// derives every financial fact about a loan from its stored fields and
/// payment history; nothing here is persisted
#[derive(Debug, Clone, Copy)]
pub struct AccrualEngine<'a> {
    loan: &'a Loan,
    payments: &'a [Payment],
    penalty: PenaltyEngine,
}

impl<'a> AccrualEngine<'a> {
    /// `payments` must be the payments belonging to `loan`
    pub fn new(loan: &'a Loan, payments: &'a [Payment]) -> Self {
        Self {
            loan,
            payments,
            penalty: PenaltyEngine::default(),
        }
    }

    pub fn loan(&self) -> &'a Loan {
        self.loan
    }

    pub fn payments(&self) -> &'a [Payment] {
        self.payments
    }

    /// principal repaid so far
    pub fn principal_paid(&self) -> Money {
        self.payments.iter().map(|p| p.principal_amount).sum()
    }

    /// all cash received, across every bucket
    pub fn total_cash_paid(&self) -> Money {
        self.payments.iter().map(|p| p.total_amount()).sum()
    }

    /// loan amount minus principal repaid; never clamped here
    pub fn remaining_balance(&self) -> Money {
        self.loan.amount - self.principal_paid()
    }

    /// 1.5% of the outstanding balance, zero once paid
    pub fn current_interest_due(&self) -> Money {
        if self.loan.status.is_paid() {
            return Money::ZERO;
        }
        interest_on(self.remaining_balance())
    }

    /// number of monthly cycles fully funded by cash received
    pub fn expected_installments_paid(&self) -> u32 {
        self.total_cash_paid().whole_multiples_of(self.loan.monthly_payment)
    }

    /// date the next installment is required, none once paid
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        if self.loan.status.is_paid() {
            return None;
        }
        let cycles = self.expected_installments_paid().saturating_add(1);
        Some(add_months(self.loan.approved_at.date_naive(), cycles))
    }

    /// 3% of the installment for every month the next due date has slipped
    pub fn accumulated_late_fees(&self, today: NaiveDate) -> Money {
        match self.next_due_date() {
            Some(due) => {
                self.penalty
                    .calculate_late_fee(self.loan.monthly_payment, due, today)
                    .penalty_amount
            }
            None => Money::ZERO,
        }
    }

    /// everything currently owed, in waterfall order
    pub fn amounts_due(&self, today: NaiveDate) -> AmountsDue {
        AmountsDue {
            late_fee: self.accumulated_late_fees(today),
            interest: self.current_interest_due(),
            principal: self.remaining_balance(),
        }
    }
}
