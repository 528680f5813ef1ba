use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loans::Loan;
use crate::members::total_savings;
use crate::payments::Payment;
use crate::store::Tables;

/// portfolio-wide totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardStats {
    pub total_members: usize,
    pub total_savings: Money,
    pub total_loans_issued_count: usize,
    pub total_principal_loaned: Money,
    pub total_principal_collected: Money,
    pub total_interest_collected: Money,
    pub outstanding_principal: Money,
    /// late fees the active loans would owe today; the only figure that
    /// needs a full accrual pass
    pub projected_late_fees: Money,
}

impl DashboardStats {
    pub fn compute(tables: &Tables, today: NaiveDate) -> Self {
        let total_principal_loaned: Money = tables.loans.values().map(|l| l.amount).sum();
        let total_principal_collected: Money = tables.payments.values().map(|p| p.principal_amount).sum();
        let total_interest_collected: Money = tables.payments.values().map(|p| p.interest_amount).sum();

        let projected_late_fees = tables
            .loans
            .values()
            .filter(|l| !l.status.is_paid())
            .map(|loan| {
                let payments = payments_for(tables, loan);
                loan.accrual(&payments).accumulated_late_fees(today)
            })
            .sum();

        DashboardStats {
            total_members: tables.members.len(),
            total_savings: total_savings(tables.savings.values()),
            total_loans_issued_count: tables.loans.len(),
            total_principal_loaned,
            total_principal_collected,
            total_interest_collected,
            outstanding_principal: total_principal_loaned - total_principal_collected,
            projected_late_fees,
        }
    }
}

fn payments_for(tables: &Tables, loan: &Loan) -> Vec<Payment> {
    let mut payments: Vec<Payment> = tables
        .payments
        .values()
        .filter(|p| p.loan_id == loan.id)
        .cloned()
        .collect();
    payments.sort_by_key(|p| (p.paid_at, p.id));
    payments
}
