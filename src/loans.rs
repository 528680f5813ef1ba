use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::interest::AccrualEngine;
use crate::payments::Payment;
use crate::types::{LoanId, LoanStatus, MemberId};

/// a loan issued against a member's savings; only the fields below are
/// stored, every balance is derived from the payment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub member_id: MemberId,
    /// principal, fixed at issuance
    pub amount: Money,
    /// agreed monthly installment
    pub monthly_payment: Money,
    pub approved_at: DateTime<Utc>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn issue(member_id: MemberId, terms: &NewLoan, approved_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            amount: terms.amount,
            monthly_payment: terms.monthly_payment,
            approved_at,
            status: LoanStatus::Active,
        }
    }

    /// accrual view over this loan and its payments
    pub fn accrual<'a>(&'a self, payments: &'a [Payment]) -> AccrualEngine<'a> {
        AccrualEngine::new(self, payments)
    }

    /// any status other than paid keeps the member's loan slot occupied
    pub fn is_open(&self) -> bool {
        !self.status.is_paid()
    }
}

/// terms requested for a new loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub amount: Money,
    pub monthly_payment: Money,
}

impl NewLoan {
    pub fn new(amount: Money, monthly_payment: Money) -> Self {
        Self { amount, monthly_payment }
    }
}

/// administrative edit of a loan's terms
pub type LoanUpdate = NewLoan;

/// summary returned after a loan is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDeleted {
    pub member: String,
    pub amount: Money,
    pub payment_times: usize,
    pub remaining_amount: Money,
}
