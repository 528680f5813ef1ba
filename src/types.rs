use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a member
pub type MemberId = Uuid;

/// unique identifier for a savings deposit
pub type SavingsId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// loan status, a cached summary of "remaining balance <= 0"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// outstanding principal remains
    #[default]
    Active,
    /// principal fully repaid
    Paid,
}

impl LoanStatus {
    /// the status implied by a remaining balance
    pub fn for_balance(remaining_balance: Money) -> Self {
        if remaining_balance > Money::ZERO {
            LoanStatus::Active
        } else {
            LoanStatus::Paid
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, LoanStatus::Paid)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "active"),
            LoanStatus::Paid => write!(f, "paid"),
        }
    }
}

/// how a cash amount was split across the three payment buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentSplit {
    pub late_fee: Money,
    pub interest: Money,
    pub principal: Money,
}

impl PaymentSplit {
    pub fn total(&self) -> Money {
        self.late_fee + self.interest + self.principal
    }
}

/// amounts currently owed on a loan, as derived by the accrual engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AmountsDue {
    pub late_fee: Money,
    pub interest: Money,
    pub principal: Money,
}

impl AmountsDue {
    /// cash needed to clear the loan entirely
    pub fn clearance(&self) -> Money {
        self.principal + self.interest + self.late_fee
    }
}
