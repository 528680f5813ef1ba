pub mod amendment;
pub mod waterfall;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{LoanId, PaymentId, PaymentSplit};

pub use amendment::{reconstruct_pre_payment, AmendmentCalculator};
pub use waterfall::WaterfallAllocator;

/// cash applied to a loan, stored as its three components; the total is
/// always derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub late_fee_amount: Money,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(loan_id: LoanId, split: PaymentSplit, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            principal_amount: split.principal,
            interest_amount: split.interest,
            late_fee_amount: split.late_fee,
            paid_at,
        }
    }

    pub fn total_amount(&self) -> Money {
        self.principal_amount + self.interest_amount + self.late_fee_amount
    }

    pub fn split(&self) -> PaymentSplit {
        PaymentSplit {
            late_fee: self.late_fee_amount,
            interest: self.interest_amount,
            principal: self.principal_amount,
        }
    }

    /// overwrite the stored components
    pub fn apply_split(&mut self, split: PaymentSplit) {
        self.principal_amount = split.principal;
        self.interest_amount = split.interest;
        self.late_fee_amount = split.late_fee;
    }
}

/// summary returned after a payment is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDeleted {
    pub member_names: String,
    pub payment_amount: Money,
}
