use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, MemberId, PaymentId, PaymentSplit, SavingsId};

/// all events emitted by committed ledger mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // member events
    MemberRegistered {
        member_id: MemberId,
        timestamp: DateTime<Utc>,
    },
    MemberDeleted {
        member_id: MemberId,
        timestamp: DateTime<Utc>,
    },
    SavingsDeposited {
        member_id: MemberId,
        savings_id: SavingsId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // loan events
    LoanIssued {
        loan_id: LoanId,
        member_id: MemberId,
        amount: Money,
        monthly_payment: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDeleted {
        loan_id: LoanId,
        remaining_amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanStatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        loan_id: LoanId,
        payment_id: PaymentId,
        split: PaymentSplit,
        timestamp: DateTime<Utc>,
    },
    PaymentAmended {
        loan_id: LoanId,
        payment_id: PaymentId,
        old_split: PaymentSplit,
        new_split: PaymentSplit,
        timestamp: DateTime<Utc>,
    },
    PaymentDeleted {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
}

/// append-only log of committed events
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}
