use chrono::NaiveDate;

use crate::decimal::Money;
use crate::errors::Result;
use crate::interest::{AccrualEngine, INTEREST_RATE};
use crate::payments::{Payment, WaterfallAllocator};
use crate::types::{AmountsDue, LoanStatus, PaymentSplit};

/// what the loan owed just before `original` was applied, rebuilt from the
/// current state by adding the payment back
///
/// Interest is recomputed from the rebuilt principal rather than taken from
/// the stored interest component. The late fee is the fee the loan accrues
/// with every payment except `original`, so a fee that payment settled is
/// counted once.
pub fn reconstruct_pre_payment(engine: &AccrualEngine<'_>, original: &Payment, today: NaiveDate) -> AmountsDue {
    let principal = engine.remaining_balance() + original.principal_amount;

    let others: Vec<Payment> = engine
        .payments()
        .iter()
        .filter(|p| p.id != original.id)
        .cloned()
        .collect();
    let mut loan = engine.loan().clone();
    loan.status = LoanStatus::for_balance(principal);

    AmountsDue {
        late_fee: AccrualEngine::new(&loan, &others).accumulated_late_fees(today),
        interest: principal.apply_rate(INTEREST_RATE),
        principal,
    }
}

/// recomputes a historical payment's split as the waterfall would have
/// produced it for a different cash amount
#[derive(Debug, Clone, Copy, Default)]
pub struct AmendmentCalculator {
    allocator: WaterfallAllocator,
}

impl AmendmentCalculator {
    pub fn new() -> Self {
        Self {
            allocator: WaterfallAllocator::new(),
        }
    }

    /// new components for `original` when its cash amount becomes `new_amount`
    pub fn recalculate(
        &self,
        engine: &AccrualEngine<'_>,
        original: &Payment,
        new_amount: Money,
        today: NaiveDate,
    ) -> Result<PaymentSplit> {
        let pre_payment = reconstruct_pre_payment(engine, original, today);
        self.allocator.allocate(new_amount, &pre_payment)
    }
}
