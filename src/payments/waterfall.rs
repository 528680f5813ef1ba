use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{AmountsDue, PaymentSplit};

/// buckets in the order cash is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentComponent {
    LateFee,
    Interest,
    Principal,
}

const WATERFALL: [PaymentComponent; 3] = [
    PaymentComponent::LateFee,
    PaymentComponent::Interest,
    PaymentComponent::Principal,
];

/// splits a cash amount across late fees, interest and principal
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterfallAllocator;

impl WaterfallAllocator {
    pub fn new() -> Self {
        Self
    }

    /// reject non-positive cash and anything above what clears the loan
    pub fn validate(&self, cash: Money, due: &AmountsDue) -> Result<()> {
        if !cash.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: cash });
        }

        let clearance = due.clearance();
        if cash > clearance {
            return Err(LedgerError::Overpayment { clearance });
        }

        Ok(())
    }

    /// allocate `cash` against `due` in fixed priority order
    pub fn allocate(&self, cash: Money, due: &AmountsDue) -> Result<PaymentSplit> {
        self.validate(cash, due)?;

        let mut remaining = cash;
        let mut split = PaymentSplit::default();

        for component in WATERFALL {
            remaining = Self::apply_to_component(component, remaining, due, &mut split);
            if remaining.is_zero() {
                break;
            }
        }

        Ok(split)
    }

    fn apply_to_component(
        component: PaymentComponent,
        available: Money,
        due: &AmountsDue,
        split: &mut PaymentSplit,
    ) -> Money {
        let (owed, applied) = match component {
            PaymentComponent::LateFee => (due.late_fee, &mut split.late_fee),
            PaymentComponent::Interest => (due.interest, &mut split.interest),
            // principal absorbs whatever is left
            PaymentComponent::Principal => (available, &mut split.principal),
        };

        let payment = available.min(owed.max(Money::ZERO));
        *applied = payment;

        available - payment
    }
}
