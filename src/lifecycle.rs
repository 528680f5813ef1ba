use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::interest::AccrualEngine;
use crate::loans::{Loan, NewLoan};
use crate::types::{LoanId, LoanStatus};

/// a status flip recorded on a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub loan_id: LoanId,
    pub from: LoanStatus,
    pub to: LoanStatus,
}

/// move `loan` to `to`, returning the change if the status actually moved
pub fn transition(loan: &mut Loan, to: LoanStatus) -> Option<StatusChange> {
    if loan.status == to {
        return None;
    }
    let change = StatusChange {
        loan_id: loan.id,
        from: loan.status,
        to,
    };
    loan.status = to;
    Some(change)
}

/// the status the payment history currently implies
pub fn derived_status(engine: &AccrualEngine<'_>) -> LoanStatus {
    LoanStatus::for_balance(engine.remaining_balance())
}

/// status after a new payment retires `principal_paid` from `remaining_balance`;
/// a new payment can only close a loan, never reopen it
pub fn status_after_payment(current: LoanStatus, remaining_balance: Money, principal_paid: Money) -> LoanStatus {
    if remaining_balance - principal_paid <= Money::ZERO {
        LoanStatus::Paid
    } else {
        current
    }
}

/// loan terms must be positive, within the amount ceiling, and the
/// installment cannot exceed the principal
pub fn ensure_terms_valid(terms: &NewLoan) -> Result<()> {
    if !terms.amount.is_positive() || terms.amount > Money::max_amount() {
        return Err(LedgerError::InvalidAmount { amount: terms.amount });
    }
    if !terms.monthly_payment.is_positive() {
        return Err(LedgerError::InvalidAmount {
            amount: terms.monthly_payment,
        });
    }
    if terms.monthly_payment > terms.amount {
        return Err(LedgerError::MonthlyPaymentExceedsAmount);
    }
    Ok(())
}

/// guard for issuing a new loan to a member
///
/// Checks, in order: no other open loan, positive savings, amount within
/// `max_ratio` times savings, then the terms themselves.
pub fn ensure_can_issue_loan<'a>(
    existing_loans: impl IntoIterator<Item = &'a Loan>,
    total_savings: Money,
    terms: &NewLoan,
    max_ratio: Decimal,
) -> Result<()> {
    if existing_loans.into_iter().any(Loan::is_open) {
        return Err(LedgerError::ActiveLoanExists);
    }

    if total_savings <= Money::ZERO {
        return Err(LedgerError::NoSavings);
    }

    // a limit past the decimal range caps nothing
    if let Some(maximum) = total_savings.checked_mul(max_ratio) {
        if terms.amount > maximum {
            return Err(LedgerError::LoanLimitExceeded { maximum });
        }
    }

    ensure_terms_valid(terms)
}

/// guard for deleting a member: an unpaid loan blocks first, then savings
pub fn ensure_member_deletable<'a>(
    loans: impl IntoIterator<Item = &'a Loan>,
    total_savings: Money,
) -> Result<()> {
    if loans.into_iter().any(Loan::is_open) {
        return Err(LedgerError::MemberHasUnpaidLoan);
    }
    if total_savings > Money::ZERO {
        return Err(LedgerError::MemberHasSavings { total: total_savings });
    }
    Ok(())
}

/// guard for editing a loan's terms once payments exist
pub fn ensure_terms_editable(engine: &AccrualEngine<'_>, terms: &NewLoan) -> Result<()> {
    ensure_terms_valid(terms)?;
    let collected = engine.principal_paid();
    if terms.amount < collected {
        return Err(LedgerError::AmountBelowPrincipalPaid {
            amount: terms.amount,
            collected,
        });
    }
    Ok(())
}
