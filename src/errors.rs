use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    #[error("Overpayment! Total to clear the loan (including fees/interest) is {clearance}")]
    Overpayment {
        clearance: Money,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("this loan is already fully paid")]
    LoanAlreadyPaid,

    #[error("member already has an active loan")]
    ActiveLoanExists,

    #[error("member has no savings balance")]
    NoSavings,

    #[error("loan exceeds limit: maximum allowed based on savings is {maximum}")]
    LoanLimitExceeded {
        maximum: Money,
    },

    #[error("monthly payment cannot exceed the loan amount")]
    MonthlyPaymentExceedsAmount,

    #[error("loan amount {amount} is below principal already collected {collected}")]
    AmountBelowPrincipalPaid {
        amount: Money,
        collected: Money,
    },

    #[error("cannot delete member with an unpaid loan")]
    MemberHasUnpaidLoan,

    #[error("cannot delete member with savings of {total}")]
    MemberHasSavings {
        total: Money,
    },

    #[error("member with phone number {phone_number} already exists")]
    DuplicatePhoneNumber {
        phone_number: String,
    },

    #[error("search query must be at least {min} characters")]
    SearchQueryTooShort {
        min: usize,
    },

    #[error("integrity conflict: {message}")]
    IntegrityConflict {
        message: String,
    },

    #[error("internal failure")]
    Internal,
}

impl LedgerError {
    /// true for business-rule rejections that leave the store untouched
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            LedgerError::NotFound { .. } | LedgerError::IntegrityConflict { .. } | LedgerError::Internal
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// failures raised by a durable store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation {
        constraint: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
    },
}
