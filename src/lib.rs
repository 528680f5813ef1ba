pub mod config;
pub mod dashboard;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod ledger;
pub mod lifecycle;
pub mod loans;
pub mod members;
pub mod notifier;
pub mod payments;
pub mod reminders;
pub mod store;
pub mod types;
pub mod views;

// re-export key types
pub use config::LedgerConfig;
pub use dashboard::DashboardStats;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result, StoreError};
pub use events::{EventStore, LedgerEvent};
pub use interest::{AccrualEngine, PenaltyEngine, INTEREST_RATE, LATE_FEE_RATE};
pub use ledger::Ledger;
pub use loans::{Loan, LoanDeleted, LoanUpdate, NewLoan};
pub use members::{Member, MemberDeleted, MemberUpdate, NewMember, Savings, SavingsDeleted};
pub use notifier::{Notifier, NotifyError, RecordingNotifier, TracingNotifier};
pub use payments::{AmendmentCalculator, Payment, PaymentDeleted, WaterfallAllocator};
pub use reminders::{DueLoan, ReminderReport};
pub use store::{DurableStore, FileStore, MemoryStore, Page, Tables, Transaction};
pub use types::{AmountsDue, LoanId, LoanStatus, MemberId, PaymentId, PaymentSplit, SavingsId};
pub use views::{LoanView, MemberDetail, PaymentView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
