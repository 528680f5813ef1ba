use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// how many days ahead the reminder scan looks for upcoming dues
    #[serde(default = "default_reminder_window_days")]
    pub reminder_window_days: u32,
    /// a loan may not exceed this multiple of the member's total savings
    #[serde(default = "default_max_loan_to_savings_ratio")]
    pub max_loan_to_savings_ratio: Decimal,
    /// subject line used for the reminder notification
    #[serde(default = "default_reminder_subject")]
    pub reminder_subject: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            reminder_window_days: default_reminder_window_days(),
            max_loan_to_savings_ratio: default_max_loan_to_savings_ratio(),
            reminder_subject: default_reminder_subject(),
        }
    }
}

impl LedgerConfig {
    /// parse configuration from json, missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn default_reminder_window_days() -> u32 {
    3
}

fn default_max_loan_to_savings_ratio() -> Decimal {
    dec!(2.00)
}

fn default_reminder_subject() -> String {
    "Action Required: Upcoming Loan Dues".to_string()
}
