//! Serializable read models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loans::Loan;
use crate::members::{total_savings, Member, Savings};
use crate::payments::Payment;
use crate::types::{LoanId, LoanStatus, MemberId, PaymentId};

/// a payment with its derived total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub late_fee_amount: Money,
    pub total_amount: Money,
    pub paid_at: DateTime<Utc>,
}

impl PaymentView {
    pub fn from_payment(payment: &Payment) -> Self {
        PaymentView {
            id: payment.id,
            loan_id: payment.loan_id,
            principal_amount: payment.principal_amount,
            interest_amount: payment.interest_amount,
            late_fee_amount: payment.late_fee_amount,
            total_amount: payment.total_amount(),
            paid_at: payment.paid_at,
        }
    }
}

/// a loan's stored fields plus everything derived from its payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub member_id: MemberId,
    pub amount: Money,
    pub monthly_payment: Money,
    pub approved_at: DateTime<Utc>,
    pub status: LoanStatus,
    pub remaining_balance: Money,
    pub current_interest_due: Money,
    pub accumulated_late_fees: Money,
    pub next_due_date: Option<NaiveDate>,
    pub payments: Vec<PaymentView>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan, payments: &[Payment], today: NaiveDate) -> Self {
        let engine = loan.accrual(payments);
        LoanView {
            id: loan.id,
            member_id: loan.member_id,
            amount: loan.amount,
            monthly_payment: loan.monthly_payment,
            approved_at: loan.approved_at,
            status: loan.status,
            remaining_balance: engine.remaining_balance(),
            current_interest_due: engine.current_interest_due(),
            accumulated_late_fees: engine.accumulated_late_fees(today),
            next_due_date: engine.next_due_date(),
            payments: payments.iter().map(PaymentView::from_payment).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// a member with savings and loans split by status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDetail {
    pub member: Member,
    pub savings: Vec<Savings>,
    pub total_savings: Money,
    pub active_loans: Vec<LoanView>,
    pub completed_loans: Vec<LoanView>,
}

impl MemberDetail {
    /// `loans` pairs each of the member's loans with its payments
    pub fn build(member: Member, savings: Vec<Savings>, loans: &[(Loan, Vec<Payment>)], today: NaiveDate) -> Self {
        let (completed_loans, active_loans): (Vec<LoanView>, Vec<LoanView>) = loans
            .iter()
            .map(|(loan, payments)| LoanView::from_loan(loan, payments, today))
            .partition(|view| view.status.is_paid());

        MemberDetail {
            total_savings: total_savings(&savings),
            member,
            savings,
            active_loans,
            completed_loans,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::members::NewMember;
    use crate::types::PaymentSplit;

    fn loan(member_id: MemberId, status: LoanStatus) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            member_id,
            amount: Money::from_major(1_000),
            monthly_payment: Money::from_major(100),
            approved_at: Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
            status,
        }
    }

    #[test]
    fn test_loan_view_derived_fields() {
        let loan = loan(Uuid::new_v4(), LoanStatus::Active);
        let payments = vec![Payment::new(
            loan.id,
            PaymentSplit {
                late_fee: Money::ZERO,
                interest: Money::from_major(15),
                principal: Money::from_major(85),
            },
            loan.approved_at,
        )];
        let view = LoanView::from_loan(&loan, &payments, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());

        assert_eq!(view.remaining_balance, Money::from_major(915));
        assert_eq!(view.current_interest_due, Money::from_str_exact("13.72").unwrap());
        assert_eq!(view.next_due_date, NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(view.payments[0].total_amount, Money::from_major(100));

        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"remaining_balance\": \"915.00\""));
        assert!(json.contains("\"status\": \"active\""));
    }

    #[test]
    fn test_member_detail_partitions_loans() {
        let member = Member::register(
            NewMember {
                first_name: "Eric".to_string(),
                last_name: "Habimana".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 12, 24).unwrap(),
                gender: "Male".to_string(),
                phone_number: "0722000000".to_string(),
            },
            Utc::now(),
        );
        let savings = vec![Savings::deposit(member.id, Money::from_major(700), Utc::now())];
        let loans = vec![
            (loan(member.id, LoanStatus::Paid), Vec::new()),
            (loan(member.id, LoanStatus::Active), Vec::new()),
        ];

        let detail = MemberDetail::build(member, savings, &loans, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!(detail.total_savings, Money::from_major(700));
        assert_eq!(detail.active_loans.len(), 1);
        assert_eq!(detail.completed_loans.len(), 1);
        assert_eq!(detail.completed_loans[0].next_due_date, None);
    }
}
