use hourglass_rs::SafeTimeProvider;
use tracing::{error, info, instrument, warn};

use crate::config::LedgerConfig;
use crate::dashboard::DashboardStats;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result, StoreError};
use crate::events::{EventStore, LedgerEvent};
use crate::lifecycle::{self, StatusChange};
use crate::loans::{Loan, LoanDeleted, LoanUpdate, NewLoan};
use crate::members::{total_savings, Member, MemberDeleted, MemberUpdate, NewMember, Savings, SavingsDeleted};
use crate::notifier::Notifier;
use crate::payments::{AmendmentCalculator, Payment, PaymentDeleted, WaterfallAllocator};
use crate::reminders::{self, ReminderReport};
use crate::store::{DurableStore, Page, Record, Tables, Transaction};
use crate::types::{LoanId, MemberId, PaymentId, SavingsId};
use crate::views::{LoanView, MemberDetail};

const MIN_SEARCH_CHARS: usize = 2;
const SEARCH_LIMIT: usize = 10;

/// cooperative ledger service; every mutation runs inside one transaction
/// and its events are appended only once that transaction commits
pub struct Ledger<S: DurableStore, N: Notifier> {
    store: S,
    notifier: N,
    config: LedgerConfig,
    events: EventStore,
}

impl<S: DurableStore, N: Notifier> Ledger<S, N> {
    pub fn new(store: S, notifier: N, config: LedgerConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            events: EventStore::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.take_events()
    }

    // members

    #[instrument(name = "ledger.register_member", skip(self, time), err)]
    pub fn register_member(&mut self, details: NewMember, time: &SafeTimeProvider) -> Result<Member> {
        let mut tx = self.begin()?;
        ensure_phone_available(&tx, &details.phone_number, None)?;

        let member = Member::register(details, time.now());
        tx.add(member.clone());
        commit(tx)?;

        self.events.emit(LedgerEvent::MemberRegistered {
            member_id: member.id,
            timestamp: member.created_at,
        });
        info!(member_id = %member.id, "member registered");
        Ok(member)
    }

    #[instrument(name = "ledger.update_member", skip(self, time), err)]
    pub fn update_member(&mut self, member_id: MemberId, update: MemberUpdate, time: &SafeTimeProvider) -> Result<Member> {
        let mut tx = self.begin()?;
        let mut member: Member = fetch(&tx, member_id)?;
        if let Some(phone_number) = &update.phone_number {
            ensure_phone_available(&tx, phone_number, Some(member_id))?;
        }

        member.apply(update, time.now());
        tx.add(member.clone());
        commit(tx)?;
        Ok(member)
    }

    /// members in registration order
    pub fn list_members(&self, page: Page) -> Result<Vec<Member>> {
        let tx = self.begin()?;
        Ok(tx.query(|_: &Member| true, page))
    }

    /// members whose first or last name contains `query` (ignoring case) or
    /// whose phone number contains it, capped at ten
    #[instrument(name = "ledger.search_members", skip(self), err)]
    pub fn search_members(&self, query: &str) -> Result<Vec<Member>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Err(LedgerError::SearchQueryTooShort { min: MIN_SEARCH_CHARS });
        }

        let needle = query.to_lowercase();
        let tx = self.begin()?;
        Ok(tx.query(
            |m: &Member| {
                m.first_name.to_lowercase().contains(&needle)
                    || m.last_name.to_lowercase().contains(&needle)
                    || m.phone_number.contains(query)
            },
            Page::new(0, SEARCH_LIMIT),
        ))
    }

    #[instrument(name = "ledger.member_detail", skip(self, time), err)]
    pub fn member_detail(&self, member_id: MemberId, time: &SafeTimeProvider) -> Result<MemberDetail> {
        let tx = self.begin()?;
        let member: Member = fetch(&tx, member_id)?;
        let savings = member_savings(&tx, member_id);
        let loans: Vec<(Loan, Vec<Payment>)> = member_loans(&tx, member_id)
            .into_iter()
            .map(|loan| {
                let payments = loan_payments(&tx, loan.id);
                (loan, payments)
            })
            .collect();

        Ok(MemberDetail::build(member, savings, &loans, time.now().date_naive()))
    }

    /// a member may only be deleted once every loan is paid and no savings remain;
    /// their savings rows and paid loans go with them
    #[instrument(name = "ledger.delete_member", skip(self, time), err)]
    pub fn delete_member(&mut self, member_id: MemberId, time: &SafeTimeProvider) -> Result<MemberDeleted> {
        let mut tx = self.begin()?;
        let member: Member = fetch(&tx, member_id)?;
        let loans = member_loans(&tx, member_id);
        let savings = total_savings(&member_savings(&tx, member_id));

        if let Err(e) = lifecycle::ensure_member_deletable(&loans, savings) {
            warn!(member_id = %member_id, reason = %e, "member deletion rejected");
            return Err(e);
        }

        tx.delete::<Member>(member_id);
        commit(tx)?;

        self.events.emit(LedgerEvent::MemberDeleted {
            member_id,
            timestamp: time.now(),
        });
        info!(member_id = %member_id, "member deleted");
        Ok(MemberDeleted {
            first_name: member.first_name,
            last_name: member.last_name,
        })
    }

    // savings

    #[instrument(name = "ledger.add_savings", skip(self, time), err)]
    pub fn add_savings(&mut self, member_id: MemberId, amount: Money, time: &SafeTimeProvider) -> Result<Savings> {
        ensure_deposit_amount(amount)?;
        let mut tx = self.begin()?;
        let _: Member = fetch(&tx, member_id)?;

        let deposit = Savings::deposit(member_id, amount, time.now());
        tx.add(deposit.clone());
        commit(tx)?;

        self.events.emit(LedgerEvent::SavingsDeposited {
            member_id,
            savings_id: deposit.id,
            amount,
            timestamp: deposit.created_at,
        });
        info!(member_id = %member_id, amount = %amount, "savings deposited");
        Ok(deposit)
    }

    #[instrument(name = "ledger.update_savings", skip(self, time), err)]
    pub fn update_savings(&mut self, savings_id: SavingsId, amount: Money, time: &SafeTimeProvider) -> Result<Savings> {
        ensure_deposit_amount(amount)?;
        let mut tx = self.begin()?;
        let mut deposit: Savings = fetch(&tx, savings_id)?;

        deposit.amount = amount;
        deposit.updated_at = time.now();
        tx.add(deposit.clone());
        commit(tx)?;
        Ok(deposit)
    }

    #[instrument(name = "ledger.delete_savings", skip(self), err)]
    pub fn delete_savings(&mut self, savings_id: SavingsId) -> Result<SavingsDeleted> {
        let mut tx = self.begin()?;
        let deposit: Savings = fetch(&tx, savings_id)?;
        let member: Member = fetch(&tx, deposit.member_id)?;

        tx.delete::<Savings>(savings_id);
        commit(tx)?;
        Ok(SavingsDeleted {
            member: member.full_name(),
            amount: deposit.amount,
        })
    }

    // loans

    #[instrument(name = "ledger.issue_loan", skip(self, time), err)]
    pub fn issue_loan(&mut self, member_id: MemberId, terms: NewLoan, time: &SafeTimeProvider) -> Result<Loan> {
        let mut tx = self.begin()?;
        let _: Member = fetch(&tx, member_id)?;
        let existing = member_loans(&tx, member_id);
        let savings = total_savings(&member_savings(&tx, member_id));

        if let Err(e) =
            lifecycle::ensure_can_issue_loan(&existing, savings, &terms, self.config.max_loan_to_savings_ratio)
        {
            warn!(member_id = %member_id, reason = %e, "loan issuance rejected");
            return Err(e);
        }

        let loan = Loan::issue(member_id, &terms, time.now());
        tx.add(loan.clone());
        commit(tx)?;

        self.events.emit(LedgerEvent::LoanIssued {
            loan_id: loan.id,
            member_id,
            amount: loan.amount,
            monthly_payment: loan.monthly_payment,
            timestamp: loan.approved_at,
        });
        info!(loan_id = %loan.id, amount = %loan.amount, "loan issued");
        Ok(loan)
    }

    /// administrative edit of a loan's terms; status is re-derived afterwards
    #[instrument(name = "ledger.update_loan", skip(self, time), err)]
    pub fn update_loan(&mut self, loan_id: LoanId, terms: LoanUpdate, time: &SafeTimeProvider) -> Result<Loan> {
        let mut tx = self.begin()?;
        let mut loan: Loan = fetch(&tx, loan_id)?;
        let payments = loan_payments(&tx, loan_id);

        lifecycle::ensure_terms_editable(&loan.accrual(&payments), &terms)?;

        loan.amount = terms.amount;
        loan.monthly_payment = terms.monthly_payment;
        let status = lifecycle::derived_status(&loan.accrual(&payments));
        let change = lifecycle::transition(&mut loan, status);

        tx.add(loan.clone());
        commit(tx)?;

        self.emit_status_change(change, time);
        info!(loan_id = %loan_id, amount = %loan.amount, "loan terms updated");
        Ok(loan)
    }

    /// hard delete with no balance checks; payments go with the loan
    #[instrument(name = "ledger.delete_loan", skip(self, time), err)]
    pub fn delete_loan(&mut self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<LoanDeleted> {
        let mut tx = self.begin()?;
        let loan: Loan = fetch(&tx, loan_id)?;
        let member: Member = fetch(&tx, loan.member_id)?;
        let payments = loan_payments(&tx, loan_id);
        let remaining_amount = loan.accrual(&payments).remaining_balance();

        tx.delete::<Loan>(loan_id);
        commit(tx)?;

        self.events.emit(LedgerEvent::LoanDeleted {
            loan_id,
            remaining_amount,
            timestamp: time.now(),
        });
        info!(loan_id = %loan_id, "loan deleted");
        Ok(LoanDeleted {
            member: member.full_name(),
            amount: loan.amount,
            payment_times: payments.len(),
            remaining_amount,
        })
    }

    #[instrument(name = "ledger.loan_view", skip(self, time), err)]
    pub fn loan_view(&self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<LoanView> {
        let tx = self.begin()?;
        let loan: Loan = fetch(&tx, loan_id)?;
        let payments = loan_payments(&tx, loan_id);
        Ok(LoanView::from_loan(&loan, &payments, time.now().date_naive()))
    }

    // payments

    /// split `cash` across late fees, interest and principal and store it
    #[instrument(name = "ledger.record_payment", skip(self, time), err)]
    pub fn record_payment(&mut self, loan_id: LoanId, cash: Money, time: &SafeTimeProvider) -> Result<Payment> {
        let now = time.now();
        let mut tx = self.begin()?;
        let mut loan: Loan = fetch(&tx, loan_id)?;
        if loan.status.is_paid() {
            warn!(loan_id = %loan_id, "payment on a paid loan rejected");
            return Err(LedgerError::LoanAlreadyPaid);
        }

        let payments = loan_payments(&tx, loan_id);
        let due = loan.accrual(&payments).amounts_due(now.date_naive());
        let split = WaterfallAllocator::new().allocate(cash, &due).map_err(|e| {
            warn!(loan_id = %loan_id, cash = %cash, reason = %e, "payment rejected");
            e
        })?;

        let payment = Payment::new(loan_id, split, now);
        let status = lifecycle::status_after_payment(loan.status, due.principal, split.principal);
        let change = lifecycle::transition(&mut loan, status);

        tx.add(payment.clone());
        tx.add(loan);
        commit(tx)?;

        self.events.emit(LedgerEvent::PaymentRecorded {
            loan_id,
            payment_id: payment.id,
            split,
            timestamp: now,
        });
        self.emit_status_change(change, time);
        info!(
            loan_id = %loan_id,
            late_fee = %split.late_fee,
            interest = %split.interest,
            principal = %split.principal,
            "payment recorded"
        );
        Ok(payment)
    }

    /// re-split a historical payment as if `new_amount` had been paid instead;
    /// the payment and the loan status commit together
    #[instrument(name = "ledger.amend_payment", skip(self, time), err)]
    pub fn amend_payment(&mut self, payment_id: PaymentId, new_amount: Money, time: &SafeTimeProvider) -> Result<Payment> {
        let mut tx = self.begin()?;
        let original: Payment = fetch(&tx, payment_id)?;
        let mut loan: Loan = fetch(&tx, original.loan_id)?;
        let mut payments = loan_payments(&tx, loan.id);

        let split = AmendmentCalculator::new()
            .recalculate(&loan.accrual(&payments), &original, new_amount, time.now().date_naive())
            .map_err(|e| {
                warn!(payment_id = %payment_id, amount = %new_amount, reason = %e, "amendment rejected");
                e
            })?;

        let mut amended = original.clone();
        amended.apply_split(split);
        for p in payments.iter_mut().filter(|p| p.id == payment_id) {
            p.apply_split(split);
        }
        let status = lifecycle::derived_status(&loan.accrual(&payments));
        let change = lifecycle::transition(&mut loan, status);

        tx.add(amended.clone());
        tx.add(loan);
        commit(tx)?;

        self.events.emit(LedgerEvent::PaymentAmended {
            loan_id: amended.loan_id,
            payment_id,
            old_split: original.split(),
            new_split: split,
            timestamp: time.now(),
        });
        self.emit_status_change(change, time);
        info!(payment_id = %payment_id, amount = %new_amount, "payment amended");
        Ok(amended)
    }

    /// remove a payment and re-derive the loan status from what remains
    #[instrument(name = "ledger.delete_payment", skip(self, time), err)]
    pub fn delete_payment(&mut self, payment_id: PaymentId, time: &SafeTimeProvider) -> Result<PaymentDeleted> {
        let mut tx = self.begin()?;
        let payment: Payment = fetch(&tx, payment_id)?;
        let mut loan: Loan = fetch(&tx, payment.loan_id)?;
        let member: Member = fetch(&tx, loan.member_id)?;

        tx.delete::<Payment>(payment_id);
        let remaining = loan_payments(&tx, loan.id);
        let status = lifecycle::derived_status(&loan.accrual(&remaining));
        let change = lifecycle::transition(&mut loan, status);
        tx.add(loan);
        commit(tx)?;

        self.events.emit(LedgerEvent::PaymentDeleted {
            loan_id: payment.loan_id,
            payment_id,
            amount: payment.total_amount(),
            timestamp: time.now(),
        });
        self.emit_status_change(change, time);
        info!(payment_id = %payment_id, "payment deleted");
        Ok(PaymentDeleted {
            member_names: member.full_name(),
            payment_amount: payment.total_amount(),
        })
    }

    // reporting

    #[instrument(name = "ledger.dashboard", skip(self, time), err)]
    pub fn dashboard(&self, time: &SafeTimeProvider) -> Result<DashboardStats> {
        let tables = self.snapshot()?;
        Ok(DashboardStats::compute(&tables, time.now().date_naive()))
    }

    /// notify about loans falling due within the configured window; never
    /// writes, and a failed notification is only logged
    #[instrument(name = "ledger.run_due_reminders", skip(self, time), err)]
    pub fn run_due_reminders(&self, time: &SafeTimeProvider) -> Result<ReminderReport> {
        let tables = self.snapshot()?;
        let window = self.config.reminder_window_days;
        let due = reminders::scan_due_loans(&tables, time.now().date_naive(), window);

        if due.is_empty() {
            info!(window_days = window, "no loans due within the reminder window");
            return Ok(ReminderReport::default());
        }

        let body = reminders::compose_body(&due, window);
        let notified = match self.notifier.notify(&self.config.reminder_subject, &body) {
            Ok(()) => {
                info!(count = due.len(), "due reminder sent");
                true
            }
            Err(e) => {
                error!(error = %e, count = due.len(), "due reminder delivery failed");
                false
            }
        };
        Ok(ReminderReport { due, notified })
    }

    fn begin(&self) -> Result<Transaction<'_>> {
        Transaction::begin(&self.store).map_err(store_failure)
    }

    fn snapshot(&self) -> Result<Tables> {
        self.store.load().map_err(store_failure)
    }

    fn emit_status_change(&mut self, change: Option<StatusChange>, time: &SafeTimeProvider) {
        if let Some(change) = change {
            info!(loan_id = %change.loan_id, from = %change.from, to = %change.to, "loan status changed");
            self.events.emit(LedgerEvent::LoanStatusChanged {
                loan_id: change.loan_id,
                old_status: change.from,
                new_status: change.to,
                timestamp: time.now(),
            });
        }
    }
}

fn commit(tx: Transaction<'_>) -> Result<()> {
    tx.commit().map_err(store_failure)
}

/// uniqueness failures surface as conflicts; everything else is logged in
/// full and reported without detail
fn store_failure(err: StoreError) -> LedgerError {
    match err {
        StoreError::UniqueViolation { constraint } => {
            warn!(constraint = %constraint, "commit rejected by unique constraint");
            LedgerError::IntegrityConflict {
                message: format!("{constraint} already exists"),
            }
        }
        other => {
            error!(error = %other, "store failure, transaction rolled back");
            LedgerError::Internal
        }
    }
}

fn fetch<R: Record>(tx: &Transaction<'_>, id: uuid::Uuid) -> Result<R> {
    tx.get::<R>(id).cloned().ok_or(LedgerError::NotFound { entity: R::ENTITY, id })
}

fn ensure_phone_available(tx: &Transaction<'_>, phone_number: &str, except: Option<MemberId>) -> Result<()> {
    let taken = !tx
        .query(
            |m: &Member| m.phone_number == phone_number && Some(m.id) != except,
            Page::new(0, 1),
        )
        .is_empty();
    if taken {
        warn!(phone_number, "duplicate phone number rejected");
        return Err(LedgerError::DuplicatePhoneNumber {
            phone_number: phone_number.to_string(),
        });
    }
    Ok(())
}

/// deposits may be zero but never negative or above the amount ceiling
fn ensure_deposit_amount(amount: Money) -> Result<()> {
    if amount.is_negative() || amount > Money::max_amount() {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}

fn member_loans(tx: &Transaction<'_>, member_id: MemberId) -> Vec<Loan> {
    tx.query(|l: &Loan| l.member_id == member_id, Page::all())
}

fn member_savings(tx: &Transaction<'_>, member_id: MemberId) -> Vec<Savings> {
    tx.query(|s: &Savings| s.member_id == member_id, Page::all())
}

fn loan_payments(tx: &Transaction<'_>, loan_id: LoanId) -> Vec<Payment> {
    tx.query(|p: &Payment| p.loan_id == loan_id, Page::all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    use crate::notifier::RecordingNotifier;
    use crate::store::MemoryStore;
    use crate::types::LoanStatus;

    fn clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()))
    }

    fn ledger() -> Ledger<MemoryStore, RecordingNotifier> {
        Ledger::new(MemoryStore::new(), RecordingNotifier::new(), LedgerConfig::default())
    }

    fn applicant(phone: &str) -> NewMember {
        NewMember {
            first_name: "Claudine".to_string(),
            last_name: "Uwimana".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 5, 17).unwrap(),
            gender: "Female".to_string(),
            phone_number: phone.to_string(),
        }
    }

    fn money(s: &str) -> Money {
        Money::from_str_exact(s).unwrap()
    }

    fn funded_member(ledger: &mut Ledger<MemoryStore, RecordingNotifier>, time: &SafeTimeProvider, savings: i64) -> Member {
        let member = ledger.register_member(applicant("0788123456"), time).unwrap();
        ledger.add_savings(member.id, Money::from_major(savings), time).unwrap();
        member
    }

    #[test]
    fn test_first_payment_split() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 1_000);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(1_000), Money::from_major(100)), &time)
            .unwrap();

        let payment = ledger.record_payment(loan.id, Money::from_major(100), &time).unwrap();
        assert_eq!(payment.interest_amount, money("15.00"));
        assert_eq!(payment.principal_amount, money("85.00"));
        assert_eq!(payment.late_fee_amount, Money::ZERO);
    }

    #[test]
    fn test_overpayment_leaves_store_untouched() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 500);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(200), Money::from_major(50)), &time)
            .unwrap();
        let before = ledger.store().load().unwrap();

        match ledger.record_payment(loan.id, Money::from_major(300), &time) {
            Err(LedgerError::Overpayment { clearance }) => assert_eq!(clearance, money("203.00")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(ledger.store().load().unwrap(), before);
    }

    #[test]
    fn test_clearing_payment_closes_loan_and_blocks_further_payments() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 500);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(200), Money::from_major(50)), &time)
            .unwrap();

        ledger.record_payment(loan.id, Money::from_major(203), &time).unwrap();
        let view = ledger.loan_view(loan.id, &time).unwrap();
        assert_eq!(view.status, LoanStatus::Paid);
        assert_eq!(view.remaining_balance, Money::ZERO);
        assert_eq!(view.next_due_date, None);

        assert!(matches!(
            ledger.record_payment(loan.id, Money::from_major(1), &time),
            Err(LedgerError::LoanAlreadyPaid)
        ));
        assert!(ledger.events().iter().any(|e| matches!(
            e,
            LedgerEvent::LoanStatusChanged { new_status: LoanStatus::Paid, .. }
        )));
    }

    #[test]
    fn test_delete_payment_reopens_only_when_balance_returns() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 500);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(200), Money::from_major(50)), &time)
            .unwrap();

        let control = time.test_control().unwrap();

        // 3.00 interest then 100.00 principal
        ledger.record_payment(loan.id, Money::from_major(103), &time).unwrap();
        control.advance(Duration::days(1));
        // 1.50 interest clears the last 100.00
        let second = ledger.record_payment(loan.id, money("101.50"), &time).unwrap();
        assert_eq!(second.principal_amount, Money::from_major(100));
        assert_eq!(ledger.loan_view(loan.id, &time).unwrap().status, LoanStatus::Paid);

        let deleted = ledger.delete_payment(second.id, &time).unwrap();
        assert_eq!(deleted.member_names, "Claudine Uwimana");
        assert_eq!(deleted.payment_amount, money("101.50"));

        let view = ledger.loan_view(loan.id, &time).unwrap();
        assert_eq!(view.status, LoanStatus::Active);
        assert_eq!(view.remaining_balance, Money::from_major(100));
    }

    #[test]
    fn test_deleting_non_clearing_payment_keeps_loan_paid() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 500);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(200), Money::from_major(50)), &time)
            .unwrap();

        let interest_only = ledger.record_payment(loan.id, money("3.00"), &time).unwrap();
        assert_eq!(interest_only.interest_amount, money("3.00"));
        assert_eq!(interest_only.principal_amount, Money::ZERO);
        ledger.record_payment(loan.id, Money::from_major(203), &time).unwrap();
        assert_eq!(ledger.loan_view(loan.id, &time).unwrap().status, LoanStatus::Paid);
        ledger.take_events();

        ledger.delete_payment(interest_only.id, &time).unwrap();

        let view = ledger.loan_view(loan.id, &time).unwrap();
        assert_eq!(view.status, LoanStatus::Paid);
        assert_eq!(view.remaining_balance, Money::ZERO);
        assert!(!ledger
            .events()
            .iter()
            .any(|e| matches!(e, LedgerEvent::LoanStatusChanged { .. })));
        assert!(matches!(ledger.events(), [LedgerEvent::PaymentDeleted { .. }]));
    }

    #[test]
    fn test_amend_late_payment_to_same_amount_keeps_split() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 5_000);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(10_000), Money::from_major(1_000)), &time)
            .unwrap();

        time.test_control().unwrap().advance(Duration::days(65));
        let payment = ledger.record_payment(loan.id, Money::from_major(100), &time).unwrap();
        assert_eq!(payment.late_fee_amount, money("60.00"));
        assert_eq!(payment.interest_amount, money("40.00"));

        let amended = ledger.amend_payment(payment.id, payment.total_amount(), &time).unwrap();
        assert_eq!(amended.split(), payment.split());
        assert_eq!(ledger.loan_view(loan.id, &time).unwrap().remaining_balance, Money::from_major(10_000));
    }

    #[test]
    fn test_amend_payment_recomputes_from_prepayment_state() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 500);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(500), Money::from_major(100)), &time)
            .unwrap();
        let payment = ledger.record_payment(loan.id, Money::from_major(50), &time).unwrap();

        let amended = ledger.amend_payment(payment.id, Money::from_major(100), &time).unwrap();
        assert_eq!(amended.interest_amount, money("7.50"));
        assert_eq!(amended.principal_amount, money("92.50"));
        assert_eq!(amended.paid_at, payment.paid_at);
        assert_eq!(ledger.loan_view(loan.id, &time).unwrap().remaining_balance, money("407.50"));
    }

    #[test]
    fn test_issue_loan_limits() {
        let time = clock();
        let mut ledger = ledger();
        let member = ledger.register_member(applicant("0788000111"), &time).unwrap();

        assert!(matches!(
            ledger.issue_loan(member.id, NewLoan::new(Money::from_major(100), Money::from_major(10)), &time),
            Err(LedgerError::NoSavings)
        ));

        ledger.add_savings(member.id, Money::from_major(400), &time).unwrap();
        assert!(matches!(
            ledger.issue_loan(member.id, NewLoan::new(Money::from_major(801), Money::from_major(10)), &time),
            Err(LedgerError::LoanLimitExceeded { .. })
        ));

        ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(800), Money::from_major(100)), &time)
            .unwrap();
        assert!(matches!(
            ledger.issue_loan(member.id, NewLoan::new(Money::from_major(100), Money::from_major(10)), &time),
            Err(LedgerError::ActiveLoanExists)
        ));
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let time = clock();
        let mut ledger = ledger();
        ledger.register_member(applicant("0788555000"), &time).unwrap();

        assert!(matches!(
            ledger.register_member(applicant("0788555000"), &time),
            Err(LedgerError::DuplicatePhoneNumber { .. })
        ));
        assert_eq!(ledger.list_members(Page::all()).unwrap().len(), 1);
    }

    #[test]
    fn test_search_members_by_name_and_phone() {
        let time = clock();
        let mut ledger = ledger();
        for i in 0..12 {
            ledger.register_member(applicant(&format!("07880000{i:02}")), &time).unwrap();
        }
        let eric = ledger
            .register_member(
                NewMember {
                    first_name: "Eric".to_string(),
                    last_name: "Habimana".to_string(),
                    phone_number: "0722999888".to_string(),
                    ..applicant("unused")
                },
                &time,
            )
            .unwrap();

        let by_name = ledger.search_members("HABI").unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, eric.id);

        let by_phone = ledger.search_members("99988").unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].id, eric.id);

        // twelve members share the surname and the prefix
        assert_eq!(ledger.search_members("uwim").unwrap().len(), 10);
        assert_eq!(ledger.search_members("0788").unwrap().len(), 10);
        assert!(ledger.search_members("Mukamana").unwrap().is_empty());

        assert!(matches!(
            ledger.search_members(" a "),
            Err(LedgerError::SearchQueryTooShort { min: 2 })
        ));
    }

    #[test]
    fn test_deposit_above_ceiling_rejected() {
        let time = clock();
        let mut ledger = ledger();
        let member = ledger.register_member(applicant("0788000222"), &time).unwrap();

        let too_large = Money::max_amount() + Money::from_minor(1);
        match ledger.add_savings(member.id, too_large, &time) {
            Err(LedgerError::InvalidAmount { amount }) => assert_eq!(amount, too_large),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(ledger.store().load().unwrap().savings.is_empty());

        ledger.add_savings(member.id, Money::max_amount(), &time).unwrap();
    }

    #[test]
    fn test_update_loan_terms_rederives_status() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 1_000);
        let loan = ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(1_000), Money::from_major(100)), &time)
            .unwrap();
        ledger.record_payment(loan.id, Money::from_major(615), &time).unwrap();

        assert!(matches!(
            ledger.update_loan(loan.id, NewLoan::new(Money::from_major(500), Money::from_major(100)), &time),
            Err(LedgerError::AmountBelowPrincipalPaid { .. })
        ));

        let updated = ledger
            .update_loan(loan.id, NewLoan::new(Money::from_major(600), Money::from_major(100)), &time)
            .unwrap();
        assert_eq!(updated.status, LoanStatus::Paid);
    }

    #[test]
    fn test_reminders_notify_once_for_due_loans() {
        let time = clock();
        let mut ledger = ledger();
        let member = funded_member(&mut ledger, &time, 1_000);
        ledger
            .issue_loan(member.id, NewLoan::new(Money::from_major(1_000), Money::from_major(100)), &time)
            .unwrap();

        let quiet = ledger.run_due_reminders(&time).unwrap();
        assert!(quiet.due.is_empty());
        assert!(!quiet.notified);

        time.test_control().unwrap().advance(Duration::days(29));
        let report = ledger.run_due_reminders(&time).unwrap();
        assert!(report.notified);
        assert_eq!(report.due.len(), 1);

        let sent = ledger.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Action Required: Upcoming Loan Dues");
        assert!(sent[0].1.contains("Claudine Uwimana (Phone: 0788123456)"));
    }
}
