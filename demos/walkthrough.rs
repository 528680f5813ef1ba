/// walkthrough - one member, one loan, a late payment, a correction
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use ikimina_ledger::{
    Ledger, LedgerConfig, MemoryStore, Money, NewLoan, NewMember, SafeTimeProvider, TimeSource, TracingNotifier,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== cooperative ledger walkthrough ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()));
    let controller = time.test_control().unwrap();

    let mut ledger = Ledger::new(MemoryStore::new(), TracingNotifier, LedgerConfig::default());

    let member = ledger.register_member(
        NewMember {
            first_name: "Alice".to_string(),
            last_name: "Nyiramana".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            gender: "Female".to_string(),
            phone_number: "0788100200".to_string(),
        },
        &time,
    )?;
    ledger.add_savings(member.id, Money::from_major(6_000), &time)?;
    println!("registered {} with savings of 6000.00", member.full_name());

    // at most twice the savings
    let loan = ledger.issue_loan(member.id, NewLoan::new(Money::from_major(10_000), Money::from_major(1_000)), &time)?;
    println!("loan issued: {} at {} per month", loan.amount, loan.monthly_payment);

    // first installment due 2024-02-10, nothing paid until mid march
    controller.advance(Duration::days(65));
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));

    let view = ledger.loan_view(loan.id, &time)?;
    println!("late fees accrued: {}", view.accumulated_late_fees);
    println!("interest due: {}", view.current_interest_due);

    let reminders = ledger.run_due_reminders(&time)?;
    println!("loans flagged for follow-up: {}", reminders.due.len());

    let payment = ledger.record_payment(loan.id, Money::from_major(1_000), &time)?;
    println!(
        "\npayment split: late fee {}, interest {}, principal {}",
        payment.late_fee_amount, payment.interest_amount, payment.principal_amount
    );

    // the clerk typed the wrong amount
    let corrected = ledger.amend_payment(payment.id, Money::from_major(2_000), &time)?;
    println!(
        "corrected split: late fee {}, interest {}, principal {}",
        corrected.late_fee_amount, corrected.interest_amount, corrected.principal_amount
    );

    let view = ledger.loan_view(loan.id, &time)?;
    println!("remaining balance: {}", view.remaining_balance);
    println!("next due date: {:?}", view.next_due_date);

    let stats = ledger.dashboard(&time)?;
    println!("\n--- dashboard ---");
    println!("{}", serde_json::to_string_pretty(&stats)?);

    println!("\nevents recorded: {}", ledger.events().len());

    Ok(())
}
