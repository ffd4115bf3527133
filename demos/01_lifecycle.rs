/// lifecycle - a loan from origination through overdue to completion
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use microcredit_rs::{
    Borrower, LoanBook, LoanProductConfig, LoanTerms, Money, Operator, PaymentRequest,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== loan lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let admin = Operator::admin("admin");
    let mut book = LoanBook::new(LoanProductConfig::standard())?;

    // 1. origination
    println!("1. origination");
    println!("--------------");
    let loan_id = book
        .create_loan(
            &admin,
            Borrower::new("Carlos Neto", "923111222", "Farmer", Money::from_major(90_000)),
            LoanTerms::new(Money::from_major(100_000), 3, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
            Some("seed purchase".to_string()),
            &time,
        )?
        .id;

    let loan = book.get_loan(&admin, loan_id, &time)?;
    println!("  rate: {}", loan.schedule.rate);
    println!("  total repayable: {}", loan.schedule.total_repayable);
    println!("  installment: {}", loan.schedule.installment);
    println!("  maturity: {}", loan.maturity_date());
    println!("  state: {}", loan.state());

    // 2. two installments on time
    println!("\n2. servicing");
    println!("------------");
    for _ in 0..2 {
        controller.advance(Duration::days(30));
        let today = time.now().date_naive();
        let installment = book.get_loan(&admin, loan_id, &time)?.schedule.installment;
        book.record_payment(&admin, PaymentRequest::new(loan_id, installment, today, "Cash"), &time)?;

        let loan = book.get_loan(&admin, loan_id, &time)?;
        println!("  {}: paid {}, outstanding {}", today, installment, loan.outstanding());
    }

    // 3. maturity passes with a balance left
    println!("\n3. overdue");
    println!("----------");
    controller.advance(Duration::days(40));
    let loan = book.get_loan(&admin, loan_id, &time)?;
    println!("  date: {}", time.now().date_naive());
    println!("  state: {}", loan.state());
    println!("  days past maturity: {}", loan.ledger.days_past_maturity(loan.maturity_date(), time.now().date_naive()));

    // 4. settlement
    println!("\n4. settlement");
    println!("-------------");
    let balance = loan.outstanding();
    let today = time.now().date_naive();
    let payment = book.record_payment(
        &admin,
        PaymentRequest::new(loan_id, balance, today, "Transfer").receipt_number("RC-0003"),
        &time,
    )?;
    println!("  paid {}: state {}", balance, book.get_loan(&admin, loan_id, &time)?.state());

    // 5. reversing the last payment reopens the loan
    println!("\n5. reversal");
    println!("-----------");
    book.delete_payment(&admin, payment.id, &time)?;
    let loan = book.get_loan(&admin, loan_id, &time)?;
    println!("  state: {}, outstanding {}", loan.state(), loan.outstanding());

    for event in loan.events.events() {
        println!("  event: {:?}", event);
    }

    Ok(())
}
