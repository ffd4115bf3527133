/// dashboard - a small book with attendants and aggregated figures
use chrono::{NaiveDate, TimeZone, Utc};
use microcredit_rs::{
    Borrower, CreditState, LoanBook, LoanProductConfig, LoanTerms, Money, Operator, PaymentRequest,
    SafeTimeProvider, TimeSource,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    ));
    let manager = Operator::manager("gestor");
    let mut book = LoanBook::new(LoanProductConfig::standard())?;

    let rui = book.create_attendant(&manager, "Rui Costa", Some("rui@example.com".to_string()), &time)?.id;

    let loans = [
        ("Ana Silva", 10_000, 1, date(2025, 1, 10)),
        ("Bruno Dias", 100_000, 3, date(2025, 2, 15)),
        ("Carla Lopes", 20_000, 1, date(2025, 2, 5)),
        ("Dina Gomes", 5_000, 2, date(2025, 1, 8)),
    ];

    let mut ids = Vec::new();
    for (name, principal, months, start) in loans {
        let loan = book.create_loan(
            &manager,
            Borrower::new(name, "923000000", "Trader", Money::from_major(80_000)),
            LoanTerms::new(Money::from_major(principal), months, start),
            None,
            &time,
        )?;
        ids.push(loan.id);
    }

    book.record_payment(&manager, PaymentRequest::new(ids[0], Money::from_major(2_000), date(2025, 1, 25), "Cash"), &time)?;
    book.record_payment(
        &manager,
        PaymentRequest::new(ids[1], Money::from_major(43_333), date(2025, 2, 28), "Transfer").attendant(rui),
        &time,
    )?;
    book.record_payment(&manager, PaymentRequest::new(ids[2], Money::from_major(21_800), date(2025, 2, 27), "Transfer"), &time)?;

    let dashboard = book.dashboard(&Operator::read_only("viewer"), &time)?;
    println!("{}", dashboard.to_json_pretty()?);

    let viewer = Operator::read_only("viewer");
    for loan in book.loans_in_state(&viewer, CreditState::Overdue, &time)? {
        println!("overdue: {} owes {}", loan.borrower.name, loan.outstanding());
    }

    let february = book.monthly_summary(&viewer, 2025, 2)?;
    println!(
        "february: {} loans granted {}, received {}",
        february.originated.len(),
        february.principal_granted,
        february.payments_received
    );

    Ok(())
}
