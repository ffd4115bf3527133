/// quick start - quote, originate and pay a loan
use microcredit_rs::serialization::LoanView;
use microcredit_rs::{Borrower, Loan, Money, PaymentRequest, RateTable, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // quote 100,000 over 3 months
    let quote = microcredit_rs::simulate(&RateTable::standard(), Money::from_major(100_000), 3, 2)?;
    println!("rate {} -> total {} in installments of {}", quote.rate, quote.total_repayable, quote.installment);

    let time = SafeTimeProvider::new(TimeSource::System);

    let mut loan = Loan::builder()
        .borrower(Borrower::new("Joana Tavares", "923456789", "Merchant", Money::from_major(180_000)))
        .principal(Money::from_major(100_000))
        .duration_months(3)
        .build(&time)?;

    // first installment
    let today = time.now().date_naive();
    loan.post_payment(PaymentRequest::new(loan.id, quote.installment, today, "Cash"), &time)?;

    // print current state
    println!("{}", LoanView::from_loan(&loan).to_json_pretty()?);

    Ok(())
}
