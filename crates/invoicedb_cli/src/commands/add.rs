//! Add command implementation.

use super::records::print_invoice;
use chrono::NaiveDate;
use clap::Args;
use invoicedb_core::{Company, Config, Invoice, InvoiceEntry, Money, Vat};

/// Arguments for `invoicedb add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Invoice number
    #[arg(short, long)]
    pub number: String,

    /// Seller name
    #[arg(long, default_value = "")]
    pub seller: String,

    /// Buyer name
    #[arg(long, default_value = "")]
    pub buyer: String,

    /// Date of issue (YYYY-MM-DD, default today)
    #[arg(long)]
    pub issued: Option<NaiveDate>,

    /// Due date (YYYY-MM-DD, default the date of issue)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Line item as DESCRIPTION:QUANTITY:PRICE:VAT, e.g. "Paper:2:12.50:23"
    #[arg(short, long = "entry", value_parser = parse_entry)]
    pub entries: Vec<InvoiceEntry>,
}

/// Runs the add command.
pub fn run(config: &Config, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Invoice::builder()
        .number(args.number)
        .seller(Company::named(args.seller))
        .buyer(Company::named(args.buyer))
        .entries(args.entries);
    if let Some(date) = args.issued {
        builder = builder.issued_date(date);
    }
    if let Some(date) = args.due {
        builder = builder.due_date(date);
    }

    let db = super::open(config)?;
    let stored = db.save(builder.build())?;
    print_invoice(&stored);
    Ok(())
}

/// Parses `DESCRIPTION:QUANTITY:PRICE:VAT`. The description may contain `:`.
fn parse_entry(s: &str) -> Result<InvoiceEntry, String> {
    let mut parts = s.rsplitn(4, ':');
    let (Some(vat), Some(price), Some(quantity), Some(description)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected DESCRIPTION:QUANTITY:PRICE:VAT, got {s:?}"));
    };

    let quantity: u64 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity {quantity:?}"))?;
    let price: Money = price.parse().map_err(|e| format!("{e}"))?;
    let vat: Vat = vat.parse().map_err(|e| format!("{e}"))?;
    InvoiceEntry::new(description, quantity, price, vat).map_err(|e| format!("{e}"))
}
