//! Property-based test generators using proptest.
//!
//! Provides strategies for generating invoices and store operation
//! sequences, plus deterministic sample data.

use chrono::NaiveDate;
use invoicedb_core::{Company, Invoice, InvoiceEntry, InvoiceId, Money, Vat};
use proptest::prelude::*;

/// Strategy for generating invoice numbers like `FV/2024/17`.
pub fn invoice_number_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z]{1,3}/20[0-9]{2}/[0-9]{1,4}").expect("Invalid regex")
}

/// Strategy for generating dates between 2000 and 2039.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=365).prop_filter_map("Invalid ordinal", |(year, day)| {
        NaiveDate::from_yo_opt(year, day)
    })
}

/// Strategy for generating free text, including quotes, backslashes and
/// non-ASCII characters but never line terminators.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ,.:;'\"\\\\/ąęłóżźćńś€-]{0,40}").expect("Invalid regex")
}

/// Strategy for generating companies.
pub fn company_strategy() -> impl Strategy<Value = Company> {
    (
        text_strategy(),
        text_strategy(),
        prop::string::string_regex("[0-9]{3}-[0-9]{3}-[0-9]{2}-[0-9]{2}").expect("Invalid regex"),
        prop::string::string_regex("[0-9]{26}").expect("Invalid regex"),
        prop::string::string_regex("\\+48 [0-9]{9}").expect("Invalid regex"),
        prop::string::string_regex("[a-z]{1,8}@[a-z]{1,8}\\.(pl|com)").expect("Invalid regex"),
    )
        .prop_map(|(name, address, tax_id, account, phone, email)| {
            Company::named(name)
                .address(address)
                .tax_id(tax_id)
                .account_number(account)
                .phone_number(phone)
                .email(email)
        })
}

/// Strategy for generating VAT rates.
pub fn vat_strategy() -> impl Strategy<Value = Vat> {
    prop::sample::select(Vat::ALL.to_vec())
}

/// Strategy for generating entries with consistent net and gross values.
pub fn entry_strategy() -> impl Strategy<Value = InvoiceEntry> {
    (text_strategy(), 1u64..1_000, 0i64..10_000_000, vat_strategy()).prop_map(
        |(description, quantity, price, vat)| {
            InvoiceEntry::new(description, quantity, Money::from_minor(price), vat)
                .expect("Generated entry values fit")
        },
    )
}

/// Strategy for generating unsaved invoices (no id).
pub fn invoice_strategy() -> impl Strategy<Value = Invoice> {
    (
        invoice_number_strategy(),
        date_strategy(),
        0i64..90,
        company_strategy(),
        company_strategy(),
        prop::collection::vec(entry_strategy(), 0..5),
    )
        .prop_map(|(number, issued, term, seller, buyer, entries)| {
            Invoice::builder()
                .number(number)
                .issued_date(issued)
                .due_date(issued + chrono::Duration::days(term))
                .seller(seller)
                .buyer(buyer)
                .entries(entries)
                .build()
        })
}

/// Strategy for generating invoices that already carry an id.
pub fn stored_invoice_strategy() -> impl Strategy<Value = Invoice> {
    (1u64..10_000, invoice_strategy())
        .prop_map(|(id, invoice)| invoice.with_id(InvoiceId::new(id)))
}

/// An operation against a store.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Save an invoice without an id.
    Insert(Invoice),
    /// Save `Invoice` under the given id.
    Update(u64, Invoice),
    /// Delete by id.
    Delete(u64),
    /// Look up by id.
    Get(u64),
    /// Look up by number.
    Find(String),
    /// Delete everything.
    Clear,
}

/// Strategy for generating a single store operation.
///
/// Ids are drawn from `1..=max_id` so that updates and deletes often hit
/// stored records.
pub fn store_op_strategy(max_id: u64) -> impl Strategy<Value = StoreOp> {
    let id = 1..=max_id.max(1);
    prop_oneof![
        4 => invoice_strategy().prop_map(StoreOp::Insert),
        2 => (id.clone(), invoice_strategy()).prop_map(|(id, inv)| StoreOp::Update(id, inv)),
        2 => id.clone().prop_map(StoreOp::Delete),
        2 => id.prop_map(StoreOp::Get),
        1 => invoice_number_strategy().prop_map(StoreOp::Find),
        1 => Just(StoreOp::Clear),
    ]
}

/// Strategy for generating sequences of store operations.
pub fn store_ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<StoreOp>> {
    prop::collection::vec(store_op_strategy(16), 1..max_ops.max(2))
}

/// Returns a deterministic invoice numbered `number`.
///
/// Two entries, fixed dates and fully populated companies; useful wherever
/// a realistic record is needed but its content does not matter.
pub fn sample_invoice(number: &str) -> Invoice {
    let issued = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
    let due = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");

    Invoice::builder()
        .number(number)
        .issued_date(issued)
        .due_date(due)
        .seller(
            Company::named("Dev Tools Sp. z o.o.")
                .address("ul. Prosta 1, 00-001 Warszawa")
                .tax_id("521-301-72-28")
                .account_number("12 3456 7890 1234 5678 9012 3456")
                .phone_number("+48 600 100 200")
                .email("billing@devtools.test"),
        )
        .buyer(
            Company::named("Nowak Consulting")
                .address("ul. Długa 5, 30-001 Kraków")
                .tax_id("677-002-32-12")
                .email("office@nowak.test"),
        )
        .entries(vec![
            InvoiceEntry::new("Laptop stand", 2, Money::new(149, 99), Vat::Vat23)
                .expect("valid entry"),
            InvoiceEntry::new("Technical book", 1, Money::new(89, 0), Vat::Vat5)
                .expect("valid entry"),
        ])
        .build()
}
