//! Record commands: get, find, list, delete, clear and count.

use invoicedb_core::{Config, Invoice, InvoiceId};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Prints the invoice with `id`.
pub fn get(config: &Config, id: u64, format: &str) -> CmdResult {
    let db = super::open(config)?;
    let invoice = db
        .get_by_id(InvoiceId::new(id))?
        .ok_or_else(|| format!("no invoice with id {id}"))?;
    output(&[invoice], format)
}

/// Prints the first invoice numbered `number`.
pub fn find(config: &Config, number: &str, format: &str) -> CmdResult {
    let db = super::open(config)?;
    let invoice = db
        .get_by_number(number)?
        .ok_or_else(|| format!("no invoice numbered {number:?}"))?;
    output(&[invoice], format)
}

/// Prints every invoice.
pub fn list(config: &Config, format: &str) -> CmdResult {
    let db = super::open(config)?;
    let invoices = db.get_all()?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&invoices)?),
        _ => {
            println!("{:>6}  {:<20}  {:<10}  {:>12}", "ID", "NUMBER", "ISSUED", "GROSS");
            for invoice in &invoices {
                println!(
                    "{:>6}  {:<20}  {:<10}  {:>12}",
                    display_id(invoice),
                    invoice.number,
                    invoice.issued_date,
                    invoice.total_gross()
                );
            }
            println!();
            println!("{} invoice(s)", invoices.len());
        }
    }
    Ok(())
}

/// Deletes the invoice with `id`.
pub fn delete(config: &Config, id: u64) -> CmdResult {
    super::open(config)?.delete(InvoiceId::new(id))?;
    println!("Deleted invoice {id}");
    Ok(())
}

/// Deletes every invoice.
pub fn clear(config: &Config) -> CmdResult {
    super::open(config)?.delete_all()?;
    println!("Deleted all invoices");
    Ok(())
}

/// Prints the number of stored invoices.
pub fn count(config: &Config) -> CmdResult {
    println!("{}", super::open(config)?.count()?);
    Ok(())
}

fn output(invoices: &[Invoice], format: &str) -> CmdResult {
    for invoice in invoices {
        match format {
            "json" => println!("{}", serde_json::to_string_pretty(invoice)?),
            _ => print_invoice(invoice),
        }
    }
    Ok(())
}

fn display_id(invoice: &Invoice) -> String {
    invoice
        .id
        .map_or_else(|| "-".to_owned(), |id| id.to_string())
}

/// Prints one invoice as text.
pub fn print_invoice(invoice: &Invoice) {
    println!("Invoice {} (id {})", invoice.number, display_id(invoice));
    println!("  Issued:  {}", invoice.issued_date);
    println!("  Due:     {}", invoice.due_date);
    println!("  Seller:  {}", invoice.seller.name);
    println!("  Buyer:   {}", invoice.buyer.name);

    if !invoice.entries.is_empty() {
        println!("  Entries:");
        for entry in &invoice.entries {
            println!(
                "    {} x{} @ {} ({} VAT) = {} net, {} gross",
                entry.description,
                entry.quantity,
                entry.price,
                entry.vat_rate,
                entry.net_value,
                entry.gross_value
            );
        }
    }

    println!(
        "  Total:   {} net, {} gross",
        invoice.total_net(),
        invoice.total_gross()
    );
}
