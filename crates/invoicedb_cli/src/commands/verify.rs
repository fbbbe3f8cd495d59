//! Verify command implementation.

use invoicedb_core::{Config, ScanReport};

/// Runs the verify command.
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying data file {:?}", config.file_path);
    println!();

    let db = super::open_file(config)?;
    let report = db.scan()?;
    print_report(&report);

    println!();
    if report.is_clean() {
        println!("✓ Data file verification passed");
        Ok(())
    } else {
        println!("✗ Data file verification failed");
        Err("Verification failed".into())
    }
}

fn print_report(report: &ScanReport) {
    println!("Lines checked:  {}", report.line_count);
    println!("Valid invoices: {}", report.record_count);

    if !report.malformed.is_empty() {
        println!();
        println!("Malformed lines:");
        for (line_number, reason) in &report.malformed {
            println!("  line {line_number}: {reason}");
        }
    }

    if !report.missing_ids.is_empty() {
        println!();
        println!("Invoices without an id:");
        for line_number in &report.missing_ids {
            println!("  line {line_number}");
        }
    }

    if !report.duplicate_ids.is_empty() {
        println!();
        println!("Duplicate ids:");
        for id in &report.duplicate_ids {
            println!("  {id}");
        }
    }
}
