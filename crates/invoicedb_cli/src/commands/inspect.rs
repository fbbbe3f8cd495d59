//! Inspect command implementation.

use invoicedb_core::Config;
use invoicedb_storage::LineFile;
use serde::Serialize;

/// Data file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data file path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Number of lines.
    pub line_count: usize,
    /// Lines that decode to an invoice.
    pub record_count: usize,
    /// Lines that do not decode.
    pub malformed_count: usize,
    /// Highest id on any line.
    pub max_id: Option<u64>,
    /// Id the next insert will receive.
    pub next_id: u64,
}

/// Runs the inspect command.
pub fn run(config: &Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = collect(config)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

fn collect(config: &Config) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let db = super::open_file(config)?;
    let report = db.scan()?;

    Ok(InspectResult {
        path: config.file_path.display().to_string(),
        file_size: LineFile::open(&config.file_path)?.size()?,
        line_count: report.line_count,
        record_count: report.record_count,
        malformed_count: report.malformed.len(),
        max_id: report.max_id.map(|id| id.get()),
        next_id: db.next_id_hint().get(),
    })
}

fn print_text_output(result: &InspectResult) {
    println!("InvoiceDB Data File Inspection");
    println!("==============================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {}", format_size(result.file_size));
    println!();
    println!("Lines:");
    println!("  Total:     {}", result.line_count);
    println!("  Invoices:  {}", result.record_count);
    println!("  Malformed: {}", result.malformed_count);
    println!();
    println!("Ids:");
    match result.max_id {
        Some(id) => println!("  Highest:   {id}"),
        None => println!("  Highest:   (none)"),
    }
    println!("  Next:      {}", result.next_id);
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
