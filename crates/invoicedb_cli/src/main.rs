//! InvoiceDB CLI
//!
//! Command-line tools for InvoiceDB stores.
//!
//! # Commands
//!
//! - `add` - Store a new invoice
//! - `get` / `find` - Look up an invoice by id or by number
//! - `list` - Print every stored invoice
//! - `delete` / `clear` - Remove one invoice or all of them
//! - `count` - Print the number of stored invoices
//! - `inspect` - Display file statistics and allocator state
//! - `verify` - Check every line of the data file

mod commands;

use clap::{Parser, Subcommand};
use invoicedb_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// InvoiceDB command-line tools.
#[derive(Parser)]
#[command(name = "invoicedb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data file (overrides INVOICEDB_FILE_PATH)
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new invoice
    Add(commands::add::AddArgs),

    /// Print the invoice with the given id
    Get {
        /// Invoice id
        id: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the first invoice with the given number
    Find {
        /// Invoice number
        number: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print every stored invoice
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete the invoice with the given id
    Delete {
        /// Invoice id
        id: u64,
    },

    /// Delete every invoice
    Clear {
        /// Required to confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print the number of stored invoices
    Count,

    /// Display data file statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check every line of the data file
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env()?;
    if let Some(path) = cli.path {
        config = config.file_path(path);
    }
    tracing::debug!(?config, "resolved configuration");

    match cli.command {
        Commands::Add(args) => commands::add::run(&config, args)?,
        Commands::Get { id, format } => commands::records::get(&config, id, &format)?,
        Commands::Find { number, format } => commands::records::find(&config, &number, &format)?,
        Commands::List { format } => commands::records::list(&config, &format)?,
        Commands::Delete { id } => commands::records::delete(&config, id)?,
        Commands::Clear { yes } => {
            if !yes {
                return Err("refusing to delete every invoice without --yes".into());
            }
            commands::records::clear(&config)?;
        }
        Commands::Count => commands::records::count(&config)?,
        Commands::Inspect { format } => commands::inspect::run(&config, &format)?,
        Commands::Verify => commands::verify::run(&config)?,
        Commands::Version => {
            println!("InvoiceDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("InvoiceDB Core v{}", invoicedb_core::VERSION);
        }
    }

    Ok(())
}
