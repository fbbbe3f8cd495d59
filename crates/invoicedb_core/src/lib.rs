//! # InvoiceDB Core
//!
//! Invoice records and the stores that keep them.
//!
//! This crate provides:
//! - The invoice model: [`Invoice`], [`Company`], [`InvoiceEntry`], [`Vat`]
//! - The [`Database`] trait with in-memory and line-file implementations
//! - Id allocation that never reissues an id within a store's lifetime
//! - [`Config`] with environment overrides and an advisory [`FileLock`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoicedb_core::{open_database, Config, Invoice};
//!
//! let db = open_database(&Config::in_file("invoices.db"))?;
//! let invoice = db.save(Invoice::builder().number("2024/01").build())?;
//! println!("stored as {:?}", invoice.id);
//! # Ok::<(), invoicedb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod lock;
pub mod model;

pub use config::{
    Backend, Config, ENV_BACKEND, ENV_FILE_PATH, ENV_LOCK_FILE, ENV_SYNC_ON_WRITE,
};
pub use database::{
    open_database, Database, IdAllocator, InFileDatabase, InMemoryDatabase, ScanReport,
};
pub use error::{CoreError, CoreResult};
pub use lock::{lock_path, FileLock};
pub use model::{Company, Invoice, InvoiceBuilder, InvoiceEntry, InvoiceId, Money, Vat};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
