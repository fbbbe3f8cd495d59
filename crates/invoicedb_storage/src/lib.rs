//! # InvoiceDB Storage
//!
//! Line-addressed storage for InvoiceDB.
//!
//! This crate provides the lowest-level storage abstraction for InvoiceDB.
//! Backends are **opaque line stores** - they hold UTF-8 lines, address them
//! by 1-indexed position and do not interpret their contents.
//!
//! ## Design Principles
//!
//! - One record per line; no stored line contains a line terminator
//! - No knowledge of record encoding or identifiers
//! - No internal locking across operations: the store above owns
//!   single-writer discipline
//!
//! ## Available Backends
//!
//! - [`LineFile`] - A UTF-8 text file on disk
//! - [`InMemoryLines`] - For testing and ephemeral storage
//!
//! ## Example
//!
//! ```rust
//! use invoicedb_storage::{InMemoryLines, LineBackend};
//!
//! let mut lines = InMemoryLines::new();
//! lines.write_line("hello world").unwrap();
//! assert_eq!(lines.read_last_line().unwrap().as_deref(), Some("hello world"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::LineBackend;
pub use error::{StorageError, StorageResult};
pub use file::{LineFile, LINE_TERMINATOR};
pub use memory::InMemoryLines;
