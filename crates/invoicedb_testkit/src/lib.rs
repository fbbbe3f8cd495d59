//! # InvoiceDB Testkit
//!
//! Test utilities for InvoiceDB.
//!
//! This crate provides:
//! - Temporary stores that clean up after themselves
//! - Property-based test generators using proptest
//! - A model-checked harness for cross-backend tests
//! - Torn-write and corruption helpers for recovery tests
//! - Fuzz targets and stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use invoicedb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_file_db(|db, path| {
//!         db.save(sample_invoice("FV/1")).unwrap();
//!         assert!(path.exists());
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
}

pub use crash::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
