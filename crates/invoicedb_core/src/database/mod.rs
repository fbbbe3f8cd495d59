//! The `Database` capability set and its implementations.
//!
//! Every backend exposes the same eight operations with the same error
//! vocabulary, so callers can swap backends by configuration alone:
//!
//! - [`InMemoryDatabase`] - A map behind a mutex; nothing is persisted
//! - [`InFileDatabase`] - One encoded invoice per line of a text file
//!
//! Use [`open_database`] to pick one from a [`Config`].

mod allocator;
mod file;
mod memory;

pub use allocator::IdAllocator;
pub use file::{InFileDatabase, ScanReport};
pub use memory::InMemoryDatabase;

use crate::config::{Backend, Config};
use crate::error::{CoreError, CoreResult};
use crate::model::{Invoice, InvoiceId};
use std::sync::Arc;

/// CRUD operations over stored invoices.
///
/// Implementations are shared between threads; every method takes `&self`
/// and the implementation serializes access internally.
pub trait Database: Send + Sync {
    /// Stores `invoice` and returns it as persisted.
    ///
    /// If `invoice.id` names a stored invoice, that record is replaced.
    /// Otherwise the invoice is inserted under a freshly allocated id, even
    /// when it carried an id of its own.
    ///
    /// # Errors
    ///
    /// Returns `StoreOperationFailure` if the backing store fails.
    fn save(&self, invoice: Invoice) -> CoreResult<Invoice>;

    /// Returns the invoice with `id`, if stored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for id 0.
    fn get_by_id(&self, id: InvoiceId) -> CoreResult<Option<Invoice>>;

    /// Returns the first invoice whose business number equals `number`.
    ///
    /// Numbers are not unique; which invoice is "first" depends on the
    /// backend's iteration order.
    /// Any string is a valid number, the empty one included.
    fn get_by_number(&self, number: &str) -> CoreResult<Option<Invoice>>;

    /// Returns every stored invoice.
    ///
    /// # Errors
    ///
    /// Returns `StoreOperationFailure` if the backing store fails.
    fn get_all(&self) -> CoreResult<Vec<Invoice>>;

    /// Removes the invoice with `id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for id 0 and `InvoiceNotFound` if no such
    /// invoice is stored.
    fn delete(&self, id: InvoiceId) -> CoreResult<()>;

    /// Removes every invoice. Succeeds on an empty store.
    ///
    /// # Errors
    ///
    /// Returns `StoreOperationFailure` if the backing store fails.
    fn delete_all(&self) -> CoreResult<()>;

    /// Returns true if an invoice with `id` is stored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for id 0.
    fn exists(&self, id: InvoiceId) -> CoreResult<bool>;

    /// Returns the number of stored invoices.
    ///
    /// # Errors
    ///
    /// Returns `StoreOperationFailure` if the backing store fails.
    fn count(&self) -> CoreResult<usize>;
}

macro_rules! forward_database {
    ($($ty:ty),+) => {$(
        impl<D: Database + ?Sized> Database for $ty {
            fn save(&self, invoice: Invoice) -> CoreResult<Invoice> {
                (**self).save(invoice)
            }

            fn get_by_id(&self, id: InvoiceId) -> CoreResult<Option<Invoice>> {
                (**self).get_by_id(id)
            }

            fn get_by_number(&self, number: &str) -> CoreResult<Option<Invoice>> {
                (**self).get_by_number(number)
            }

            fn get_all(&self) -> CoreResult<Vec<Invoice>> {
                (**self).get_all()
            }

            fn delete(&self, id: InvoiceId) -> CoreResult<()> {
                (**self).delete(id)
            }

            fn delete_all(&self) -> CoreResult<()> {
                (**self).delete_all()
            }

            fn exists(&self, id: InvoiceId) -> CoreResult<bool> {
                (**self).exists(id)
            }

            fn count(&self) -> CoreResult<usize> {
                (**self).count()
            }
        }
    )+};
}

forward_database!(&D, Box<D>, Arc<D>);

/// Opens the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the in-file backend cannot be opened.
pub fn open_database(config: &Config) -> CoreResult<Box<dyn Database>> {
    match config.backend {
        Backend::InMemory => {
            tracing::info!("opening in-memory database");
            Ok(Box::new(InMemoryDatabase::new()))
        }
        Backend::InFile => Ok(Box::new(InFileDatabase::open_with_config(config)?)),
    }
}

pub(crate) fn check_id(id: InvoiceId) -> CoreResult<()> {
    if !id.is_valid() {
        return Err(CoreError::invalid_argument("invoice id must be positive"));
    }
    Ok(())
}
