//! In-memory database.

use super::{check_id, Database, IdAllocator};
use crate::error::{CoreError, CoreResult};
use crate::model::{Invoice, InvoiceId};
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct MemoryState {
    invoices: BTreeMap<InvoiceId, Invoice>,
    ids: IdAllocator,
}

/// A [`Database`] holding invoices in a map.
///
/// Suitable for tests and for deployments that do not need persistence.
/// Updates replace the stored invoice in place; iteration is in id order.
///
/// # Thread Safety
///
/// All operations take one mutex, so callers observe a single total order
/// of saves and deletes.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    state: Mutex<MemoryState>,
}

impl InMemoryDatabase {
    /// Creates an empty database whose first id will be 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database for InMemoryDatabase {
    fn save(&self, invoice: Invoice) -> CoreResult<Invoice> {
        let mut state = self.state.lock();

        if let Some(id) = invoice.id.filter(|id| state.invoices.contains_key(id)) {
            tracing::debug!(%id, "updating invoice");
            state.invoices.insert(id, invoice.clone());
            return Ok(invoice);
        }

        let id = state.ids.next_id()?;
        let stored = invoice.with_id(id);
        tracing::debug!(%id, number = %stored.number, "adding invoice");
        state.invoices.insert(id, stored.clone());
        Ok(stored)
    }

    fn get_by_id(&self, id: InvoiceId) -> CoreResult<Option<Invoice>> {
        check_id(id)?;
        Ok(self.state.lock().invoices.get(&id).cloned())
    }

    fn get_by_number(&self, number: &str) -> CoreResult<Option<Invoice>> {
        Ok(self
            .state
            .lock()
            .invoices
            .values()
            .find(|invoice| invoice.number == number)
            .cloned())
    }

    fn get_all(&self) -> CoreResult<Vec<Invoice>> {
        Ok(self.state.lock().invoices.values().cloned().collect())
    }

    fn delete(&self, id: InvoiceId) -> CoreResult<()> {
        check_id(id)?;
        let mut state = self.state.lock();
        if state.invoices.remove(&id).is_none() {
            return Err(CoreError::InvoiceNotFound { id });
        }
        tracing::debug!(%id, "deleted invoice");
        Ok(())
    }

    fn delete_all(&self) -> CoreResult<()> {
        tracing::debug!("deleting all invoices");
        self.state.lock().invoices.clear();
        Ok(())
    }

    fn exists(&self, id: InvoiceId) -> CoreResult<bool> {
        check_id(id)?;
        Ok(self.state.lock().invoices.contains_key(&id))
    }

    fn count(&self) -> CoreResult<usize> {
        Ok(self.state.lock().invoices.len())
    }
}
