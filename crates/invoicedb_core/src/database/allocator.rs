//! Identifier allocation.

use crate::error::{CoreError, CoreResult};
use crate::model::InvoiceId;

/// Hands out strictly increasing invoice ids.
///
/// The allocator remembers the highest id issued or observed so far. A
/// file-backed store seeds it once at open time from the record on the last
/// line of its file; after that the in-memory counter is authoritative for
/// the lifetime of the store and is never re-derived from disk.
///
/// Seeding from the last line is sound only while every insert is an append:
/// right after any insert the last line carries the highest id issued. An
/// update moves an older record to the end, so a store that may have been
/// updated before it was closed should also [`observe`](Self::observe) every
/// id it finds on open.
///
/// The allocator is not synchronized; the owning store keeps it behind the
/// same lock that serializes writes to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first id will be 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Creates an allocator that continues after `last`.
    #[must_use]
    pub fn seeded(last: Option<InvoiceId>) -> Self {
        Self {
            last: last.map_or(0, InvoiceId::get),
        }
    }

    /// Issues the next id.
    ///
    /// # Errors
    ///
    /// Returns a store failure once `u64::MAX` has been issued.
    pub fn next_id(&mut self) -> CoreResult<InvoiceId> {
        self.last = self
            .last
            .checked_add(1)
            .ok_or_else(|| CoreError::store_failure("invoice id space exhausted"))?;
        Ok(InvoiceId::new(self.last))
    }

    /// Raises the counter so that `id` is never issued again.
    ///
    /// Returns true if the counter moved.
    pub fn observe(&mut self, id: InvoiceId) -> bool {
        if id.get() > self.last {
            self.last = id.get();
            true
        } else {
            false
        }
    }

    /// Returns the highest id issued or observed, if any.
    #[must_use]
    pub fn last(&self) -> Option<InvoiceId> {
        (self.last > 0).then(|| InvoiceId::new(self.last))
    }

    /// Returns the id the next call to [`next_id`](Self::next_id) will issue.
    #[must_use]
    pub fn peek(&self) -> InvoiceId {
        InvoiceId::new(self.last.saturating_add(1))
    }
}
