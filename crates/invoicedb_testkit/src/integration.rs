//! Cross-crate integration test helpers.
//!
//! [`IntegrationHarness`] drives any [`Database`] while keeping a reference
//! model of what it should contain, and checks every answer against it.

use crate::generators::StoreOp;
use invoicedb_core::{CoreError, Database, Invoice, InvoiceId};
use std::collections::BTreeMap;

/// A test harness that checks a store against a reference model.
pub struct IntegrationHarness<D> {
    /// The store under test.
    pub db: D,
    /// Expected contents, keyed by id.
    expected: BTreeMap<InvoiceId, Invoice>,
    /// Highest id the store should have issued so far.
    last_id: u64,
}

impl<D: Database> IntegrationHarness<D> {
    /// Wraps an empty store.
    pub fn new(db: D) -> Self {
        Self {
            db,
            expected: BTreeMap::new(),
            last_id: 0,
        }
    }

    /// Wraps a store whose contents are already known.
    pub fn with_expected(db: D, invoices: impl IntoIterator<Item = Invoice>) -> Self {
        let expected: BTreeMap<_, _> = invoices
            .into_iter()
            .filter_map(|invoice| invoice.id.map(|id| (id, invoice)))
            .collect();
        let last_id = expected.keys().next_back().map_or(0, |id| id.get());
        Self {
            db,
            expected,
            last_id,
        }
    }

    /// Inserts `invoice` and checks the assigned id.
    pub fn insert(&mut self, invoice: Invoice) -> InvoiceId {
        let stored = self.db.save(invoice.clone()).expect("Failed to insert invoice");
        self.last_id += 1;
        let id = InvoiceId::new(self.last_id);

        assert_eq!(stored.id, Some(id), "Insert was not given the next id");
        assert_eq!(stored, invoice.with_id(id), "Insert changed the record");
        self.expected.insert(id, stored);
        id
    }

    /// Saves `invoice` under `id`; inserts if `id` is not stored.
    pub fn update(&mut self, id: InvoiceId, invoice: Invoice) {
        if !self.expected.contains_key(&id) {
            self.insert(invoice.with_id(id));
            return;
        }

        let invoice = invoice.with_id(id);
        let stored = self.db.save(invoice.clone()).expect("Failed to update invoice");
        assert_eq!(stored, invoice, "Update changed the record");
        self.expected.insert(id, stored);
    }

    /// Deletes `id` and checks the outcome against the model.
    pub fn delete(&mut self, id: InvoiceId) {
        let result = self.db.delete(id);
        if self.expected.remove(&id).is_some() {
            result.expect("Failed to delete stored invoice");
        } else {
            assert!(
                matches!(result, Err(CoreError::InvoiceNotFound { .. })),
                "Deleting unknown id {id} gave {result:?}"
            );
        }
    }

    /// Looks `id` up and checks it against the model.
    pub fn get_and_verify(&self, id: InvoiceId) -> Option<Invoice> {
        let actual = self.db.get_by_id(id).expect("Failed to get invoice");
        assert_eq!(actual.as_ref(), self.expected.get(&id), "Mismatch for id {id}");
        assert_eq!(
            self.db.exists(id).expect("Failed to check existence"),
            actual.is_some()
        );
        actual
    }

    /// Looks `number` up and checks the answer is one of the matching invoices.
    pub fn find_and_verify(&self, number: &str) -> Option<Invoice> {
        let actual = self.db.get_by_number(number).expect("Failed to find invoice");
        match &actual {
            Some(found) => {
                let id = found.id.expect("Stored invoice without id");
                assert_eq!(found.number, number);
                assert_eq!(Some(found), self.expected.get(&id));
            }
            None => assert!(
                self.expected.values().all(|invoice| invoice.number != number),
                "Number {number:?} is stored but was not found"
            ),
        }
        actual
    }

    /// Deletes everything.
    pub fn clear(&mut self) {
        self.db.delete_all().expect("Failed to clear store");
        self.expected.clear();
    }

    /// Applies one generated operation.
    pub fn apply(&mut self, op: StoreOp) {
        match op {
            StoreOp::Insert(invoice) => {
                self.insert(invoice);
            }
            StoreOp::Update(id, invoice) => self.update(InvoiceId::new(id), invoice),
            StoreOp::Delete(id) => self.delete(InvoiceId::new(id)),
            StoreOp::Get(id) => {
                self.get_and_verify(InvoiceId::new(id));
            }
            StoreOp::Find(number) => {
                self.find_and_verify(&number);
            }
            StoreOp::Clear => self.clear(),
        }
    }

    /// Checks the whole store against the model.
    pub fn verify_all(&self) {
        let mut actual = self.db.get_all().expect("Failed to list invoices");
        actual.sort_by_key(|invoice| invoice.id);
        let expected: Vec<_> = self.expected.values().cloned().collect();

        assert_eq!(actual, expected, "Store contents differ from model");
        assert_eq!(self.db.count().expect("Failed to count"), expected.len());
    }

    /// Returns the expected contents.
    pub fn expected(&self) -> impl Iterator<Item = &Invoice> {
        self.expected.values()
    }

    /// Returns the store, consuming the harness.
    pub fn into_inner(self) -> D {
        self.db
    }
}
