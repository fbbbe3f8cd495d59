//! The invoice record.

use super::{Company, InvoiceEntry, InvoiceId, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An invoice as stored by a [`crate::Database`].
///
/// `id` is `None` until the invoice is first saved. The store assigns it and
/// it never changes afterwards; saving an invoice whose id is already stored
/// replaces that record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: Option<InvoiceId>,
    /// Business number. Not required to be unique.
    pub number: String,
    /// Date of issue.
    pub issued_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Issuing party.
    pub seller: Company,
    /// Receiving party.
    pub buyer: Company,
    /// Line items, in order.
    #[serde(default)]
    pub entries: Vec<InvoiceEntry>,
}

impl Invoice {
    /// Starts building an invoice.
    #[must_use]
    pub fn builder() -> InvoiceBuilder {
        InvoiceBuilder::default()
    }

    /// Returns a copy of this invoice carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: InvoiceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sum of entry net values, saturating at [`Money::MAX`] and [`Money::MIN`].
    ///
    /// Decoded invoices carry whatever values were on disk, so the sum may
    /// not fit.
    #[must_use]
    pub fn total_net(&self) -> Money {
        self.entries.iter().fold(Money::ZERO, |acc, e| acc + e.net_value)
    }

    /// Sum of entry gross values, saturating like [`Invoice::total_net`].
    #[must_use]
    pub fn total_gross(&self) -> Money {
        self.entries
            .iter()
            .fold(Money::ZERO, |acc, e| acc + e.gross_value)
    }
}

/// Builder for [`Invoice`].
///
/// Dates default to the current local date; everything else defaults to empty.
#[derive(Debug, Clone, Default)]
pub struct InvoiceBuilder {
    id: Option<InvoiceId>,
    number: String,
    issued_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    seller: Company,
    buyer: Company,
    entries: Vec<InvoiceEntry>,
}

impl InvoiceBuilder {
    /// Copies every field of `invoice`.
    #[must_use]
    pub fn from_invoice(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            number: invoice.number,
            issued_date: Some(invoice.issued_date),
            due_date: Some(invoice.due_date),
            seller: invoice.seller,
            buyer: invoice.buyer,
            entries: invoice.entries,
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn id(mut self, id: InvoiceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the business number.
    #[must_use]
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    /// Sets the date of issue.
    #[must_use]
    pub fn issued_date(mut self, date: NaiveDate) -> Self {
        self.issued_date = Some(date);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Sets the seller.
    #[must_use]
    pub fn seller(mut self, seller: Company) -> Self {
        self.seller = seller;
        self
    }

    /// Sets the buyer.
    #[must_use]
    pub fn buyer(mut self, buyer: Company) -> Self {
        self.buyer = buyer;
        self
    }

    /// Appends a line item.
    #[must_use]
    pub fn entry(mut self, entry: InvoiceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Replaces all line items.
    #[must_use]
    pub fn entries(mut self, entries: Vec<InvoiceEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Builds the invoice.
    #[must_use]
    pub fn build(self) -> Invoice {
        let today = chrono::Local::now().date_naive();
        let issued_date = self.issued_date.unwrap_or(today);
        Invoice {
            id: self.id,
            number: self.number,
            issued_date,
            due_date: self.due_date.unwrap_or(issued_date),
            seller: self.seller,
            buyer: self.buyer,
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vat;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Invoice {
        Invoice::builder()
            .number("180213-002")
            .issued_date(date(2019, 7, 16))
            .due_date(date(2019, 7, 30))
            .seller(Company::named("Seller"))
            .buyer(Company::named("Buyer"))
            .entry(InvoiceEntry::new("Material", 2, Money::new(10, 0), Vat::Vat8).unwrap())
            .entry(InvoiceEntry::new("Service", 1, Money::new(5, 50), Vat::Vat0).unwrap())
            .build()
    }

    #[test]
    fn builder_sets_fields() {
        let invoice = sample();
        assert_eq!(invoice.id, None);
        assert_eq!(invoice.number, "180213-002");
        assert_eq!(invoice.entries.len(), 2);
        assert_eq!(invoice.due_date, date(2019, 7, 30));
    }

    #[test]
    fn due_date_defaults_to_issue_date() {
        let invoice = Invoice::builder().issued_date(date(2020, 1, 1)).build();
        assert_eq!(invoice.due_date, date(2020, 1, 1));
    }

    #[test]
    fn totals() {
        let invoice = sample();
        assert_eq!(invoice.total_net(), Money::new(25, 50));
        assert_eq!(invoice.total_gross(), Money::new(27, 10));
    }

    #[test]
    fn totals_saturate_on_decoded_values() {
        let mut invoice = sample();
        for entry in &mut invoice.entries {
            entry.net_value = Money::MAX;
            entry.gross_value = Money::MAX;
        }
        let line = serde_json::to_string(&invoice).unwrap();
        let decoded: Invoice = serde_json::from_str(&line).unwrap();

        assert_eq!(decoded.total_net(), Money::MAX);
        assert_eq!(decoded.total_gross(), Money::MAX);

        invoice.entries[0].gross_value = Money::MIN;
        invoice.entries[1].gross_value = Money::MIN;
        assert_eq!(invoice.total_gross(), Money::MIN);
    }

    #[test]
    fn from_invoice_roundtrip() {
        let invoice = sample().with_id(InvoiceId::new(4));
        let copy = InvoiceBuilder::from_invoice(invoice.clone()).build();
        assert_eq!(copy, invoice);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(sample().with_id(InvoiceId::new(1))).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["issued_date"], "2019-07-16");
        assert_eq!(json["entries"][0]["vat_rate"], "VAT_8");
        assert_eq!(json["entries"][0]["gross_value"], 2160);
    }

    #[test]
    fn missing_id_decodes_as_none() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json.as_object_mut().unwrap().remove("id");
        let invoice: Invoice = serde_json::from_value(json).unwrap();
        assert_eq!(invoice.id, None);
    }
}
